//! HTTP server for the fastship dashboard.
//!
//! Wires the warehouse, the session runtime and the REST API together,
//! with configuration parsing and Ctrl+C shutdown.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dash_api::{router::Router, server::Server};
use dash_core::config::DashConfig;
use dash_runtime::Runtime;
use dash_warehouse::open_warehouse;
use tokio::signal;

/// Command-line arguments for the dashboard server.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// JSON configuration file; missing keys take their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve tables from this JSON snapshot instead of the warehouse
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Table to load, overriding the configuration
    #[arg(long)]
    table: Option<String>,

    /// Request timeout in milliseconds, overriding the configuration
    #[arg(long)]
    request_timeout_ms: Option<u64>,

    /// Response timeout in milliseconds, overriding the configuration
    #[arg(long)]
    response_timeout_ms: Option<u64>,
}

impl Args {
    fn dash_config(&self) -> anyhow::Result<DashConfig> {
        let mut config = match &self.config {
            Some(path) => DashConfig::from_file(path)?,
            None => DashConfig::default(),
        };
        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        if let Some(ms) = self.request_timeout_ms {
            config.request_timeout_ms = ms;
        }
        if let Some(ms) = self.response_timeout_ms {
            config.response_timeout_ms = ms;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt::init();

    let config = args.dash_config()?;
    let warehouse = open_warehouse(args.snapshot.as_deref(), &config)
        .context("Failed to open warehouse")?;

    tracing::info!("Starting dashboard server");
    tracing::info!("  Warehouse: {}", warehouse.describe());
    tracing::info!("  Table: {}", config.table);
    tracing::info!("  Key column: {}", config.key_column);
    tracing::info!("  Editable columns: {}", config.editable_columns.join(", "));

    let (api_tx, api_rx) = Runtime::channel(&config);
    let runtime_handle = Runtime::new(config.clone(), warehouse, api_rx).spawn();

    let router = Router::new(Arc::new(config), api_tx).context("Failed to build routes")?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;
    let server = Server::bind(addr, router)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let server_handle = tokio::spawn(async move {
        if let Err(e) = server.serve().await {
            tracing::error!("Server error: {}", e);
        }
    });

    signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl_c")?;
    tracing::info!("Shutting down server");
    server_handle.abort();
    runtime_handle.abort();

    Ok(())
}
