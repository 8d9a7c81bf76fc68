//! CLI for inspecting dashboard tables.
//!
//! Provides commands for:
//! - Previewing and filtering the configured table
//! - Summary statistics, crosstabs and grouped sums
//! - CSV export, and CSV import into a JSON snapshot

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use dash_core::config::DashConfig;
use dash_core::export::write_csv;
use dash_core::filter::PredicateSpec;
use dash_core::import::read_csv;
use dash_core::persistence::SnapshotStore;
use dash_core::table::Table;
use dash_runtime::{AggregateParams, Session};
use dash_warehouse::{load_table, open_warehouse};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

/// Where the table comes from.
#[derive(Args, Debug)]
struct SourceArgs {
    /// JSON snapshot to read instead of the warehouse
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Table to load, overriding the configuration
    #[arg(long, global = true)]
    table: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the first rows
    Preview {
        /// Number of rows (defaults to the configured preview size)
        #[arg(short, long)]
        rows: Option<usize>,
        /// Print JSON instead of CSV
        #[arg(long)]
        json: bool,
    },
    /// Print the rows matching every filter, e.g. `QTY>=10 CARRIER=UPS`
    Filter {
        filters: Vec<String>,
        #[arg(long)]
        json: bool,
    },
    /// Summary statistics of the filtered rows
    Summary { filters: Vec<String> },
    /// Counts between the columns of the first two filters
    Crosstab { filters: Vec<String> },
    /// Sum of a numeric column per group
    Aggregate {
        /// Numeric column to sum
        #[arg(long)]
        value: String,
        /// Column to group by (defaults to the first column)
        #[arg(long)]
        group_by: Option<String>,
        #[arg(short, long = "filter")]
        filters: Vec<String>,
    },
    /// Write the filtered rows as CSV
    Export {
        filters: Vec<String>,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Read a CSV file into the snapshot, replacing a table of the same name
    Import {
        csv: PathBuf,
        /// Table name (defaults to the configured table)
        #[arg(long)]
        name: Option<String>,
    },
}

impl SourceArgs {
    fn dash_config(&self) -> anyhow::Result<DashConfig> {
        let mut config = match &self.config {
            Some(path) => DashConfig::from_file(path)?,
            None => DashConfig::default(),
        };
        if let Some(table) = &self.table {
            config.table = table.clone();
        }
        config.validate()?;
        Ok(config)
    }

    /// Loads the configured table into a fresh session.
    async fn session(&self, config: DashConfig) -> anyhow::Result<Session> {
        let warehouse = open_warehouse(self.snapshot.as_deref(), &config)
            .context("Failed to open warehouse")?;
        let table = load_table(
            warehouse.as_ref(),
            &config.table,
            &config.date_column_marker,
        )
        .await
        .with_context(|| format!("Failed to load '{}'", config.table))?;

        let mut session = Session::new(config);
        session.install(table)?;
        Ok(session)
    }
}

fn parse_filters(expressions: &[String]) -> anyhow::Result<Vec<PredicateSpec>> {
    expressions
        .iter()
        .map(|e| {
            PredicateSpec::parse_expression(e).with_context(|| format!("Invalid filter '{}'", e))
        })
        .collect()
}

fn print_table<W: Write>(table: &Table, json: bool, out: &mut W) -> anyhow::Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, table)?;
        writeln!(out)?;
    } else {
        write_csv(table, &mut *out)?;
    }
    Ok(())
}

fn print_json<W: Write, T: serde::Serialize>(value: &T, out: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

async fn run<W: Write>(cli: Cli, out: &mut W) -> anyhow::Result<()> {
    let config = cli.source.dash_config()?;

    match cli.command {
        Command::Import { csv, name } => {
            let Some(snapshot) = &cli.source.snapshot else {
                bail!("import needs --snapshot");
            };
            let name = name.unwrap_or_else(|| config.table.clone());
            let file =
                File::open(&csv).with_context(|| format!("Failed to open {}", csv.display()))?;
            let table = read_csv(&name, file)?;

            let store = SnapshotStore::new(snapshot, &config);
            let mut tables = if store.exists() { store.load()? } else { Vec::new() };
            tables.retain(|t| t.name() != name);
            let rows = table.row_count();
            tables.push(table);
            store.save(&tables)?;

            writeln!(
                out,
                "Imported {} rows into '{}' ({})",
                rows,
                name,
                snapshot.display()
            )?;
        }
        Command::Preview { rows, json } => {
            let session = cli.source.session(config).await?;
            print_table(&session.preview(rows)?, json, out)?;
        }
        Command::Filter { filters, json } => {
            let filters = parse_filters(&filters)?;
            let session = cli.source.session(config).await?;
            print_table(&session.query(&filters)?.table, json, out)?;
        }
        Command::Summary { filters } => {
            let filters = parse_filters(&filters)?;
            let session = cli.source.session(config).await?;
            print_json(&session.summary(&filters)?, out)?;
        }
        Command::Crosstab { filters } => {
            let filters = parse_filters(&filters)?;
            let session = cli.source.session(config).await?;
            print_json(&session.crosstab(&filters)?, out)?;
        }
        Command::Aggregate {
            value,
            group_by,
            filters,
        } => {
            let filters = parse_filters(&filters)?;
            let params = AggregateParams {
                value_column: value,
                group_by,
            };
            let session = cli.source.session(config).await?;
            print_json(&session.aggregate(&filters, &params)?, out)?;
        }
        Command::Export { filters, output } => {
            let filters = parse_filters(&filters)?;
            let session = cli.source.session(config).await?;
            let csv = session.export(&filters)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, csv)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    tracing::info!("Wrote {}", path.display());
                }
                None => out.write_all(csv.as_bytes())?,
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out).await
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORDERS_CSV: &str = "ORDER_ID,CARRIER,QTY,RETURNED_FL,ORDER_DATE\n\
                              A1,UPS,5,false,2024-01-01\n\
                              A2,DHL,12,true,2024-01-02\n\
                              A3,UPS,20,true,2024-01-03\n";

    /// Imports the sample orders and returns the snapshot path.
    async fn seeded_snapshot(dir: &tempfile::TempDir) -> String {
        let csv_path = dir.path().join("orders.csv");
        std::fs::write(&csv_path, ORDERS_CSV).unwrap();
        let snapshot = dir.path().join("snapshot.json");
        let snapshot = snapshot.to_str().unwrap().to_string();

        let mut out = Vec::new();
        let cli = Cli::try_parse_from([
            "dash-tool",
            "--snapshot",
            snapshot.as_str(),
            "import",
            csv_path.to_str().unwrap(),
        ])
        .unwrap();
        run(cli, &mut out).await.unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("Imported 3 rows"));

        snapshot
    }

    async fn run_args(args: &[&str]) -> anyhow::Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("dash-tool").chain(args.iter().copied()))?;
        let mut out = Vec::new();
        run(cli, &mut out).await?;
        Ok(String::from_utf8(out)?)
    }

    #[tokio::test]
    async fn test_filter_prints_matching_rows() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = seeded_snapshot(&dir).await;

        let output = run_args(&["filter", "--snapshot", snapshot.as_str(), "QTY>=10", "CARRIER=UPS"])
            .await
            .unwrap();
        assert_eq!(
            output,
            "ORDER_ID,CARRIER,QTY,RETURNED_FL,ORDER_DATE\nA3,UPS,20,true,2024-01-03\n"
        );
    }

    #[tokio::test]
    async fn test_preview_json() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = seeded_snapshot(&dir).await;

        let output = run_args(&["preview", "--snapshot", snapshot.as_str(), "--rows", "1", "--json"])
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["rows"].as_array().unwrap().len(), 1);
        assert_eq!(json["columns"][4]["type"], "temporal");
    }

    #[tokio::test]
    async fn test_aggregate_and_crosstab() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = seeded_snapshot(&dir).await;

        let output = run_args(&[
            "aggregate",
            "--snapshot",
            snapshot.as_str(),
            "--value",
            "QTY",
            "--group-by",
            "CARRIER",
        ])
        .await
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(json["groups"], serde_json::json!(["DHL", "UPS"]));
        assert_eq!(json["sums"], serde_json::json!([12, 25]));

        let error = run_args(&["crosstab", "--snapshot", snapshot.as_str(), "QTY>0"])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("At least 2 filters"));
    }

    #[tokio::test]
    async fn test_invalid_filter_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = seeded_snapshot(&dir).await;

        let error = run_args(&["summary", "--snapshot", snapshot.as_str(), "QTY!3"])
            .await
            .unwrap_err();
        assert!(error.to_string().contains("Invalid filter 'QTY!3'"));
    }

    #[tokio::test]
    async fn test_import_requires_snapshot() {
        let error = run_args(&["import", "orders.csv"]).await.unwrap_err();
        assert!(error.to_string().contains("--snapshot"));
    }
}
