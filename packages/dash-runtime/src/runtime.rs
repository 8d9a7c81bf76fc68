//! Request loop owning the session.

use std::sync::Arc;
use std::time::Instant;

use dash_core::config::DashConfig;
use dash_warehouse::Warehouse;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::api_handlers::ApiHandlers;
use crate::api_request::ApiRequest;

/// Main runtime loop
pub struct Runtime {
    /// API request receiver
    api_rx: mpsc::Receiver<ApiRequest>,
    /// API handlers
    api_handlers: ApiHandlers,
    /// Requests processed so far
    processed: u64,
}

impl Runtime {
    /// Create a new runtime
    pub fn new(
        config: DashConfig,
        warehouse: Arc<dyn Warehouse>,
        api_rx: mpsc::Receiver<ApiRequest>,
    ) -> Self {
        Self {
            api_rx,
            api_handlers: ApiHandlers::new(config, warehouse),
            processed: 0,
        }
    }

    /// Creates the request channel sized by `request_queue_capacity`.
    pub fn channel(config: &DashConfig) -> (mpsc::Sender<ApiRequest>, mpsc::Receiver<ApiRequest>) {
        mpsc::channel(config.request_queue_capacity.max(1))
    }

    pub fn handlers(&self) -> &ApiHandlers {
        &self.api_handlers
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Processes one request to completion.
    pub async fn process(&mut self, req: ApiRequest) {
        let name = req.name();
        let mutating = req.is_mutating();
        let start = Instant::now();

        self.api_handlers.handle_api_request(req).await;
        self.processed += 1;

        tracing::debug!(
            "Processed {} request (mutating: {}) in {:?}",
            name,
            mutating,
            start.elapsed()
        );
    }

    /// Run the runtime loop until every sender is dropped.
    pub async fn run(mut self) {
        tracing::info!("Runtime started");
        while let Some(req) = self.api_rx.recv().await {
            self.process(req).await;
        }
        tracing::info!(
            "Request channel closed after {} requests, runtime stopping",
            self.processed
        );
    }

    /// Runs the loop on the current tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
