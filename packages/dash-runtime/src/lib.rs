//! Dashboard session runtime.
//!
//! One [`Runtime`] task owns the loaded dataset and its working copy and
//! drains an [`ApiRequest`] channel one request at a time, so no two
//! operations ever touch the session concurrently.

mod api_handlers;
mod api_request;
mod runtime;
mod session;

use dash_core::DashError;
use tokio::sync::oneshot;

pub use api_handlers::ApiHandlers;
pub use api_request::{AggregateParams, ApiRequest};
pub use runtime::Runtime;
pub use session::Session;

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, DashError>;

/// Response sender for API requests
pub type ResponseSender = oneshot::Sender<Result<serde_json::Value>>;
