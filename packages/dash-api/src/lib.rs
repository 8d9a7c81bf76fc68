//! HTTP API for the fastship dashboard.
//!
//! Routes JSON requests to the dashboard runtime and wraps its answers in
//! the `{success, data}` / `{success, error}` envelopes.

pub mod handlers;
pub mod router;
pub mod server;
