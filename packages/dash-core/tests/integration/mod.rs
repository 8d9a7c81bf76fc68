//! Integration test suite for the data engine.
//!
//! 1. Filter properties over generated tables
//! 2. Full dashboard flow: load, filter, summarize, edit, diff, export

pub mod dashboard_flow_tests;
pub mod filter_properties_tests;
pub mod helpers;
