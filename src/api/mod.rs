//! Backlog API server module
//!
//! HTTP REST API around the backlog check. Run with `backlog-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
