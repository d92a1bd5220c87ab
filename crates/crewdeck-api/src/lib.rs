//! # HTTP API
//!
//! Axum routers and handlers over the orchestration engines, the link
//! service and the adapters. Every endpoint returns the
//! `{success, …}` envelope; validation and safety-gate failures map to
//! 4xx before any upstream call, everything else to a 500 carrying the
//! caught error message.

pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;

pub use error::ApiError;
pub use router::api_router;
pub use state::AppState;
