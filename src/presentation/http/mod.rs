//! HTTP API
//!
//! JSON endpoints under `/api/v1` plus health and metrics.

pub mod handlers;
pub mod routes;

pub use routes::create_router;
