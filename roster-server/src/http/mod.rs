//! HTTP server layer
//!
//! Axum server with:
//! - CORS (localhost only by default)
//! - Request tracing and a whole-request timeout
//! - Graceful shutdown
//! - Plain-text error responses with typed status mapping

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerError};
pub use state::AppState;
