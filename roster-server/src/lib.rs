//! roster-server - HTTP service for user records
//!
//! Serves create/read/update/delete over `/users` on top of a pluggable
//! [`db::UserStore`]: PostgreSQL, MongoDB (feature `mongo`) or in-process.
//!
//! # Example
//!
//! ```ignore
//! use roster_server::{open_store, run_server, ServerConfig};
//!
//! let config = ServerConfig::memory();
//! let store = open_store(&config).await?;
//! run_server(store, &config).await?;
//! ```

pub mod config;
pub mod db;
pub mod http;

pub use config::{Backend, ConfigError, MongoSettings, PostgresSettings, ServerConfig};
pub use db::{open_store, DbError, SharedStore, UserStore};
pub use http::{build_router, run_server, ApiError, AppState, ServerError};
