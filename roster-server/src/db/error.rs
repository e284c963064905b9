//! Storage error type
//!
//! Every backend failure carries the name of the data-access operation
//! that hit it, so a log line reads `get_user: pool timed out` rather than
//! a bare driver message.

use std::time::Duration;

use crate::config::ConfigError;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Identifier doesn't parse into the backend's id format
    #[error("invalid id '{id}': {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("{operation}: {source}")]
    Postgres {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[cfg(feature = "mongo")]
    #[error("{operation}: {source}")]
    Mongo {
        operation: &'static str,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("{operation}: timed out after {}ms", .timeout.as_millis())]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    /// Backend answered with something the store can't interpret
    #[error("{operation}: {reason}")]
    Unexpected {
        operation: &'static str,
        reason: &'static str,
    },

    #[error("migration {version} ({name}) failed: {source}")]
    Migration {
        version: i64,
        name: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl DbError {
    /// `map_err` adapter tagging a sqlx failure with its operation.
    pub fn postgres(operation: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Postgres { operation, source }
    }

    /// `map_err` adapter tagging a driver failure with its operation.
    #[cfg(feature = "mongo")]
    pub fn mongo(operation: &'static str) -> impl FnOnce(mongodb::error::Error) -> Self {
        move |source| Self::Mongo { operation, source }
    }

    pub(crate) fn user_not_found(id: &str) -> Self {
        Self::NotFound {
            resource: "user",
            id: id.to_owned(),
        }
    }

    /// True for lookups that matched nothing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
