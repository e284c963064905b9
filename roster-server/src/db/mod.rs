//! Database layer - storage trait, backends and migrations
//!
//! # Design Principles
//!
//! - One storage-agnostic [`UserStore`] trait, one implementation per backend
//! - The store is built once at startup and handed to the HTTP layer
//! - Drivers pool internally - no Arc<Mutex<Connection>>
//! - Every operation is bounded by [`UserRepo`]'s deadline

pub mod error;
pub mod memory;
pub mod migrations;
#[cfg(feature = "mongo")]
pub mod mongo;
pub mod pool;
pub mod postgres;
pub mod repo;

use std::sync::Arc;

use async_trait::async_trait;
use roster_core::{User, UserPayload};

use crate::config::{Backend, ServerConfig};

pub use error::DbError;
pub use memory::MemoryUserStore;
#[cfg(feature = "mongo")]
pub use mongo::MongoUserStore;
pub use pool::create_pool;
pub use postgres::PgUserStore;
pub use repo::UserRepo;

/// Storage operations for users.
///
/// Identifiers arrive as raw path segments; each backend decides what a
/// well-formed id looks like and reports [`DbError::InvalidId`] otherwise.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Which backend this is.
    fn backend(&self) -> Backend;

    /// All users, in insertion order.
    async fn list(&self) -> Result<Vec<User>, DbError>;

    /// One user, or [`DbError::NotFound`].
    async fn get(&self, id: &str) -> Result<User, DbError>;

    /// Insert a user; the store assigns the id.
    ///
    /// Email uniqueness is not enforced.
    async fn create(&self, payload: UserPayload) -> Result<User, DbError>;

    /// Replace every mutable field of an existing user.
    async fn update(&self, id: &str, payload: UserPayload) -> Result<User, DbError>;

    /// Remove a user. Removing a missing id is not an error.
    async fn delete(&self, id: &str) -> Result<(), DbError>;

    /// Release the underlying client.
    async fn close(&self) {}
}

/// Shared store handle
pub type SharedStore = Arc<dyn UserStore>;

/// Connect the backend selected in `config`.
///
/// For postgres with `migrate_on_start`, pending migrations run before
/// the store is returned.
pub async fn open_store(config: &ServerConfig) -> Result<SharedStore, DbError> {
    config.validate()?;

    match config.backend {
        Backend::Postgres => {
            let pool = create_pool(&config.postgres).await?;
            if config.migrate_on_start {
                let applied = migrations::up(&pool).await?;
                tracing::info!(applied = applied.len(), "Migrations applied on startup");
            }
            Ok(Arc::new(PgUserStore::new(pool)))
        }
        Backend::Mongo => open_mongo(config).await,
        Backend::Memory => {
            tracing::warn!("Using in-memory store - data is lost on shutdown");
            Ok(Arc::new(MemoryUserStore::new()))
        }
    }
}

#[cfg(feature = "mongo")]
async fn open_mongo(config: &ServerConfig) -> Result<SharedStore, DbError> {
    let store = MongoUserStore::connect(&config.mongo).await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "mongo"))]
async fn open_mongo(_config: &ServerConfig) -> Result<SharedStore, DbError> {
    Err(crate::config::ConfigError::BackendUnavailable(Backend::Mongo).into())
}
