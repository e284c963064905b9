//! In-process user store
//!
//! Nothing is persisted. Used by the HTTP tests and for running the server
//! without a database. Ids are UUID v4 and follow the same format rules as
//! the postgres store, so handlers behave identically on both.

use async_trait::async_trait;
use roster_core::{User, UserPayload};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::postgres::parse_uuid;
use super::{DbError, UserStore};
use crate::config::Backend;

/// Memory-backed [`UserStore`]
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    // Vec keeps insertion order for list()
    users: RwLock<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Canonical form of a path id, so `ABC...` and `abc...` address the same user.
fn canonical_id(id: &str) -> Result<String, DbError> {
    parse_uuid(id).map(|uuid| uuid.to_string())
}

#[async_trait]
impl UserStore for MemoryUserStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        Ok(self.users.read().await.clone())
    }

    async fn get(&self, id: &str) -> Result<User, DbError> {
        let key = canonical_id(id)?;
        self.users
            .read()
            .await
            .iter()
            .find(|u| u.id == key)
            .cloned()
            .ok_or_else(|| DbError::user_not_found(id))
    }

    async fn create(&self, payload: UserPayload) -> Result<User, DbError> {
        let user = payload.into_user(Uuid::new_v4().to_string());
        self.users.write().await.push(user.clone());
        Ok(user)
    }

    async fn update(&self, id: &str, payload: UserPayload) -> Result<User, DbError> {
        let key = canonical_id(id)?;
        let mut users = self.users.write().await;
        let slot = users
            .iter_mut()
            .find(|u| u.id == key)
            .ok_or_else(|| DbError::user_not_found(id))?;

        *slot = payload.into_user(key);
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        let key = canonical_id(id)?;
        self.users.write().await.retain(|u| u.id != key);
        Ok(())
    }
}
