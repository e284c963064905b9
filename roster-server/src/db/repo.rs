//! User repository - deadline-bounded access to a [`UserStore`]
//!
//! Handlers go through this facade rather than the store directly. Each
//! call races the store future against the configured deadline; when the
//! deadline fires (or the request future is dropped) the store future is
//! dropped with it, which aborts the in-flight driver call.

use std::future::Future;
use std::time::Duration;

use roster_core::{User, UserPayload};

use super::{DbError, UserStore};

/// User repository
pub struct UserRepo<'a> {
    store: &'a dyn UserStore,
    timeout: Duration,
}

impl<'a> UserRepo<'a> {
    pub fn new(store: &'a dyn UserStore, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    pub async fn list(&self) -> Result<Vec<User>, DbError> {
        self.bounded("list_users", self.store.list()).await
    }

    pub async fn get(&self, id: &str) -> Result<User, DbError> {
        self.bounded("get_user", self.store.get(id)).await
    }

    pub async fn create(&self, payload: UserPayload) -> Result<User, DbError> {
        self.bounded("create_user", self.store.create(payload)).await
    }

    pub async fn update(&self, id: &str, payload: UserPayload) -> Result<User, DbError> {
        self.bounded("update_user", self.store.update(id, payload)).await
    }

    pub async fn delete(&self, id: &str) -> Result<(), DbError> {
        self.bounded("delete_user", self.store.delete(id)).await
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T, DbError>>,
    ) -> Result<T, DbError> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| DbError::Timeout {
                operation,
                timeout: self.timeout,
            })?
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::config::Backend;
    use crate::db::MemoryUserStore;

    /// Store whose every call hangs until the test clock moves past the deadline.
    struct StalledStore;

    #[async_trait]
    impl UserStore for StalledStore {
        fn backend(&self) -> Backend {
            Backend::Memory
        }

        async fn list(&self) -> Result<Vec<User>, DbError> {
            std::future::pending().await
        }

        async fn get(&self, _id: &str) -> Result<User, DbError> {
            std::future::pending().await
        }

        async fn create(&self, _payload: UserPayload) -> Result<User, DbError> {
            std::future::pending().await
        }

        async fn update(&self, _id: &str, _payload: UserPayload) -> Result<User, DbError> {
            std::future::pending().await
        }

        async fn delete(&self, _id: &str) -> Result<(), DbError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_times_out() {
        let repo = UserRepo::new(&StalledStore, Duration::from_millis(50));

        let err = repo.list().await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Timeout {
                operation: "list_users",
                ..
            }
        ));

        let err = repo.delete("x").await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Timeout {
                operation: "delete_user",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn passes_results_through() {
        let store = MemoryUserStore::new();
        let repo = UserRepo::new(&store, Duration::from_secs(1));

        let created = repo
            .create(UserPayload {
                email: "a@x.com".into(),
                first_name: "A".into(),
                last_name: "B".into(),
                age: 30,
                aliases: None,
            })
            .await
            .unwrap();

        assert_eq!(repo.get(&created.id).await.unwrap(), created);
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }
}
