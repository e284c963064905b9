//! Application state shared across handlers

use std::time::Duration;

use roster_core::UserPayload;

use crate::config::{Backend, ServerConfig};
use crate::db::{SharedStore, UserRepo};

/// Shared application state
///
/// Built once at startup around the store handle; handlers get it through
/// `State<Arc<AppState>>`.
#[derive(Clone)]
pub struct AppState {
    store: SharedStore,
    aliases_enabled: bool,
    query_timeout: Duration,
}

impl AppState {
    pub fn new(store: SharedStore, config: &ServerConfig) -> Self {
        Self {
            store,
            aliases_enabled: config.aliases_enabled,
            query_timeout: config.query_timeout,
        }
    }

    /// Deadline-bounded repository over the store.
    pub fn users(&self) -> UserRepo<'_> {
        UserRepo::new(self.store.as_ref(), self.query_timeout)
    }

    pub fn backend(&self) -> Backend {
        self.store.backend()
    }

    pub fn aliases_enabled(&self) -> bool {
        self.aliases_enabled
    }

    /// Drop fields the deployment doesn't support before they reach storage.
    pub fn accept(&self, payload: UserPayload) -> UserPayload {
        if self.aliases_enabled {
            payload
        } else {
            payload.without_aliases()
        }
    }
}
