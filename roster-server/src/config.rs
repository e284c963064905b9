//! Server configuration
//!
//! Plain data. The `roster` binary fills it from flags, the environment
//! and `.env`; tests build it directly.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

/// Default maximum connections for the postgres pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Default postgres port when assembling options from parts.
pub const DEFAULT_DB_PORT: u16 = 5432;

/// Default document database name.
pub const DEFAULT_MONGO_DATABASE: &str = "roster";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown storage backend '{0}' (expected postgres, mongo or memory)")]
    UnknownBackend(String),

    #[error("{backend} backend requires {setting}")]
    MissingSetting {
        backend: Backend,
        setting: &'static str,
    },

    #[error("invalid database URL: {0}")]
    InvalidDatabaseUrl(#[source] sqlx::Error),

    #[error("{0} backend is not compiled in (rebuild with `--features {0}`)")]
    BackendUnavailable(Backend),
}

/// Storage backend selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Relational store (`users` table)
    Postgres,
    /// Document store (`users` collection)
    Mongo,
    /// In-process store, nothing persisted
    Memory,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mongo => "mongo",
            Self::Memory => "memory",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "mongo" | "mongodb" => Ok(Self::Mongo),
            "memory" | "mem" => Ok(Self::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_owned())),
        }
    }
}

/// Postgres connection settings.
///
/// Either a full `url`, or individual parts with `host` set.
#[derive(Debug, Clone)]
pub struct PostgresSettings {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
    pub max_connections: u32,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: None,
            port: DEFAULT_DB_PORT,
            user: None,
            password: None,
            database: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl PostgresSettings {
    /// Settings from a connection URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Resolve into sqlx connect options.
    ///
    /// A URL wins over parts; parts connect without TLS. Without either,
    /// this is a config error.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return url.parse().map_err(ConfigError::InvalidDatabaseUrl);
        }

        let host = self
            .host
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .ok_or(ConfigError::MissingSetting {
                backend: Backend::Postgres,
                setting: "DATABASE_URL or DB_HOST",
            })?;

        let mut options = PgConnectOptions::new()
            .host(host)
            .port(self.port)
            .ssl_mode(PgSslMode::Disable);
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        Ok(options)
    }
}

/// Document-store connection settings
#[derive(Debug, Clone)]
pub struct MongoSettings {
    pub uri: Option<String>,
    pub database: String,
}

impl Default for MongoSettings {
    fn default() -> Self {
        Self {
            uri: None,
            database: DEFAULT_MONGO_DATABASE.to_owned(),
        }
    }
}

impl MongoSettings {
    /// The connection URI, required for the mongo backend.
    pub fn require_uri(&self) -> Result<&str, ConfigError> {
        self.uri
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or(ConfigError::MissingSetting {
                backend: Backend::Mongo,
                setting: "MONGO_DB_URI",
            })
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:3030)
    pub bind_addr: SocketAddr,

    /// Storage backend
    pub backend: Backend,

    pub postgres: PostgresSettings,

    pub mongo: MongoSettings,

    /// Accept and return the optional `aliases` field
    pub aliases_enabled: bool,

    /// Whole-request deadline enforced by the HTTP layer
    pub request_timeout: Duration,

    /// Deadline for a single storage operation
    pub query_timeout: Duration,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Apply pending migrations before serving (postgres only)
    pub migrate_on_start: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3030)),
            backend: Backend::Postgres,
            postgres: PostgresSettings::default(),
            mongo: MongoSettings::default(),
            aliases_enabled: false,
            request_timeout: Duration::from_secs(30),
            query_timeout: Duration::from_secs(10),
            cors_permissive: false,
            migrate_on_start: false,
        }
    }
}

impl ServerConfig {
    /// In-process configuration, used by tests and local runs.
    pub fn memory() -> Self {
        Self {
            backend: Backend::Memory,
            ..Self::default()
        }
    }

    /// Check that the selected backend has what it needs to connect.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            Backend::Postgres => self.postgres.connect_options().map(|_| ()),
            Backend::Mongo => {
                if !cfg!(feature = "mongo") {
                    return Err(ConfigError::BackendUnavailable(Backend::Mongo));
                }
                self.mongo.require_uri().map(|_| ())
            }
            Backend::Memory => Ok(()),
        }
    }
}
