//! HTTP server command
//!
//! Opens the selected store and serves the `/users` API until shutdown.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use roster_server::config::DEFAULT_MONGO_DATABASE;
use roster_server::{open_store, run_server, Backend, MongoSettings, ServerConfig};

use super::database::DatabaseArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "SERVER_PORT", default_value_t = 3030)]
    pub port: u16,

    /// Storage backend: postgres, mongo or memory
    #[arg(long, env = "ROSTER_BACKEND", default_value = "postgres")]
    pub backend: Backend,

    #[command(flatten)]
    pub database: DatabaseArgs,

    /// Document store connection URI
    #[arg(long, env = "MONGO_DB_URI", hide_env_values = true)]
    pub mongo_uri: Option<String>,

    /// Document store database name
    #[arg(long, env = "MONGO_DB_NAME", default_value = DEFAULT_MONGO_DATABASE)]
    pub mongo_database: String,

    /// Accept and return the optional aliases field
    #[arg(long, env = "ROSTER_ALIASES")]
    pub aliases: bool,

    /// Whole-request deadline in seconds
    #[arg(long, env = "ROSTER_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout: u64,

    /// Per-query deadline in seconds
    #[arg(long, env = "ROSTER_QUERY_TIMEOUT", default_value_t = 10)]
    pub query_timeout: u64,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Apply pending migrations before serving (postgres only)
    #[arg(long)]
    pub migrate: bool,
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        Self {
            bind_addr: SocketAddr::new(args.host, args.port),
            backend: args.backend,
            postgres: args.database.into(),
            mongo: MongoSettings {
                uri: args.mongo_uri,
                database: args.mongo_database,
            },
            aliases_enabled: args.aliases,
            request_timeout: Duration::from_secs(args.request_timeout),
            query_timeout: Duration::from_secs(args.query_timeout),
            cors_permissive: args.cors_permissive,
            migrate_on_start: args.migrate,
        }
    }
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let config = ServerConfig::from(args);

    tracing::info!(backend = %config.backend, "Starting roster server on {}", config.bind_addr);

    let store = open_store(&config)
        .await
        .with_context(|| format!("Failed to open {} store", config.backend))?;

    // Run server (blocks until shutdown)
    run_server(store, &config).await.context("Server error")?;

    Ok(())
}
