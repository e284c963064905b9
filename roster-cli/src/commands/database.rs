//! Postgres connection flags shared by `serve` and `migrate`

use clap::Args;
use roster_server::config::{DEFAULT_DB_PORT, DEFAULT_MAX_CONNECTIONS};
use roster_server::PostgresSettings;

/// Relational store connection arguments
#[derive(Args, Debug, Clone)]
pub struct DatabaseArgs {
    /// Database URL (takes precedence over the DB_* parts)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Database host
    #[arg(long, env = "DB_HOST")]
    pub db_host: Option<String>,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = DEFAULT_DB_PORT)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,

    /// Maximum pooled connections
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
}

impl From<DatabaseArgs> for PostgresSettings {
    fn from(args: DatabaseArgs) -> Self {
        Self {
            url: args.database_url,
            host: args.db_host,
            port: args.db_port,
            user: args.db_user,
            password: args.db_password,
            database: args.db_name,
            max_connections: args.max_connections,
        }
    }
}
