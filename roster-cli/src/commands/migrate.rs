//! Schema migration command for the relational store

use anyhow::{Context, Result};
use clap::Parser;
use roster_server::db::create_pool;
use roster_server::db::migrations::{self, Direction};
use roster_server::PostgresSettings;

use super::database::DatabaseArgs;

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Direction: up applies all pending, down reverts the latest
    #[arg(long, default_value = "up")]
    pub dir: Direction,

    #[command(flatten)]
    pub database: DatabaseArgs,
}

/// Apply or revert schema migrations
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let settings = PostgresSettings::from(args.database);

    let pool = create_pool(&settings)
        .await
        .context("Failed to create database pool")?;

    let changed = migrations::run(&pool, args.dir)
        .await
        .with_context(|| format!("Migration {} failed", args.dir))?;

    for migration in &changed {
        println!("{} {:>3} {}", args.dir, migration.version, migration.name);
    }
    if changed.is_empty() {
        println!("Nothing to migrate");
    }

    pool.close().await;
    Ok(())
}
