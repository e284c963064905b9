//! Versioned schema migrations for the relational store
//!
//! Migrations are embedded and applied in version order. Each one runs in
//! its own transaction together with its bookkeeping row in
//! `roster_schema_migrations`, so a failed step leaves no partial state.

use std::fmt;
use std::str::FromStr;

use sqlx::PgPool;

use super::DbError;

/// A single embedded migration
#[derive(Debug, Clone, Copy)]
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    up: &'static str,
    down: &'static str,
}

/// All migrations, oldest first.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "create_users",
        up: r#"
            CREATE TABLE IF NOT EXISTS users (
                user_id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                email TEXT NOT NULL,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                age INTEGER NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#,
        down: "DROP TABLE IF EXISTS users",
    },
    Migration {
        version: 2,
        name: "add_user_aliases",
        up: "ALTER TABLE users ADD COLUMN IF NOT EXISTS aliases TEXT[]",
        down: "ALTER TABLE users DROP COLUMN IF EXISTS aliases",
    },
];

/// Which way to migrate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Apply every pending migration
    Up,
    /// Revert the latest applied migration
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// Unrecognized direction string
#[derive(Debug, thiserror::Error)]
#[error("unknown migration direction '{0}' (expected 'up' or 'down')")]
pub struct InvalidDirection(String);

impl FromStr for Direction {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(InvalidDirection(other.to_owned())),
        }
    }
}

/// Run migrations in the given direction.
///
/// Returns the migrations that were applied (up) or reverted (down).
pub async fn run(pool: &PgPool, direction: Direction) -> Result<Vec<&'static Migration>, DbError> {
    match direction {
        Direction::Up => up(pool).await,
        Direction::Down => Ok(down(pool).await?.into_iter().collect()),
    }
}

/// Apply every pending migration. Running it twice is a no-op.
pub async fn up(pool: &PgPool) -> Result<Vec<&'static Migration>, DbError> {
    ensure_tracking_table(pool).await?;
    let current = current_version(pool).await?;

    let mut applied = Vec::new();
    for migration in pending(current) {
        tracing::info!(version = migration.version, name = migration.name, "Applying migration");
        let fail = |source| DbError::Migration {
            version: migration.version,
            name: migration.name,
            source,
        };

        let mut tx = pool.begin().await.map_err(fail)?;
        sqlx::query(migration.up)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;
        sqlx::query("INSERT INTO roster_schema_migrations (version, name) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.name)
            .execute(&mut *tx)
            .await
            .map_err(fail)?;
        tx.commit().await.map_err(fail)?;

        applied.push(migration);
    }

    if applied.is_empty() {
        tracing::info!(version = current, "Schema up to date");
    }
    Ok(applied)
}

/// Revert the latest applied migration, if any.
pub async fn down(pool: &PgPool) -> Result<Option<&'static Migration>, DbError> {
    ensure_tracking_table(pool).await?;
    let current = current_version(pool).await?;

    let Some(migration) = MIGRATIONS.iter().find(|m| m.version == current) else {
        tracing::info!("No migration to revert");
        return Ok(None);
    };

    tracing::info!(version = migration.version, name = migration.name, "Reverting migration");
    let fail = |source| DbError::Migration {
        version: migration.version,
        name: migration.name,
        source,
    };

    let mut tx = pool.begin().await.map_err(fail)?;
    sqlx::query(migration.down)
        .execute(&mut *tx)
        .await
        .map_err(fail)?;
    sqlx::query("DELETE FROM roster_schema_migrations WHERE version = $1")
        .bind(migration.version)
        .execute(&mut *tx)
        .await
        .map_err(fail)?;
    tx.commit().await.map_err(fail)?;

    Ok(Some(migration))
}

/// Migrations newer than `current`, oldest first.
fn pending(current: i64) -> impl Iterator<Item = &'static Migration> {
    MIGRATIONS.iter().filter(move |m| m.version > current)
}

async fn ensure_tracking_table(pool: &PgPool) -> Result<(), DbError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS roster_schema_migrations (
            version BIGINT PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(DbError::postgres("migrate"))?;
    Ok(())
}

/// Highest applied version, 0 on a fresh database.
async fn current_version(pool: &PgPool) -> Result<i64, DbError> {
    let (version,): (i64,) =
        sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM roster_schema_migrations")
            .fetch_one(pool)
            .await
            .map_err(DbError::postgres("migrate"))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_strictly_increase() {
        let versions: Vec<i64> = MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(versions.first(), Some(&1));
    }

    #[test]
    fn every_migration_is_reversible() {
        for m in MIGRATIONS {
            assert!(!m.up.trim().is_empty(), "{} has no up", m.name);
            assert!(!m.down.trim().is_empty(), "{} has no down", m.name);
        }
    }

    #[test]
    fn pending_skips_applied() {
        let names: Vec<&str> = pending(0).map(|m| m.name).collect();
        assert_eq!(names, vec!["create_users", "add_user_aliases"]);

        let names: Vec<&str> = pending(1).map(|m| m.name).collect();
        assert_eq!(names, vec!["add_user_aliases"]);

        assert_eq!(pending(2).count(), 0);
    }

    #[test]
    fn parses_direction() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert!("sideways".parse::<Direction>().is_err());
        assert_eq!(Direction::Down.to_string(), "down");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn up_is_idempotent() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&crate::config::PostgresSettings::from_url(url))
            .await
            .expect("pool creation failed");

        up(&pool).await.expect("first run failed");
        let second = up(&pool).await.expect("second run failed");
        assert!(second.is_empty());
    }
}
