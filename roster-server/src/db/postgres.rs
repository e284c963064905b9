//! Relational user store
//!
//! Backed by the `users` table created by [`super::migrations`]:
//! - ids are UUIDs generated by Postgres
//! - list keeps insertion order (`created_at`, then id)
//! - update/delete are single statements; no read-then-write

use async_trait::async_trait;
use roster_core::{User, UserPayload};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{DbError, UserStore};
use crate::config::Backend;

/// Row shape shared by every query below
#[derive(Debug, Clone, FromRow)]
struct UserRow {
    user_id: Uuid,
    email: String,
    first_name: String,
    last_name: String,
    age: i32,
    aliases: Option<Vec<String>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.user_id.to_string(),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            age: row.age,
            aliases: row.aliases,
        }
    }
}

/// Parse a path id into a UUID.
pub(crate) fn parse_uuid(id: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(id).map_err(|_| DbError::InvalidId {
        id: id.to_owned(),
        reason: "expected a UUID",
    })
}

/// Postgres-backed [`UserStore`]
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        let rows: Vec<UserRow> = sqlx::query_as(
            r#"
            SELECT user_id, email, first_name, last_name, age, aliases
            FROM users
            ORDER BY created_at, user_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::postgres("list_users"))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn get(&self, id: &str) -> Result<User, DbError> {
        let user_id = parse_uuid(id)?;

        let row: UserRow = sqlx::query_as(
            r#"
            SELECT user_id, email, first_name, last_name, age, aliases
            FROM users
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::postgres("get_user"))?
        .ok_or_else(|| DbError::user_not_found(id))?;

        Ok(row.into())
    }

    async fn create(&self, payload: UserPayload) -> Result<User, DbError> {
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, first_name, last_name, age, aliases)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING user_id, email, first_name, last_name, age, aliases
            "#,
        )
        .bind(&payload.email)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.age)
        .bind(&payload.aliases)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::postgres("create_user"))?;

        Ok(row.into())
    }

    async fn update(&self, id: &str, payload: UserPayload) -> Result<User, DbError> {
        let user_id = parse_uuid(id)?;

        let row: UserRow = sqlx::query_as(
            r#"
            UPDATE users
            SET email = $1,
                first_name = $2,
                last_name = $3,
                age = $4,
                aliases = $5
            WHERE user_id = $6
            RETURNING user_id, email, first_name, last_name, age, aliases
            "#,
        )
        .bind(&payload.email)
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(payload.age)
        .bind(&payload.aliases)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::postgres("update_user"))?
        .ok_or_else(|| DbError::user_not_found(id))?;

        Ok(row.into())
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        let user_id = parse_uuid(id)?;

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(DbError::postgres("delete_user"))?;

        tracing::debug!(id, rows = result.rows_affected(), "delete_user");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("PostgreSQL pool closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PostgresSettings;
    use crate::db::{create_pool, migrations};

    #[test]
    fn parses_uuid_ids() {
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        assert_eq!(parse_uuid(id).unwrap().to_string(), id);

        let err = parse_uuid("507f1f77bcf86cd799439011").unwrap_err();
        assert!(matches!(err, DbError::InvalidId { reason: "expected a UUID", .. }));
    }

    // Run with: DATABASE_URL=postgres://... cargo test -p roster-server -- --ignored

    async fn store() -> PgUserStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&PostgresSettings::from_url(url))
            .await
            .expect("pool creation failed");
        migrations::up(&pool).await.expect("migrations failed");
        PgUserStore::new(pool)
    }

    fn payload(email: &str) -> UserPayload {
        UserPayload {
            email: email.into(),
            first_name: "A".into(),
            last_name: "B".into(),
            age: 30,
            aliases: Some(vec!["ab".into()]),
        }
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_get_update_delete() {
        let store = store().await;

        let created = store.create(payload("pg@x.com")).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.aliases, Some(vec!["ab".into()]));

        let fetched = store.get(&created.id).await.unwrap();
        assert_eq!(fetched, created);

        let replacement = UserPayload {
            aliases: None,
            ..payload("pg2@x.com")
        };
        let updated = store.update(&created.id, replacement).await.unwrap();
        assert_eq!(updated.email, "pg2@x.com");
        assert_eq!(updated.aliases, None);

        store.delete(&created.id).await.unwrap();
        assert!(store.get(&created.id).await.unwrap_err().is_not_found());

        // second delete is still fine
        store.delete(&created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn update_missing_is_not_found() {
        let store = store().await;
        let err = store
            .update(&Uuid::new_v4().to_string(), payload("ghost@x.com"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
