//! Document user store
//!
//! Users live in the `users` collection; `_id` is a driver-generated
//! ObjectId, exposed to clients as 24 lowercase hex characters.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Collection};
use roster_core::{User, UserPayload};
use serde::{Deserialize, Serialize};

use super::{DbError, UserStore};
use crate::config::{Backend, MongoSettings};

/// Collection holding user documents
pub const USERS_COLLECTION: &str = "users";

/// Stored document shape
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    email: String,
    first_name: String,
    last_name: String,
    age: i32,
    #[serde(default)]
    aliases: Option<Vec<String>>,
}

impl From<UserPayload> for UserDocument {
    fn from(p: UserPayload) -> Self {
        Self {
            id: None,
            email: p.email,
            first_name: p.first_name,
            last_name: p.last_name,
            age: p.age,
            aliases: p.aliases,
        }
    }
}

impl UserDocument {
    fn into_user(self, id: ObjectId) -> User {
        User {
            id: id.to_hex(),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            age: self.age,
            aliases: self.aliases,
        }
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId, DbError> {
    ObjectId::parse_str(id).map_err(|_| DbError::InvalidId {
        id: id.to_owned(),
        reason: "expected a 24-character hex object id",
    })
}

/// MongoDB-backed [`UserStore`]
#[derive(Clone)]
pub struct MongoUserStore {
    client: Client,
    users: Collection<UserDocument>,
}

impl MongoUserStore {
    /// Connect and ping the deployment.
    pub async fn connect(settings: &MongoSettings) -> Result<Self, DbError> {
        let uri = settings.require_uri()?;

        let client = Client::with_uri_str(uri)
            .await
            .map_err(DbError::mongo("connect"))?;

        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(DbError::mongo("ping"))?;

        tracing::info!(database = %settings.database, "Connected to MongoDB");

        let users = client
            .database(&settings.database)
            .collection::<UserDocument>(USERS_COLLECTION);

        Ok(Self { client, users })
    }
}

/// Documents read back always carry `_id`.
fn stored(document: UserDocument, operation: &'static str) -> Result<User, DbError> {
    let id = document.id.ok_or(DbError::Unexpected {
        operation,
        reason: "document without _id",
    })?;
    Ok(document.into_user(id))
}

#[async_trait]
impl UserStore for MongoUserStore {
    fn backend(&self) -> Backend {
        Backend::Mongo
    }

    async fn list(&self) -> Result<Vec<User>, DbError> {
        let documents: Vec<UserDocument> = self
            .users
            .find(doc! {})
            .sort(doc! { "_id": 1 })
            .await
            .map_err(DbError::mongo("list_users"))?
            .try_collect()
            .await
            .map_err(DbError::mongo("list_users"))?;

        documents
            .into_iter()
            .map(|d| stored(d, "list_users"))
            .collect()
    }

    async fn get(&self, id: &str) -> Result<User, DbError> {
        let oid = parse_object_id(id)?;

        let document = self
            .users
            .find_one(doc! { "_id": oid })
            .await
            .map_err(DbError::mongo("get_user"))?
            .ok_or_else(|| DbError::user_not_found(id))?;

        stored(document, "get_user")
    }

    async fn create(&self, payload: UserPayload) -> Result<User, DbError> {
        let document = UserDocument::from(payload);

        let result = self
            .users
            .insert_one(&document)
            .await
            .map_err(DbError::mongo("create_user"))?;

        match result.inserted_id {
            Bson::ObjectId(oid) => Ok(document.into_user(oid)),
            _ => Err(DbError::Unexpected {
                operation: "create_user",
                reason: "insert returned a non-ObjectId id",
            }),
        }
    }

    async fn update(&self, id: &str, payload: UserPayload) -> Result<User, DbError> {
        let oid = parse_object_id(id)?;

        let document = self
            .users
            .find_one_and_replace(doc! { "_id": oid }, UserDocument::from(payload))
            .return_document(ReturnDocument::After)
            .await
            .map_err(DbError::mongo("update_user"))?
            .ok_or_else(|| DbError::user_not_found(id))?;

        stored(document, "update_user")
    }

    async fn delete(&self, id: &str) -> Result<(), DbError> {
        let oid = parse_object_id(id)?;

        let result = self
            .users
            .delete_one(doc! { "_id": oid })
            .await
            .map_err(DbError::mongo("delete_user"))?;

        tracing::debug!(id, deleted = result.deleted_count, "delete_user");
        Ok(())
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("MongoDB client closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_ids() {
        let oid = parse_object_id("507f1f77bcf86cd799439011").unwrap();
        assert_eq!(oid.to_hex(), "507f1f77bcf86cd799439011");

        let err = parse_object_id("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap_err();
        assert!(matches!(err, DbError::InvalidId { .. }));
    }

    #[test]
    fn new_documents_have_no_id() {
        let document = UserDocument::from(UserPayload {
            email: "a@x.com".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            age: 30,
            aliases: None,
        });
        let bson = mongodb::bson::to_document(&document).unwrap();
        assert!(!bson.contains_key("_id"));
        assert!(matches!(bson.get("aliases"), Some(Bson::Null)));
        assert_eq!(bson.get_str("first_name").unwrap(), "A");
    }

    // Run with: MONGO_DB_URI=mongodb://... cargo test -p roster-server --features mongo -- --ignored

    #[tokio::test]
    #[ignore = "requires database"]
    async fn create_get_update_delete() {
        let uri = std::env::var("MONGO_DB_URI").expect("MONGO_DB_URI required");
        let store = MongoUserStore::connect(&MongoSettings {
            uri: Some(uri),
            database: "roster_test".into(),
        })
        .await
        .expect("connect failed");

        let created = store
            .create(UserPayload {
                email: "m@x.com".into(),
                first_name: "M".into(),
                last_name: "N".into(),
                age: 40,
                aliases: None,
            })
            .await
            .unwrap();
        assert_eq!(created.id.len(), 24);
        assert_eq!(store.get(&created.id).await.unwrap(), created);

        store.delete(&created.id).await.unwrap();
        assert!(store.get(&created.id).await.unwrap_err().is_not_found());
    }
}
