//! User endpoints

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use roster_core::User;
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::ValidUserPayload;
use crate::http::state::AppState;

/// List entry: id and names only
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummaryResponse {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserSummaryResponse {
    fn from(u: User) -> Self {
        Self {
            user_id: u.id,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

/// Full user response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    /// Outer `None` omits the field; `Some(None)` renders `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<Option<Vec<String>>>,
}

impl UserResponse {
    pub fn new(u: User, aliases_enabled: bool) -> Self {
        Self {
            user_id: u.id,
            email: u.email,
            first_name: u.first_name,
            last_name: u.last_name,
            age: u.age,
            aliases: aliases_enabled.then_some(u.aliases),
        }
    }
}

/// GET /users - list all users
async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserSummaryResponse>>, ApiError> {
    let users = state.users().list().await?;
    Ok(Json(users.into_iter().map(UserSummaryResponse::from).collect()))
}

/// GET /users/{id} - get a single user
async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users().get(&id).await?;
    Ok(Json(UserResponse::new(user, state.aliases_enabled())))
}

/// POST /users - create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidUserPayload(payload): ValidUserPayload,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users().create(state.accept(payload)).await?;
    tracing::info!(id = %user.id, "User created");
    Ok(Json(UserResponse::new(user, state.aliases_enabled())))
}

/// PATCH /users/{id} - replace every field of an existing user
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidUserPayload(payload): ValidUserPayload,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users().update(&id, state.accept(payload)).await?;
    Ok(Json(UserResponse::new(user, state.aliases_enabled())))
}

/// DELETE /users/{id} - always 204
///
/// Failures (malformed id, storage errors, timeouts) are logged, not
/// reported to the client.
async fn delete_user(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> StatusCode {
    if let Err(err) = state.users().delete(&id).await {
        tracing::warn!(id = %id, error = %err, "delete_user failed; responding 204 anyway");
    }
    StatusCode::NO_CONTENT
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}
