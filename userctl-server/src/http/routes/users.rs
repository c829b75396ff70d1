//! User endpoints
//!
//! Each handler validates first (via extractors), then issues exactly one
//! store call. Absent rows on GET/PUT follow `NotFoundPolicy`; DELETE always
//! confirms.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;

use crate::http::error::ApiError;
use crate::http::extractors::{ValidUser, ValidUserId};
use crate::http::server::{AppState, NotFoundPolicy};
use crate::models::UserRecord;

/// Fixed confirmation returned by DELETE
pub const DELETED_MESSAGE: &str = "User deleted";

/// DELETE response body
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /users/ - create a user
async fn create_user(
    State(state): State<Arc<AppState>>,
    ValidUser(fields): ValidUser,
) -> Result<(StatusCode, Json<UserRecord>), ApiError> {
    let id = state.store.insert(&fields).await?;
    tracing::info!(user_id = id, "user created");

    Ok((StatusCode::CREATED, Json(UserRecord::new(id, fields))))
}

/// GET /users/ - list all users
async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<Vec<UserRecord>>, ApiError> {
    let users = state.store.select_all().await?;
    tracing::debug!(count = users.len(), "listed users");
    Ok(Json(users))
}

/// GET /users/{id} - get a single user
///
/// Compat mode answers `null` for a missing row.
async fn get_user(
    State(state): State<Arc<AppState>>,
    ValidUserId(id): ValidUserId,
) -> Result<Json<Option<UserRecord>>, ApiError> {
    let user = state.store.select_one(id).await?;

    match (user, state.not_found) {
        (Some(user), _) => Ok(Json(Some(user))),
        (None, NotFoundPolicy::Compat) => Ok(Json(None)),
        (None, NotFoundPolicy::Strict) => Err(user_not_found(id)),
    }
}

/// PUT /users/{id} - replace every field of a user
///
/// Responds with the submitted fields and the path id. In compat mode this
/// happens even when no row matched.
async fn replace_user(
    State(state): State<Arc<AppState>>,
    ValidUserId(id): ValidUserId,
    ValidUser(fields): ValidUser,
) -> Result<Json<UserRecord>, ApiError> {
    let rows_affected = state.store.update(id, &fields).await?;
    tracing::debug!(user_id = id, rows_affected, "user replaced");

    if rows_affected == 0 && state.not_found == NotFoundPolicy::Strict {
        return Err(user_not_found(id));
    }

    Ok(Json(UserRecord::new(id, fields)))
}

/// DELETE /users/{id} - remove a user (no existence check)
async fn delete_user(
    State(state): State<Arc<AppState>>,
    ValidUserId(id): ValidUserId,
) -> Result<Json<MessageResponse>, ApiError> {
    let rows_affected = state.store.delete(id).await?;
    tracing::debug!(user_id = id, rows_affected, "user deleted");

    Ok(Json(MessageResponse {
        message: DELETED_MESSAGE,
    }))
}

fn user_not_found(id: i64) -> ApiError {
    ApiError::NotFound {
        resource: "user",
        id: id.to_string(),
    }
}

/// User routes (collection reachable with or without trailing slash)
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/", get(list_users).post(create_user))
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/{id}",
            get(get_user).put(replace_user).delete(delete_user),
        )
}
