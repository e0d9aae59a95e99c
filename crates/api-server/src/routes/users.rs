//! User administration endpoints
//!
//! Registry moderation for the admin dashboard.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use hc_core::user::UserSummary;

use crate::auth::resolve_session;
use crate::routes::{auth_error, RouteError};
use crate::state::AppState;

/// GET /api/users - List registered users (admin)
async fn list_users(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<UserSummary>>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    let users = state
        .auth()
        .list_users(&session.actor())
        .await
        .map_err(auth_error)?;
    Ok(Json(users))
}

/// DELETE /api/users/{id} - Remove a registered account (admin)
async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<StatusCode, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    state
        .auth()
        .delete_user(&session.actor(), id)
        .await
        .map_err(auth_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", axum::routing::delete(delete_user))
}
