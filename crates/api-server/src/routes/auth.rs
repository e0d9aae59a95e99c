//! Auth API endpoints
//!
//! Registration and sign-in hand out bearer tokens; `/api/auth/me` echoes the
//! session a token names.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hc_core::user::Role;

use crate::auth::{resolve_session, AuthSession};
use crate::routes::{auth_error, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    email: String,
    password: String,
    full_name: String,
    /// `owner` or `booker`; fixed for the lifetime of the account
    role: Role,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    token: String,
    expires_at: String,
    user_id: String,
    email: String,
    full_name: String,
    role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MeResponse {
    user_id: String,
    email: String,
    full_name: String,
    role: String,
}

fn format_expiry(exp: usize) -> String {
    DateTime::<Utc>::from_timestamp(exp as i64, 0)
        .map(|when| when.to_rfc3339())
        .unwrap_or_default()
}

fn auth_response(session: AuthSession, token: String) -> AuthResponse {
    AuthResponse {
        token,
        expires_at: format_expiry(session.claims.exp),
        user_id: session.user.id.to_string(),
        email: session.user.email,
        full_name: session.user.full_name,
        role: session.user.role.as_str().to_string(),
    }
}

/// POST /api/auth/register - Create an account and sign it in
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), RouteError> {
    let session = state
        .auth()
        .register(&req.email, &req.password, &req.full_name, req.role)
        .await
        .map_err(auth_error)?;
    let token = state.auth().encode_claims(&session.claims).map_err(auth_error)?;
    Ok((StatusCode::CREATED, Json(auth_response(session, token))))
}

/// POST /api/auth/login - Sign in with registry or admin credentials
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, RouteError> {
    let session = state
        .auth()
        .login(&req.email, &req.password)
        .await
        .map_err(auth_error)?;
    let token = state.auth().encode_claims(&session.claims).map_err(auth_error)?;
    Ok(Json(auth_response(session, token)))
}

/// GET /api/auth/me - The session behind the bearer token
async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, RouteError> {
    let session = resolve_session(state.auth(), &headers)
        .await
        .map_err(auth_error)?;
    Ok(Json(MeResponse {
        user_id: session.user.id.to_string(),
        email: session.user.email,
        full_name: session.user.full_name,
        role: session.user.role.as_str().to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
}
