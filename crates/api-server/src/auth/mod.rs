//! User registry and session auth for the marketplace API.

mod store;

pub use store::{AuthClaims, AuthError, AuthSession, AuthStore};

use axum::http::{header, HeaderMap};

/// Pull the bearer token out of the Authorization header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AuthError::AuthenticationRequired("Missing bearer token".to_string()))
}

/// Resolve the session behind a request, or fail with 401 material.
pub async fn resolve_session(
    store: &AuthStore,
    headers: &HeaderMap,
) -> Result<AuthSession, AuthError> {
    let token = bearer_token(headers)?;
    store.authorize_bearer(token).await
}
