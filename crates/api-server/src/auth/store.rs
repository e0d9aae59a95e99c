//! User registry with file persistence and stateless JWT sessions.
//!
//! Roles are fixed at registration time; sign-in never accepts a role. The
//! single admin identity is matched against configured credentials and is
//! never written into the registry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use hc_core::user::{Actor, Role, StoredUser, UserSummary};

const DEFAULT_JWT_SECRET: &str = "dev-jwt-secret-change-me";
const DEFAULT_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 8;
const DEFAULT_ADMIN_EMAIL: &str = "admin@hotelconnector.com";
const DEFAULT_ADMIN_PASSWORD: &str = "dev-admin-password-change-me";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("email '{0}' is already registered")]
    DuplicateEmail(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthClaims {
    pub sub: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// A verified session: the claims plus the registry view of the user.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub claims: AuthClaims,
    pub user: UserSummary,
}

impl AuthSession {
    /// The authorization view the marketplace repository checks against.
    pub fn actor(&self) -> Actor {
        Actor::new(self.user.email.clone(), self.user.role)
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    users: HashMap<Uuid, StoredUser>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredRegistryState {
    registered_users: Vec<StoredUser>,
}

impl From<StoredRegistryState> for RegistryState {
    fn from(value: StoredRegistryState) -> Self {
        Self {
            users: value
                .registered_users
                .into_iter()
                .map(|item| (item.id, item))
                .collect(),
        }
    }
}

impl From<&RegistryState> for StoredRegistryState {
    fn from(value: &RegistryState) -> Self {
        Self {
            registered_users: value.users.values().cloned().collect(),
        }
    }
}

#[derive(Clone)]
pub struct AuthStore {
    state: Arc<RwLock<RegistryState>>,
    file_path: PathBuf,
    jwt_secret: String,
    token_ttl_seconds: i64,
    admin_email: String,
    admin_password: String,
}

impl AuthStore {
    pub async fn new(base_dir: PathBuf) -> Result<Self, AuthError> {
        tokio::fs::create_dir_all(&base_dir)
            .await
            .map_err(|err| AuthError::Storage(format!("Failed to create auth directory: {}", err)))?;

        let file_path = base_dir.join("users.json");
        let state = load_state(&file_path).await?;
        let jwt_secret =
            std::env::var("HC_AUTH_JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string());
        let token_ttl_seconds = std::env::var("HC_AUTH_TOKEN_TTL_SECONDS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .filter(|ttl| *ttl > 0)
            .unwrap_or(DEFAULT_TOKEN_TTL_SECONDS);
        let admin_email = std::env::var("HC_ADMIN_EMAIL")
            .unwrap_or_else(|_| DEFAULT_ADMIN_EMAIL.to_string())
            .to_lowercase();
        let admin_password = std::env::var("HC_ADMIN_PASSWORD")
            .unwrap_or_else(|_| DEFAULT_ADMIN_PASSWORD.to_string());

        Ok(Self {
            state: Arc::new(RwLock::new(state)),
            file_path,
            jwt_secret,
            token_ttl_seconds,
            admin_email,
            admin_password,
        })
    }

    /// Create an account. The role is recorded once, here, and cannot be
    /// changed by later sign-ins. Registering as admin is refused.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> Result<AuthSession, AuthError> {
        let normalized_email = normalize_email(email)?;
        validate_password(password)?;
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(AuthError::InvalidInput(
                "Full name cannot be empty".to_string(),
            ));
        }
        if role == Role::Admin {
            return Err(AuthError::Forbidden(
                "The admin identity cannot be registered".to_string(),
            ));
        }
        if normalized_email == self.admin_email {
            return Err(AuthError::DuplicateEmail(normalized_email));
        }

        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|user| user.email == normalized_email)
        {
            return Err(AuthError::DuplicateEmail(normalized_email));
        }

        let user = StoredUser {
            id: Uuid::new_v4(),
            full_name: full_name.to_string(),
            email: normalized_email,
            password_hash: hash_password(password),
            role,
            created_at: Utc::now(),
        };
        state.users.insert(user.id, user.clone());
        persist_state(&self.file_path, &state).await?;
        drop(state);

        self.build_session(UserSummary::from(&user))
    }

    /// Sign in with registry credentials, or as the fixed admin identity.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let normalized_email = normalize_email(email)?;

        if normalized_email == self.admin_email {
            if password != self.admin_password {
                return Err(AuthError::AuthenticationRequired(
                    "Invalid credentials".to_string(),
                ));
            }
            return self.build_session(self.admin_summary());
        }

        let state = self.state.read().await;
        let user = state
            .users
            .values()
            .find(|user| user.email == normalized_email)
            .cloned()
            .ok_or_else(|| AuthError::AuthenticationRequired("Invalid credentials".to_string()))?;
        drop(state);

        if !verify_password(&user.password_hash, password) {
            return Err(AuthError::AuthenticationRequired(
                "Invalid credentials".to_string(),
            ));
        }
        self.build_session(UserSummary::from(&user))
    }

    /// Verify a bearer token and rebuild the session it names.
    pub async fn authorize_bearer(&self, token: &str) -> Result<AuthSession, AuthError> {
        let claims = self.decode_claims(token)?;
        let role = Role::from_str(&claims.role)
            .map_err(|err| AuthError::AuthenticationRequired(err.to_string()))?;

        if role == Role::Admin {
            if !claims.email.eq_ignore_ascii_case(&self.admin_email) {
                return Err(AuthError::AuthenticationRequired(
                    "Token does not match the admin identity".to_string(),
                ));
            }
            return Ok(AuthSession {
                claims,
                user: self.admin_summary(),
            });
        }

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AuthError::AuthenticationRequired("Invalid token subject".to_string()))?;
        let state = self.state.read().await;
        let user = state
            .users
            .get(&user_id)
            .ok_or_else(|| AuthError::AuthenticationRequired("User not found".to_string()))?;
        if user.role != role {
            return Err(AuthError::AuthenticationRequired(
                "Token role does not match the registry".to_string(),
            ));
        }
        Ok(AuthSession {
            claims,
            user: UserSummary::from(user),
        })
    }

    /// Registry listing, for the admin dashboard.
    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<UserSummary>, AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::Forbidden(
                "Only an admin can list users".to_string(),
            ));
        }
        let state = self.state.read().await;
        let mut users: Vec<UserSummary> = state.users.values().map(UserSummary::from).collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    /// Remove an account from the registry (admin only).
    pub async fn delete_user(&self, actor: &Actor, id: Uuid) -> Result<(), AuthError> {
        if !actor.is_admin() {
            return Err(AuthError::Forbidden(
                "Only an admin can delete users".to_string(),
            ));
        }
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(AuthError::NotFound(format!("User {} not found", id)));
        }
        persist_state(&self.file_path, &state).await?;
        Ok(())
    }

    fn admin_summary(&self) -> UserSummary {
        UserSummary {
            id: Uuid::nil(),
            full_name: "Administrator".to_string(),
            email: self.admin_email.clone(),
            role: Role::Admin,
            created_at: Utc::now(),
        }
    }

    fn build_session(&self, user: UserSummary) -> Result<AuthSession, AuthError> {
        let exp = (Utc::now() + Duration::seconds(self.token_ttl_seconds)).timestamp();
        let exp = usize::try_from(exp)
            .map_err(|_| AuthError::Storage("Failed to encode token expiration".to_string()))?;
        let claims = AuthClaims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.as_str().to_string(),
            exp,
        };
        Ok(AuthSession { claims, user })
    }

    pub fn encode_claims(&self, claims: &AuthClaims) -> Result<String, AuthError> {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|err| AuthError::Storage(format!("Failed to encode JWT: {}", err)))
    }

    pub fn decode_claims(&self, token: &str) -> Result<AuthClaims, AuthError> {
        let decoded = decode::<AuthClaims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|err| AuthError::AuthenticationRequired(format!("Invalid token: {}", err)))?;
        Ok(decoded.claims)
    }
}

async fn load_state(path: &Path) -> Result<RegistryState, AuthError> {
    if !path.exists() {
        return Ok(RegistryState::default());
    }
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to read user registry: {}", err)))?;
    if content.trim().is_empty() {
        return Ok(RegistryState::default());
    }
    match serde_json::from_str::<StoredRegistryState>(&content) {
        Ok(stored) => Ok(stored.into()),
        Err(err) => {
            tracing::warn!("Unreadable user registry at {:?}, starting empty: {}", path, err);
            Ok(RegistryState::default())
        }
    }
}

async fn persist_state(path: &Path, state: &RegistryState) -> Result<(), AuthError> {
    let content = serde_json::to_string_pretty(&StoredRegistryState::from(state))
        .map_err(|err| AuthError::Storage(format!("Failed to serialize user registry: {}", err)))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await.map_err(|err| {
            AuthError::Storage(format!("Failed to create auth parent dir: {}", err))
        })?;
    }
    tokio::fs::write(path, content)
        .await
        .map_err(|err| AuthError::Storage(format!("Failed to write user registry: {}", err)))?;
    Ok(())
}

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if normalized.is_empty() || !normalized.contains('@') {
        return Err(AuthError::InvalidInput("Invalid email".to_string()));
    }
    Ok(normalized)
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.len() < 8 {
        return Err(AuthError::InvalidInput(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> String {
    let mut salt = [0_u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    let digest = hasher.finalize();

    format!(
        "v1${}${}",
        URL_SAFE_NO_PAD.encode(salt),
        URL_SAFE_NO_PAD.encode(digest)
    )
}

fn verify_password(stored_hash: &str, password: &str) -> bool {
    let mut parts = stored_hash.split('$');
    let version = parts.next();
    let encoded_salt = parts.next();
    let encoded_digest = parts.next();
    if version != Some("v1") || encoded_salt.is_none() || encoded_digest.is_none() {
        return false;
    }

    let salt = match URL_SAFE_NO_PAD.decode(encoded_salt.unwrap()) {
        Ok(value) => value,
        Err(_) => return false,
    };
    let expected_digest = match URL_SAFE_NO_PAD.decode(encoded_digest.unwrap()) {
        Ok(value) => value,
        Err(_) => return false,
    };

    let mut hasher = Sha256::new();
    hasher.update(&salt);
    hasher.update(password.as_bytes());
    let actual_digest = hasher.finalize();
    expected_digest == actual_digest.as_slice()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    async fn build_store() -> (AuthStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = AuthStore::new(temp_dir.path().join("auth")).await.unwrap();
        (store, temp_dir)
    }

    #[tokio::test]
    async fn test_register_and_login_roundtrip() {
        let (store, _temp_dir) = build_store().await;
        let session = store
            .register("guest@example.com", "verysecurepw", "Ada Guest", Role::Booker)
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::Booker);

        let token = store.encode_claims(&session.claims).unwrap();
        let authed = store.authorize_bearer(&token).await.unwrap();
        assert_eq!(authed.user.email, "guest@example.com");
        assert_eq!(authed.actor().role, Role::Booker);

        let relogin = store.login("Guest@Example.COM", "verysecurepw").await.unwrap();
        assert_eq!(relogin.user.id, session.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_is_refused() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("host@example.com", "verysecurepw", "Host", Role::Owner)
            .await
            .unwrap();
        let result = store
            .register("HOST@example.com", "otherpassword", "Imposter", Role::Booker)
            .await;
        assert!(matches!(result, Err(AuthError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_role_is_fixed_at_registration() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("host@example.com", "verysecurepw", "Host", Role::Owner)
            .await
            .unwrap();
        // Sign-in takes no role parameter; the stored one always wins.
        let session = store.login("host@example.com", "verysecurepw").await.unwrap();
        assert_eq!(session.user.role, Role::Owner);
    }

    #[tokio::test]
    async fn test_admin_identity() {
        let (store, _temp_dir) = build_store().await;

        let result = store
            .register("someone@example.com", "verysecurepw", "Someone", Role::Admin)
            .await;
        assert!(matches!(result, Err(AuthError::Forbidden(_))));

        let wrong = store.login(DEFAULT_ADMIN_EMAIL, "not-the-password").await;
        assert!(matches!(wrong, Err(AuthError::AuthenticationRequired(_))));

        let session = store
            .login("Admin@HotelConnector.com", DEFAULT_ADMIN_PASSWORD)
            .await
            .unwrap();
        assert_eq!(session.user.role, Role::Admin);

        // The admin never lands in the registry
        let listed = store.list_users(&session.actor()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_password_is_rejected() {
        let (store, _temp_dir) = build_store().await;
        store
            .register("guest@example.com", "verysecurepw", "Ada", Role::Booker)
            .await
            .unwrap();
        let result = store.login("guest@example.com", "wrongpassword").await;
        assert!(matches!(result, Err(AuthError::AuthenticationRequired(_))));
    }

    #[tokio::test]
    async fn test_user_admin_operations() {
        let (store, _temp_dir) = build_store().await;
        let session = store
            .register("guest@example.com", "verysecurepw", "Ada", Role::Booker)
            .await
            .unwrap();
        let booker = session.actor();
        let admin = Actor::new(DEFAULT_ADMIN_EMAIL, Role::Admin);

        assert!(matches!(
            store.list_users(&booker).await,
            Err(AuthError::Forbidden(_))
        ));

        let users = store.list_users(&admin).await.unwrap();
        assert_eq!(users.len(), 1);

        assert!(matches!(
            store.delete_user(&booker, session.user.id).await,
            Err(AuthError::Forbidden(_))
        ));
        store.delete_user(&admin, session.user.id).await.unwrap();
        assert!(matches!(
            store.delete_user(&admin, session.user.id).await,
            Err(AuthError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_registry_persists_across_instances() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("auth");
        let user_id;
        {
            let store = AuthStore::new(dir.clone()).await.unwrap();
            let session = store
                .register("guest@example.com", "verysecurepw", "Ada", Role::Booker)
                .await
                .unwrap();
            user_id = session.user.id;
        }
        let store = AuthStore::new(dir).await.unwrap();
        let relogin = store.login("guest@example.com", "verysecurepw").await.unwrap();
        assert_eq!(relogin.user.id, user_id);
    }
}
