use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;
use uuid::Uuid;

use confess_db::Database;
use confess_types::api::{LoginRequest, LoginResponse};

use crate::error::{ApiError, ApiJson};
use crate::middleware::Claims;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// How long an issued token stays valid.
    pub token_ttl: chrono::Duration,
}

impl AppStateInner {
    pub fn new(db: Database, jwt_secret: String) -> Self {
        Self {
            db,
            jwt_secret,
            token_ttl: chrono::Duration::hours(24),
        }
    }
}

/// Exchange the admin credential for a bearer token. Unknown username and
/// wrong password are indistinguishable to the caller.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin = {
        let db = state.clone();
        let username = req.username.clone();
        tokio::task::spawn_blocking(move || db.db.get_admin_by_username(&username)).await??
    }
    .ok_or(ApiError::Auth("Invalid credentials"))?;

    verify_password(&req.password, &admin.password)?;

    let token = create_token(&state.jwt_secret, state.token_ttl, &admin.id, &admin.username)?;

    Ok(Json(LoginResponse {
        token,
        message: "Login successful".to_string(),
    }))
}

/// Create the configured admin account if no row with that username
/// exists yet. Called once from `main` before the server starts serving;
/// safe to call on every start.
pub fn ensure_default_admin(db: &Database, username: &str, password: &str) -> anyhow::Result<()> {
    if db.get_admin_by_username(username)?.is_some() {
        return Ok(());
    }

    let hash = hash_password(password)?;
    db.create_admin(&Uuid::new_v4().to_string(), username, &hash)?;
    info!("Created default admin account '{}'", username);
    Ok(())
}

pub fn create_token(
    secret: &str,
    ttl: chrono::Duration,
    admin_id: &str,
    username: &str,
) -> Result<String, ApiError> {
    let claims = Claims {
        sub: admin_id.to_string(),
        username: username.to_string(),
        exp: (chrono::Utc::now() + ttl).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(e.into()))?;

    Ok(token)
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?
        .to_string();
    Ok(hash)
}

fn verify_password(password: &str, stored_hash: &str) -> Result<(), ApiError> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt stored hash: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| ApiError::Auth("Invalid credentials"))
}
