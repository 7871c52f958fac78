//! Authentication Handlers
//!
//! Handles registration, login, logout, and the current-user endpoint

use std::time::Duration;

use axum::{Json, extract::State};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Credential;
use crate::db::repository::UserRepository;
use crate::utils::now_millis;
use shared::error::ErrorCode;

// Re-use shared DTOs for API consistency
use shared::client::{LoginRequest, LoginResponse, RegisterRequest, UserInfo};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// 口令最短长度
const MIN_PASSWORD_LEN: usize = 8;

/// Register handler
///
/// Creates the account record and its credential, then signs the user in.
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let repo = UserRepository::new(state.get_db());

    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::Auth(ErrorCode::PasswordTooShort));
    }
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::validation("A valid email address is required"));
    }
    if req.name.trim().is_empty() {
        return Err(AppError::validation("Name must not be empty"));
    }

    if repo.find_by_email(&email).await?.is_some() {
        return Err(AppError::Auth(ErrorCode::EmailTaken));
    }

    let user = repo
        .create(req.name.trim().to_string(), email, req.phone, now_millis())
        .await?;
    let user_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Created user missing id"))?;

    let password_hash = Credential::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {}", e)))?;
    repo.insert_credential(&user_id, password_hash).await?;

    let token = state
        .jwt_service
        .generate_token(&user_id.to_string(), &user.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user_id, "User registered");

    Ok(Json(LoginResponse {
        token,
        user: user.to_user_info(),
    }))
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let repo = UserRepository::new(state.get_db());
    let email = req.email.trim().to_lowercase();

    let user = repo.find_by_email(&email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent email enumeration
    let user = match user {
        Some(u) => u,
        None => {
            tracing::warn!(email = %email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user_id = user
        .id
        .clone()
        .ok_or_else(|| AppError::internal("Stored user missing id"))?;

    let credential = repo
        .credential_for(&user_id)
        .await?
        .ok_or_else(|| AppError::invalid_credentials())?;

    let password_valid = credential
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))?;

    if !password_valid {
        tracing::warn!(email = %email, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_token(&user_id.to_string(), &user.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(user_id = %user_id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        user: user.to_user_info(),
    }))
}

/// Get current user info (fresh from the database)
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> Result<Json<UserInfo>, AppError> {
    let repo = UserRepository::new(state.get_db());
    let account = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;
    Ok(Json(account.to_user_info()))
}

/// Logout handler
///
/// JWT 是无状态的；登出只在客户端丢弃令牌，这里仅做审计记录。
pub async fn logout(user: CurrentUser) -> Json<serde_json::Value> {
    tracing::info!(user_id = %user.id, "User logged out");
    Json(serde_json::json!({ "status": "ok" }))
}
