//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! 只有认证相关的错误携带稳定的 [`ErrorCode`]；
//! 其它错误统一以自由文本消息返回 (参见 shared::error)。
//!
//! # 使用示例
//!
//! ```ignore
//! // 返回错误
//! Err(AppError::not_found("Product cake:x"))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::error::ErrorCode;
use tracing::error;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": 0,
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (0 表示成功)
    pub code: u16,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
///
/// | 分类 | 说明 |
/// |------|------|
/// | 认证错误 | 未登录、令牌过期、无效凭据 |
/// | 业务逻辑错误 | 资源不存在、验证失败、冲突 |
/// | 系统错误 | 数据库错误、内部错误 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (4xx) ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    /// 携带稳定错误码的认证错误 (如 InvalidCredentials, EmailTaken)
    #[error("{}", .0.default_message())]
    Auth(ErrorCode),

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource already exists: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid request: {0}")]
    Invalid(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn unauthorized() -> Self {
        Self::Unauthorized
    }

    pub fn token_expired() -> Self {
        Self::TokenExpired
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// 统一的登录失败错误，防止邮箱枚举
    pub fn invalid_credentials() -> Self {
        Self::Auth(ErrorCode::InvalidCredentials)
    }
}

impl From<crate::db::repository::RepoError> for AppError {
    fn from(err: crate::db::repository::RepoError) -> Self {
        use crate::db::repository::RepoError;
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::NotAuthenticated,
                self.to_string(),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenExpired,
                self.to_string(),
            ),
            AppError::InvalidToken(_) => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::TokenInvalid,
                self.to_string(),
            ),
            AppError::Auth(code) => {
                let status = match code {
                    ErrorCode::EmailTaken => StatusCode::CONFLICT,
                    ErrorCode::PasswordTooShort => StatusCode::BAD_REQUEST,
                    ErrorCode::AccountDisabled => StatusCode::FORBIDDEN,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (status, *code, code.default_message().to_string())
            }

            // Authorization errors (403)
            AppError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::PermissionDenied, msg.clone())
            }

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorCode::NotFound, msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, ErrorCode::AlreadyExists, msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::ValidationFailed, msg.clone())
            }

            // Invalid request (400)
            AppError::Invalid(msg) => {
                (StatusCode::BAD_REQUEST, ErrorCode::InvalidRequest, msg.clone())
            }

            // Database errors (500) - 记录但不暴露细节
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DatabaseError,
                    ErrorCode::DatabaseError.default_message().to_string(),
                )
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::InternalError,
                    ErrorCode::InternalError.default_message().to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.into(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

/// 处理器的 Result 类型别名
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn auth_constructors_map_to_401() {
        assert_eq!(status_of(AppError::unauthorized()), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::token_expired()), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(AppError::invalid_token("bad header")),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn repo_errors_keep_their_category() {
        use crate::db::repository::RepoError;
        assert_eq!(
            status_of(RepoError::NotFound("x".into()).into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(RepoError::Duplicate("x".into()).into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(RepoError::Validation("x".into()).into()),
            StatusCode::BAD_REQUEST
        );
    }
}
