//! CurrentUser 提取器
//!
//! 令牌验证只发生在 [`require_auth`](crate::auth::require_auth) 中间件里；
//! 这里只把中间件注入请求扩展的 [`CurrentUser`] 取出来交给处理器。
//! 扩展缺失说明路由没有经过认证中间件，一律按未登录处理。

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::security_log;

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<CurrentUser>() {
            Some(user) => Ok(user.clone()),
            None => {
                security_log!("WARN", "auth_missing", uri = format!("{:?}", parts.uri));
                Err(AppError::unauthorized())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn injected_user_is_handed_to_the_handler() {
        let mut parts = parts("/api/cart");
        parts.extensions.insert(CurrentUser {
            id: "user:ada".to_string(),
            email: "ada@example.com".to_string(),
        });

        let user = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(user.id, "user:ada");
        assert_eq!(user.email, "ada@example.com");
    }

    #[tokio::test]
    async fn missing_extension_is_rejected() {
        let mut parts = parts("/api/cart");
        let result = CurrentUser::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
