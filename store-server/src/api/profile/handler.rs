//! Profile API Handlers
//!
//! 邮箱注册后不可变更，更新接口只接受 name / phone / photo_url。

use axum::{Json, extract::State};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::UserUpdate;
use crate::db::repository::UserRepository;
use crate::utils::{AppError, AppResult};
use shared::client::{ProfileUpdateRequest, UserInfo};

/// GET /api/profile - 当前用户资料
pub async fn get_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let repo = UserRepository::new(state.get_db());
    let account = repo
        .find_by_id(&user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {}", user.id)))?;
    Ok(Json(account.to_user_info()))
}

/// PUT /api/profile - 更新资料
pub async fn update_profile(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> AppResult<Json<UserInfo>> {
    if let Some(name) = &req.name
        && name.trim().is_empty()
    {
        return Err(AppError::validation("Name must not be empty"));
    }

    let repo = UserRepository::new(state.get_db());
    let account = repo
        .update(
            &user.id,
            UserUpdate {
                name: req.name,
                phone: req.phone,
                photo_url: req.photo_url,
            },
        )
        .await?;

    Ok(Json(account.to_user_info()))
}
