//! Favorites API Handlers

use std::collections::HashSet;

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::Product;
use crate::services::FavoriteService;
use crate::utils::AppResult;

const RESOURCE_FAVORITE: &str = "favorite";

/// 收藏集合响应：product id 的集合
#[derive(Serialize)]
pub struct FavoriteSet {
    pub product_ids: HashSet<String>,
}

/// GET /api/favorites - 当前用户收藏的商品 (关联目录记录)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Product>>> {
    let service = FavoriteService::new(state.get_db());
    let products = service.favorite_products(&user.record_id()).await?;
    Ok(Json(products))
}

/// POST /api/favorites/:product_id/toggle - 翻转收藏标记
///
/// 返回翻转后的完整集合，客户端用它整体替换本地状态。
pub async fn toggle(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<FavoriteSet>> {
    let service = FavoriteService::new(state.get_db());
    let product_ids = service.toggle(&user.record_id(), &product_id).await?;

    state
        .broadcast_sync(RESOURCE_FAVORITE, "toggled", &product_id, Some(&product_ids))
        .await;

    Ok(Json(FavoriteSet { product_ids }))
}

/// GET /api/favorites/:product_id - 单个商品是否已收藏
pub async fn is_favorite(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<bool>> {
    let service = FavoriteService::new(state.get_db());
    let marked = service.is_favorite(&user.record_id(), &product_id).await?;
    Ok(Json(marked))
}
