//! Cart API Handlers
//!
//! 所有变更接口都返回聚合后的完整购物车视图 (全量重载)，
//! 并在写入后通过 `broadcast_sync` 通知订阅端。

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{CartAdd, CartQuantityUpdate};
use crate::services::{CartService, CartView};
use crate::utils::{AppError, AppResult};

const RESOURCE_CART_LINE: &str = "cart_line";

/// GET /api/cart - 当前用户的购物车视图
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartView>> {
    let service = CartService::new(state.get_db());
    let view = service.load_cart(&user.record_id()).await?;
    Ok(Json(view))
}

/// POST /api/cart/items - 加入购物车 (同商品自动合并)
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CartAdd>,
) -> AppResult<Json<CartView>> {
    if req.quantity < 1 {
        return Err(AppError::validation("Quantity must be at least 1"));
    }

    let service = CartService::new(state.get_db());
    let view = service
        .add_to_cart(&user.record_id(), &req.product, req.quantity)
        .await?;

    state
        .broadcast_sync(RESOURCE_CART_LINE, "created", &req.product, Some(&view))
        .await;

    Ok(Json(view))
}

/// PUT /api/cart/items/:id - 覆盖行数量 (不做下限约束)
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CartQuantityUpdate>,
) -> AppResult<Json<CartView>> {
    let service = CartService::new(state.get_db());
    let view = service
        .update_quantity(&user.record_id(), &id, req.quantity)
        .await?;

    state
        .broadcast_sync(RESOURCE_CART_LINE, "updated", &id, Some(&view))
        .await;

    Ok(Json(view))
}

/// DELETE /api/cart/items/:id - 删除单行
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<CartView>> {
    let service = CartService::new(state.get_db());
    let view = service.remove_line(&user.record_id(), &id).await?;

    state
        .broadcast_sync(RESOURCE_CART_LINE, "deleted", &id, Some(&view))
        .await;

    Ok(Json(view))
}

/// DELETE /api/cart - 清空购物车
pub async fn clear(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartView>> {
    let service = CartService::new(state.get_db());
    let view = service.clear_cart(&user.record_id()).await?;

    state
        .broadcast_sync(RESOURCE_CART_LINE, "deleted", &user.id, Some(&view))
        .await;

    Ok(Json(view))
}
