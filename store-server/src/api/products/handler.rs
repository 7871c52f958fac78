//! Product API Handlers
//!
//! 目录浏览是公共接口 (GET 不需要登录)；写接口走全局认证中间件。
//! 每次写入后通过 `broadcast_sync` 通知目录推送刷新。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;

use crate::core::ServerState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::ProductRepository;
use crate::utils::{AppError, AppResult};

const RESOURCE_PRODUCT: &str = "product";

/// GET /api/products - 所有可售商品
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_available().await?;
    Ok(Json(products))
}

/// GET /api/products/by-category/:category - 按分类获取商品
///
/// 分类是精确匹配；"All" 返回全部可售商品。
pub async fn list_by_category(
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> AppResult<Json<Vec<Product>>> {
    let repo = ProductRepository::new(state.db.clone());
    let products = repo.find_by_category(&category).await?;
    Ok(Json(products))
}

/// GET /api/products/:id - 获取单个商品
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Product {}", id)))?;
    Ok(Json(product))
}

/// 目录推送的一帧：当前版本号加完整列表
#[derive(Serialize)]
pub struct FeedSnapshot {
    pub version: u64,
    pub products: Vec<Product>,
}

/// GET /api/products/feed/:category - 目录推送当前快照
///
/// 返回推送通道此刻的完整列表。客户端用版本号判断是否需要刷新；
/// 实时变更通过消息总线驱动同一通道。首次加载失败直接报错，
/// 不会以空列表冒充快照。
pub async fn feed_snapshot(
    State(state): State<ServerState>,
    Path(category): Path<String>,
) -> AppResult<Json<FeedSnapshot>> {
    let rx = state.catalog_feed.subscribe(&category).await?;
    let products = rx.borrow().clone();
    Ok(Json(FeedSnapshot {
        version: state.resource_versions.get(RESOURCE_PRODUCT),
        products,
    }))
}

/// POST /api/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Json(data): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.create(data).await?;

    let id = product.id.as_ref().map(|i| i.to_string()).unwrap_or_default();
    state
        .broadcast_sync(RESOURCE_PRODUCT, "created", &id, Some(&product))
        .await;

    Ok(Json(product))
}

/// PUT /api/products/:id - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(data): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let repo = ProductRepository::new(state.db.clone());
    let product = repo.update(&id, data).await?;

    state
        .broadcast_sync(RESOURCE_PRODUCT, "updated", &id, Some(&product))
        .await;

    Ok(Json(product))
}

/// DELETE /api/products/:id - 删除商品
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    let repo = ProductRepository::new(state.db.clone());
    repo.delete(&id).await?;

    state
        .broadcast_sync::<()>(RESOURCE_PRODUCT, "deleted", &id, None)
        .await;

    Ok(Json(serde_json::json!({ "deleted": id })))
}
