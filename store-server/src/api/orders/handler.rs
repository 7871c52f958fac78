//! Order API Handlers
//!
//! 两条下单路径：
//! - `checkout`: 把购物车行固化成订单行，成功后清空购物车
//! - `buy_now`: 直接下单指定行，完全不触碰购物车
//!
//! 两条路径共用 [`OrderSubmission`] 状态机驱动提交，
//! 订单行的 unit_price 在提交时刻定格，之后目录调价不回写。

use axum::{
    Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderContact, OrderFull, OrderLineInput, OrderStatusUpdate};
use crate::services::{CartService, OrderService, OrderSubmission, SubmitState};
use crate::utils::{AppError, AppResult};

const RESOURCE_ORDER: &str = "customer_order";

/// Checkout 请求：联系信息；订单行取自当前购物车
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    #[serde(flatten)]
    pub contact: OrderContact,
}

/// Buy-now 请求：联系信息加显式订单行
#[derive(Debug, Deserialize)]
pub struct BuyNowRequest {
    #[serde(flatten)]
    pub contact: OrderContact,
    pub lines: Vec<OrderLineInput>,
}

/// 提交结果
#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub order_id: String,
    pub total_amount: f64,
}

fn validate_contact(contact: &OrderContact) -> Result<(), AppError> {
    if contact.customer_name.trim().is_empty() {
        return Err(AppError::validation("Customer name must not be empty"));
    }
    if contact.customer_address.trim().is_empty() {
        return Err(AppError::validation("Delivery address must not be empty"));
    }
    if contact.customer_phone.trim().is_empty() {
        return Err(AppError::validation("Phone number must not be empty"));
    }
    Ok(())
}

/// 通过状态机驱动一次提交，把终态映射为 HTTP 结果
async fn drive_submission(
    service: &OrderService,
    owner: &surrealdb::RecordId,
    contact: OrderContact,
    lines: Vec<OrderLineInput>,
) -> Result<Order, AppError> {
    let submission = OrderSubmission::new();
    let service = service.clone();
    let owner = owner.clone();

    let created = std::sync::Arc::new(tokio::sync::Mutex::new(None));
    let slot = created.clone();

    let terminal = submission
        .submit(async move {
            match service.create_order(&owner, contact, &lines).await {
                Ok(order) => {
                    let id = order
                        .id
                        .as_ref()
                        .map(|i| i.to_string())
                        .unwrap_or_default();
                    *slot.lock().await = Some(order);
                    Ok(id)
                }
                Err(e) => Err(e.to_string()),
            }
        })
        .await;

    match terminal {
        SubmitState::Success(_) => {
            let order = created.lock().await.take();
            order.ok_or_else(|| AppError::internal("Submission settled without an order"))
        }
        SubmitState::Error(message) => Err(AppError::database(message)),
        // submit() on a fresh machine always reaches a terminal state
        other => Err(AppError::internal(format!(
            "Submission did not settle: {:?}",
            other
        ))),
    }
}

/// POST /api/orders/checkout - 购物车结算
///
/// 订单创建成功后清空购物车；清空失败只记录，不回滚订单。
pub async fn checkout(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<CheckoutRequest>,
) -> AppResult<Json<SubmitResponse>> {
    validate_contact(&req.contact)?;

    let owner = user.record_id();
    let cart_service = CartService::new(state.get_db());
    let order_service = OrderService::new(state.get_db());

    let cart = cart_service.load_cart(&owner).await?;
    if cart.lines.is_empty() {
        return Err(AppError::validation("Cart is empty"));
    }

    // 结算时刻的价格定格进订单行
    let lines: Vec<OrderLineInput> = cart
        .lines
        .iter()
        .map(|line| OrderLineInput {
            product: line
                .product
                .id
                .as_ref()
                .map(|i| i.to_string())
                .unwrap_or_default(),
            quantity: line.quantity,
            unit_price: line.product.price,
        })
        .collect();

    let order = drive_submission(&order_service, &owner, req.contact, lines).await?;
    let order_id = order.id.as_ref().map(|i| i.to_string()).unwrap_or_default();

    if let Err(e) = cart_service.clear_cart(&owner).await {
        tracing::error!(order_id = %order_id, error = %e, "Order created but cart not cleared");
    }

    state
        .broadcast_sync(RESOURCE_ORDER, "created", &order_id, Some(&order))
        .await;

    Ok(Json(SubmitResponse {
        order_id,
        total_amount: order.total_amount,
    }))
}

/// POST /api/orders - 直接下单 (buy now)
///
/// 不读取也不清空购物车。
pub async fn buy_now(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(req): Json<BuyNowRequest>,
) -> AppResult<Json<SubmitResponse>> {
    validate_contact(&req.contact)?;
    if req.lines.is_empty() {
        return Err(AppError::validation("Order must contain at least one line"));
    }
    for line in &req.lines {
        if line.quantity < 1 {
            return Err(AppError::validation("Line quantity must be at least 1"));
        }
        if line.unit_price < 0.0 {
            return Err(AppError::validation("Unit price must be non-negative"));
        }
    }

    let owner = user.record_id();
    let order_service = OrderService::new(state.get_db());

    let order = drive_submission(&order_service, &owner, req.contact, req.lines).await?;
    let order_id = order.id.as_ref().map(|i| i.to_string()).unwrap_or_default();

    state
        .broadcast_sync(RESOURCE_ORDER, "created", &order_id, Some(&order))
        .await;

    Ok(Json(SubmitResponse {
        order_id,
        total_amount: order.total_amount,
    }))
}

/// GET /api/orders - 当前用户的订单，按下单时间倒序
pub async fn list_mine(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let service = OrderService::new(state.get_db());
    let orders = service.orders_for(&user.record_id()).await?;
    Ok(Json(orders))
}

/// GET /api/orders/:id - 订单头加订单行
///
/// 零行订单正常返回 (行写入失败留下的残留)。他人订单一律 404。
pub async fn get_full(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderFull>> {
    let service = OrderService::new(state.get_db());
    let full = service
        .find_full(&id)
        .await?
        .filter(|f| f.order.owner == user.record_id())
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;
    Ok(Json(full))
}

/// PUT /api/orders/:id/status - 覆盖订单状态
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<OrderStatusUpdate>,
) -> AppResult<Json<Order>> {
    let service = OrderService::new(state.get_db());

    // 只能操作自己的订单
    service
        .find_full(&id)
        .await?
        .filter(|f| f.order.owner == user.record_id())
        .ok_or_else(|| AppError::not_found(format!("Order {}", id)))?;

    let order = service.set_status(&id, req.status).await?;

    state
        .broadcast_sync(RESOURCE_ORDER, "updated", &id, Some(&order))
        .await;

    Ok(Json(order))
}
