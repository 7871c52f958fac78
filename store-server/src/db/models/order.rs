//! Order Model
//!
//! 订单头 + 订单行两张表。行在下单时冻结单价 (unit_price)，
//! 与目录当前价格解耦。

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order ID type
pub type OrderId = RecordId;

/// Order lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

/// Order header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<OrderId>,
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
    pub total_amount: f64,
    /// Unix millis
    pub order_date: i64,
    pub status: OrderStatus,
}

/// Order line, stamped with the order id and the price at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<RecordId>,
    #[serde(rename = "order_id", with = "serde_helpers::record_id")]
    pub order: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
    /// Price copied at order-creation time
    pub unit_price: f64,
}

/// Delivery contact fields supplied at checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderContact {
    pub customer_name: String,
    pub customer_address: String,
    pub customer_phone: String,
    #[serde(default)]
    pub notes: String,
}

/// One input line for order creation ("buy now" path)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLineInput {
    /// "product:xxx"
    pub product: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Admin status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusUpdate {
    pub status: OrderStatus,
}

/// Order header together with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderFull {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}
