//! Cart Line Model

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Cart line ID type
pub type CartLineId = RecordId;

/// A single (owner, product) line in the cart
///
/// quantity >= 1 is expected but not enforced at this layer;
/// the UI is the only place that prevents going below 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<CartLineId>,
    #[serde(with = "serde_helpers::record_id")]
    pub owner: RecordId,
    #[serde(with = "serde_helpers::record_id")]
    pub product: RecordId,
    pub quantity: i64,
}

/// Add-to-cart payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartAdd {
    /// "product:xxx"
    pub product: String,
    /// Defaults to 1
    #[serde(default = "default_qty")]
    pub quantity: i64,
}

fn default_qty() -> i64 {
    1
}

/// Quantity update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartQuantityUpdate {
    pub quantity: i64,
}
