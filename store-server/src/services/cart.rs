//! Cart Aggregator
//!
//! 把原始购物车行与目录记录内联 join，得到带价行、总金额和总件数。
//! 所有变更操作完成后都做一次全量重载，没有增量/乐观更新。

use serde::Serialize;
use std::collections::HashMap;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::models::{CartLine, Product};
use crate::db::repository::{CartRepository, ProductRepository, RepoError, RepoResult, parse_id};

/// Cart line joined to its catalog record. Derived, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct PricedCartLine {
    /// "cart_line:xxx"
    pub id: String,
    pub product: Product,
    pub quantity: i64,
    /// quantity × product.price
    pub line_total: f64,
}

/// The aggregated cart for one owner
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub lines: Vec<PricedCartLine>,
    /// Σ(quantity × price) over joined lines
    pub total_amount: f64,
    /// Σ(quantity)
    pub item_count: i64,
}

impl CartView {
    pub fn empty() -> Self {
        Self {
            lines: Vec::new(),
            total_amount: 0.0,
            item_count: 0,
        }
    }
}

/// Join raw cart lines to catalog records and reduce them.
///
/// Lines whose product no longer exists are silently dropped — not an error.
pub fn aggregate(lines: &[CartLine], products: &[Product]) -> CartView {
    let by_id: HashMap<String, &Product> = products
        .iter()
        .filter_map(|p| p.id.as_ref().map(|id| (id.to_string(), p)))
        .collect();

    let mut priced = Vec::new();
    let mut total_amount = 0.0;
    let mut item_count = 0;

    for line in lines {
        let Some(product) = by_id.get(&line.product.to_string()) else {
            continue;
        };
        let line_total = line.quantity as f64 * product.price;
        total_amount += line_total;
        item_count += line.quantity;
        priced.push(PricedCartLine {
            id: line.id.as_ref().map(|id| id.to_string()).unwrap_or_default(),
            product: (*product).clone(),
            quantity: line.quantity,
            line_total,
        });
    }

    CartView {
        lines: priced,
        total_amount,
        item_count,
    }
}

/// Cart service — repositories plus the aggregation above
#[derive(Clone)]
pub struct CartService {
    cart_repo: CartRepository,
    product_repo: ProductRepository,
}

impl CartService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            cart_repo: CartRepository::new(db.clone()),
            product_repo: ProductRepository::new(db),
        }
    }

    /// Full reload of an owner's cart
    pub async fn load_cart(&self, owner: &RecordId) -> RepoResult<CartView> {
        let lines = self.cart_repo.find_by_owner(owner).await?;
        let products = self.product_repo.find_all().await?;
        Ok(aggregate(&lines, &products))
    }

    /// Add `quantity` of a product. An existing (owner, product) line is
    /// incremented; otherwise a new line is inserted. Returns the fresh view.
    pub async fn add_to_cart(
        &self,
        owner: &RecordId,
        product_id: &str,
        quantity: i64,
    ) -> RepoResult<CartView> {
        let product = parse_id("product", product_id)?;

        match self.cart_repo.find_line(owner, &product).await? {
            Some(line) => {
                let line_id = line.id.as_ref().map(|id| id.to_string()).unwrap_or_default();
                self.cart_repo
                    .set_quantity(&line_id, line.quantity + quantity)
                    .await?;
            }
            None => {
                self.cart_repo.insert_line(owner, &product, quantity).await?;
            }
        }

        self.load_cart(owner).await
    }

    /// Overwrite a line's quantity and reload.
    ///
    /// Lines belonging to another owner are reported as not found.
    pub async fn update_quantity(
        &self,
        owner: &RecordId,
        line_id: &str,
        quantity: i64,
    ) -> RepoResult<CartView> {
        self.owned_line(owner, line_id).await?;
        self.cart_repo.set_quantity(line_id, quantity).await?;
        self.load_cart(owner).await
    }

    /// Remove a line and reload
    pub async fn remove_line(&self, owner: &RecordId, line_id: &str) -> RepoResult<CartView> {
        self.owned_line(owner, line_id).await?;
        self.cart_repo.delete_line(line_id).await?;
        self.load_cart(owner).await
    }

    async fn owned_line(&self, owner: &RecordId, line_id: &str) -> RepoResult<CartLine> {
        match self.cart_repo.find_by_id(line_id).await? {
            Some(line) if line.owner == *owner => Ok(line),
            _ => Err(RepoError::NotFound(format!(
                "Cart line {} not found",
                line_id
            ))),
        }
    }

    /// Delete every line for the owner
    pub async fn clear_cart(&self, owner: &RecordId) -> RepoResult<CartView> {
        self.cart_repo.delete_by_owner(owner).await?;
        self.load_cart(owner).await
    }
}
