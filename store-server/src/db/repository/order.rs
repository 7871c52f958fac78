//! Order Repository
//!
//! 订单头和订单行是两次独立写入，没有事务保护；
//! 行写入失败会留下一个零行订单头 (读取侧容忍)。

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{Order, OrderLine, OrderStatus};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const ORDER_TABLE: &str = "customer_order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Persist the order header
    #[allow(clippy::too_many_arguments)]
    pub async fn create_header(
        &self,
        owner: &RecordId,
        customer_name: String,
        customer_address: String,
        customer_phone: String,
        notes: String,
        total_amount: f64,
        order_date: i64,
    ) -> RepoResult<Order> {
        let mut result = self
            .base
            .db()
            .query(
                "CREATE customer_order SET owner = $owner, customer_name = $customer_name, \
                 customer_address = $customer_address, customer_phone = $customer_phone, \
                 notes = $notes, total_amount = $total_amount, order_date = $order_date, \
                 status = $status RETURN AFTER",
            )
            .bind(("owner", owner.clone()))
            .bind(("customer_name", customer_name))
            .bind(("customer_address", customer_address))
            .bind(("customer_phone", customer_phone))
            .bind(("notes", notes))
            .bind(("total_amount", total_amount))
            .bind(("order_date", order_date))
            .bind(("status", OrderStatus::Pending))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    /// Persist one order line, stamped with the order id and unit price
    pub async fn insert_line(
        &self,
        order: &RecordId,
        product: &RecordId,
        quantity: i64,
        unit_price: f64,
    ) -> RepoResult<OrderLine> {
        let mut result = self
            .base
            .db()
            .query(
                "CREATE order_line SET order_id = $order, product = $product, \
                 quantity = $quantity, unit_price = $unit_price RETURN AFTER",
            )
            .bind(("order", order.clone()))
            .bind(("product", product.clone()))
            .bind(("quantity", quantity))
            .bind(("unit_price", unit_price))
            .await?;
        let lines: Vec<OrderLine> = result.take(0)?;
        lines
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create order line".to_string()))
    }

    /// Orders for an owner, newest first
    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM customer_order WHERE owner = $owner ORDER BY order_date DESC")
            .bind(("owner", owner.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Order header by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let record_id = parse_id(ORDER_TABLE, id)?;
        let order: Option<Order> = self.base.db().select(record_id).await?;
        Ok(order)
    }

    /// Lines of an order. A header with zero lines is returned as an empty vec.
    pub async fn find_lines(&self, order: &RecordId) -> RepoResult<Vec<OrderLine>> {
        let lines: Vec<OrderLine> = self
            .base
            .db()
            .query("SELECT * FROM order_line WHERE order_id = $order")
            .bind(("order", order.clone()))
            .await?
            .take(0)?;
        Ok(lines)
    }

    /// Overwrite the status field
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        let record_id = parse_id(ORDER_TABLE, id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $order SET status = $status RETURN AFTER")
            .bind(("order", record_id))
            .bind(("status", status))
            .await?;
        let orders: Vec<Order> = result.take(0)?;
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {} not found", id)))
    }
}
