//! Order Submission
//!
//! 订单头和订单行是两次相互独立的顺序写入（没有事务、没有补偿回滚）。
//! 行写入在头写入之后失败时，会留下一个零行订单——读取侧容忍这种情况。
//!
//! [`OrderSubmission`] 是提交过程的状态机：
//! Initial → Loading → Success(order_id) | Error(message)。
//! 终态只能通过显式 `clear()` 回到 Initial。

use std::future::Future;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use tokio::sync::watch;

use crate::db::models::{Order, OrderContact, OrderFull, OrderLineInput, OrderStatus};
use crate::db::repository::{OrderRepository, RepoError, RepoResult, parse_id};
use crate::utils::now_millis;

/// Σ(quantity × unit_price) over the exact lines passed in,
/// independent of any catalog price that may have since changed.
pub fn order_total(lines: &[OrderLineInput]) -> f64 {
    lines
        .iter()
        .map(|line| line.quantity as f64 * line.unit_price)
        .sum()
}

/// Order service — order/order_line persistence
#[derive(Clone)]
pub struct OrderService {
    repo: OrderRepository,
}

impl OrderService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: OrderRepository::new(db),
        }
    }

    /// Create an order from the given lines.
    ///
    /// Step 1: compute total from `lines`. Step 2: persist the header with
    /// status Pending. Step 3: persist one order_line per input line.
    /// The steps are sequential and unguarded; a failure in step 3 leaves
    /// an order header with zero (or fewer) lines.
    pub async fn create_order(
        &self,
        owner: &RecordId,
        contact: OrderContact,
        lines: &[OrderLineInput],
    ) -> RepoResult<Order> {
        let total_amount = order_total(lines);

        let order = self
            .repo
            .create_header(
                owner,
                contact.customer_name,
                contact.customer_address,
                contact.customer_phone,
                contact.notes,
                total_amount,
                now_millis(),
            )
            .await?;

        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Created order missing id".to_string()))?;

        for line in lines {
            let product = parse_id("product", &line.product)?;
            self.repo
                .insert_line(&order_id, &product, line.quantity, line.unit_price)
                .await?;
        }

        Ok(order)
    }

    /// Orders for an owner, newest first
    pub async fn orders_for(&self, owner: &RecordId) -> RepoResult<Vec<Order>> {
        self.repo.find_by_owner(owner).await
    }

    /// Order header together with its lines
    pub async fn find_full(&self, id: &str) -> RepoResult<Option<OrderFull>> {
        let Some(order) = self.repo.find_by_id(id).await? else {
            return Ok(None);
        };
        let order_id = order
            .id
            .clone()
            .ok_or_else(|| RepoError::Database("Stored order missing id".to_string()))?;
        let lines = self.repo.find_lines(&order_id).await?;
        Ok(Some(OrderFull { order, lines }))
    }

    /// Overwrite the status field (admin)
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> RepoResult<Order> {
        self.repo.set_status(id, status).await
    }
}

// =============================================================================
// Submission state machine
// =============================================================================

/// Lifecycle state of one order submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitState {
    Initial,
    Loading,
    /// Terminal: carries the created order id
    Success(String),
    /// Terminal: carries the failure message verbatim, no classification
    Error(String),
}

impl SubmitState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmitState::Success(_) | SubmitState::Error(_))
    }
}

/// One-shot submission holder, re-published through a watch channel.
///
/// The terminal signal is consumed once by the observer (to navigate away);
/// a second submission requires an explicit [`clear`](Self::clear).
#[derive(Debug)]
pub struct OrderSubmission {
    tx: watch::Sender<SubmitState>,
}

impl OrderSubmission {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(SubmitState::Initial);
        Self { tx }
    }

    /// Current state
    pub fn state(&self) -> SubmitState {
        self.tx.borrow().clone()
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<SubmitState> {
        self.tx.subscribe()
    }

    /// Drive one submission. Transitions Initial → Loading, awaits the
    /// operation, then settles in exactly one of Success/Error.
    ///
    /// Calling while not Initial is a no-op returning the current state:
    /// an in-flight or settled submission is never restarted implicitly.
    pub async fn submit<F>(&self, operation: F) -> SubmitState
    where
        F: Future<Output = Result<String, String>>,
    {
        if self.state() != SubmitState::Initial {
            return self.state();
        }

        self.tx.send_replace(SubmitState::Loading);

        let terminal = match operation.await {
            Ok(order_id) => SubmitState::Success(order_id),
            Err(message) => SubmitState::Error(message),
        };
        self.tx.send_replace(terminal.clone());
        terminal
    }

    /// Explicitly reset to Initial (the only way back from a terminal state)
    pub fn clear(&self) {
        self.tx.send_replace(SubmitState::Initial);
    }
}

impl Default for OrderSubmission {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::OrderLineInput;

    fn input(product: &str, quantity: i64, unit_price: f64) -> OrderLineInput {
        OrderLineInput {
            product: format!("product:{}", product),
            quantity,
            unit_price,
        }
    }

    #[test]
    fn total_is_sum_over_passed_lines() {
        let lines = vec![
            input("red_velvet", 2, 500.0),
            input("tiramisu", 1, 400.0),
            input("cheesecake", 3, 600.0),
        ];
        assert_eq!(order_total(&lines), 3200.0);
    }

    #[test]
    fn total_of_no_lines_is_zero() {
        assert_eq!(order_total(&[]), 0.0);
    }

    #[tokio::test]
    async fn submission_settles_in_success() {
        let submission = OrderSubmission::new();
        let mut rx = submission.subscribe();
        assert_eq!(submission.state(), SubmitState::Initial);

        let result = submission
            .submit(async { Ok("customer_order:abc".to_string()) })
            .await;
        assert_eq!(result, SubmitState::Success("customer_order:abc".into()));

        // Observer saw the transitions; final value is the terminal state
        rx.mark_changed();
        assert!(rx.borrow_and_update().is_terminal());
    }

    #[tokio::test]
    async fn submission_error_carries_message_verbatim() {
        let submission = OrderSubmission::new();
        let result = submission
            .submit(async { Err("Database error: write failed".to_string()) })
            .await;
        assert_eq!(
            result,
            SubmitState::Error("Database error: write failed".into())
        );
    }

    #[tokio::test]
    async fn terminal_state_requires_explicit_clear() {
        let submission = OrderSubmission::new();
        submission.submit(async { Ok("customer_order:a".to_string()) }).await;

        // A second submit without clear() is a no-op on the settled state
        let state = submission
            .submit(async { Ok("customer_order:b".to_string()) })
            .await;
        assert_eq!(state, SubmitState::Success("customer_order:a".into()));

        submission.clear();
        assert_eq!(submission.state(), SubmitState::Initial);

        let state = submission
            .submit(async { Ok("customer_order:b".to_string()) })
            .await;
        assert_eq!(state, SubmitState::Success("customer_order:b".into()));
    }

    #[tokio::test]
    async fn order_total_ignores_catalog_price_changes() {
        let db = crate::db::DbService::new_in_memory().await.unwrap().db;
        let product_repo = crate::db::repository::ProductRepository::new(db.clone());
        let service = OrderService::new(db);

        let created = product_repo
            .create(crate::db::models::ProductCreate {
                name: "Tiramisu".into(),
                description: None,
                price: 400.0,
                image_url: None,
                category: "Classic".into(),
                is_available: Some(true),
            })
            .await
            .unwrap();
        let product_id = created.id.clone().unwrap().to_string();

        // Catalog price moves after the lines were captured
        product_repo
            .update(
                &product_id,
                crate::db::models::ProductUpdate {
                    name: None,
                    description: None,
                    price: Some(999.0),
                    image_url: None,
                    category: None,
                    is_available: None,
                },
            )
            .await
            .unwrap();

        let owner = RecordId::from_table_key("user", "u1");
        let order = service
            .create_order(
                &owner,
                OrderContact {
                    customer_name: "Ada".into(),
                    customer_address: "1 Main St".into(),
                    customer_phone: "555".into(),
                    notes: String::new(),
                },
                &[input("tiramisu", 2, 400.0)],
            )
            .await
            .unwrap();

        // Stamped with the passed unit price, not the current catalog price
        assert_eq!(order.total_amount, 800.0);
        assert_eq!(order.status, OrderStatus::Pending);

        let full = service
            .find_full(&order.id.unwrap().to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(full.lines.len(), 1);
        assert_eq!(full.lines[0].unit_price, 400.0);
    }
}
