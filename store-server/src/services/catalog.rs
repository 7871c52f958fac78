//! Catalog Feed
//!
//! 目录实时推送：后台任务订阅消息总线，收到任何 product 同步事件后，
//! 为每个已注册的分类重新加载完整的过滤列表并整体重发（全量，不是增量）。
//!
//! 订阅者拿到的是 `watch::Receiver<Vec<Product>>`，总是只保留最新一份快照。

use dashmap::DashMap;
use std::sync::Arc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio::sync::watch;
use tracing::{debug, error, info};

use crate::db::models::Product;
use crate::db::repository::{ProductRepository, RepoResult};
use crate::services::MessageBus;
use shared::message::{EventType, SyncPayload};

/// Live, per-category views of the catalog
#[derive(Clone)]
pub struct CatalogFeed {
    product_repo: ProductRepository,
    /// category → full-list publisher ("All" included)
    channels: Arc<DashMap<String, watch::Sender<Vec<Product>>>>,
}

impl CatalogFeed {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            product_repo: ProductRepository::new(db),
            channels: Arc::new(DashMap::new()),
        }
    }

    /// Subscribe to the live list for a category.
    ///
    /// The receiver's initial value is the current filtered list; every
    /// later catalog write re-emits the whole list through the same channel.
    /// A failed initial load registers nothing and propagates the error:
    /// an empty snapshot means "no products", never "load failed".
    pub async fn subscribe(&self, category: &str) -> RepoResult<watch::Receiver<Vec<Product>>> {
        if let Some(entry) = self.channels.get(category) {
            return Ok(entry.subscribe());
        }

        let initial = self.product_repo.find_by_category(category).await?;

        let entry = self
            .channels
            .entry(category.to_string())
            .or_insert_with(|| watch::channel(initial).0);
        Ok(entry.subscribe())
    }

    /// Reload and re-publish every registered category
    ///
    /// Keys are snapshotted first; holding a DashMap shard guard across an
    /// await would block concurrent subscribers.
    async fn refresh_all(&self) {
        let categories: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        for category in categories {
            match self.product_repo.find_by_category(&category).await {
                Ok(products) => {
                    debug!(
                        "Catalog refresh: '{}' now {} products",
                        category,
                        products.len()
                    );
                    if let Some(entry) = self.channels.get(&category) {
                        // send_replace: the new snapshot must land even while
                        // the category has no live subscriber
                        entry.send_replace(products);
                    }
                }
                Err(e) => {
                    // 出错只记录，保留上一份快照，不再发送
                    error!("Catalog refresh failed for '{}': {}", category, e);
                }
            }
        }
    }

    /// Background loop: follow product sync events until shutdown
    pub fn spawn(self, bus: Arc<MessageBus>) {
        let mut rx = bus.subscribe();
        let token = bus.shutdown_token().clone();
        tokio::spawn(async move {
            info!("Catalog feed started");
            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        info!("Catalog feed stopped");
                        break;
                    }
                    msg = rx.recv() => {
                        match msg {
                            Ok(message) if message.event_type == EventType::Sync => {
                                let is_product = message
                                    .parse_payload::<SyncPayload>()
                                    .map(|p| p.resource == "product")
                                    .unwrap_or(false);
                                if is_product {
                                    self.refresh_all().await;
                                }
                            }
                            Ok(_) => {}
                            Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                                // 落后时丢弃积压，直接做一次全量刷新
                                debug!("Catalog feed lagged {} messages, refreshing", n);
                                self.refresh_all().await;
                            }
                            Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::models::ProductCreate;
    use shared::message::{BusMessage, SyncPayload};
    use std::time::Duration;

    fn cake(name: &str, category: &str, available: bool) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            description: None,
            price: 450.0,
            image_url: None,
            category: category.into(),
            is_available: Some(available),
        }
    }

    #[tokio::test]
    async fn subscribe_delivers_current_filtered_list() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let repo = ProductRepository::new(db.clone());
        repo.create(cake("Tiramisu", "Classic", true)).await.unwrap();
        repo.create(cake("Red Velvet", "Premium", true)).await.unwrap();
        repo.create(cake("Old Stock", "Classic", false)).await.unwrap();

        let feed = CatalogFeed::new(db);
        let rx = feed.subscribe("Classic").await.unwrap();
        let list = rx.borrow().clone();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Tiramisu");

        // Sentinel category carries every available product
        let rx_all = feed.subscribe("All").await.unwrap();
        assert_eq!(rx_all.borrow().len(), 2);
    }

    #[tokio::test]
    async fn category_match_is_case_sensitive() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let repo = ProductRepository::new(db.clone());
        repo.create(cake("Sacher", "Chocolate", true)).await.unwrap();

        let feed = CatalogFeed::new(db);
        assert_eq!(feed.subscribe("Chocolate").await.unwrap().borrow().len(), 1);
        assert!(feed.subscribe("chocolate").await.unwrap().borrow().is_empty());
    }

    #[tokio::test]
    async fn product_sync_event_re_emits_full_list() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let repo = ProductRepository::new(db.clone());
        repo.create(cake("Tiramisu", "Classic", true)).await.unwrap();

        let feed = CatalogFeed::new(db);
        let bus = Arc::new(MessageBus::new());
        let mut rx = feed.subscribe("Classic").await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        feed.clone().spawn(bus.clone());

        repo.create(cake("Opera", "Classic", true)).await.unwrap();
        let payload = SyncPayload {
            resource: "product".into(),
            version: 2,
            action: "created".into(),
            id: "product:opera".into(),
            data: None,
        };
        bus.publish(BusMessage::sync(&payload)).await.unwrap();

        tokio::time::timeout(Duration::from_secs(2), rx.changed())
            .await
            .expect("feed should re-emit after a product sync event")
            .unwrap();
        assert_eq!(rx.borrow().len(), 2);

        bus.shutdown();
    }

    #[tokio::test]
    async fn non_product_events_are_ignored() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let feed = CatalogFeed::new(db);
        let bus = Arc::new(MessageBus::new());
        let mut rx = feed.subscribe("Classic").await.unwrap();
        rx.borrow_and_update();

        feed.clone().spawn(bus.clone());

        let payload = SyncPayload {
            resource: "customer_order".into(),
            version: 1,
            action: "created".into(),
            id: "customer_order:x".into(),
            data: None,
        };
        bus.publish(BusMessage::sync(&payload)).await.unwrap();

        let changed = tokio::time::timeout(Duration::from_millis(200), rx.changed()).await;
        assert!(changed.is_err(), "order events must not touch the catalog feed");

        bus.shutdown();
    }
}
