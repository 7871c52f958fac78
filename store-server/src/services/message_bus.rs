//! 消息总线 - 进程内发布/订阅
//!
//! # 消息流
//!
//! ```text
//! Handler ──▶ publish() ──▶ broadcast::Sender ──▶ 所有订阅者
//!                                              (catalog feed, 客户端连接)
//! ```
//!
//! 每次数据库写入后 handler 调用 `ServerState::broadcast_sync`，
//! 订阅者据此刷新自己的视图。

use shared::message::BusMessage;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::utils::AppError;

/// Broadcast channel capacity
const DEFAULT_CAPACITY: usize = 1024;

/// 消息总线 - 负责消息广播
#[derive(Debug, Clone)]
pub struct MessageBus {
    /// 服务器到订阅者的广播通道
    server_tx: broadcast::Sender<BusMessage>,
    /// 关闭信号令牌
    shutdown_token: CancellationToken,
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (server_tx, _) = broadcast::channel(capacity);
        Self {
            server_tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 广播一条消息给所有订阅者
    ///
    /// 没有订阅者时发送失败是正常情况，不视为错误。
    pub async fn publish(&self, message: BusMessage) -> Result<(), AppError> {
        let _ = self.server_tx.send(message);
        Ok(())
    }

    /// 订阅服务器广播
    pub fn subscribe(&self) -> broadcast::Receiver<BusMessage> {
        self.server_tx.subscribe()
    }

    /// 当前订阅者数量
    pub fn subscriber_count(&self) -> usize {
        self.server_tx.receiver_count()
    }

    /// 关闭令牌 (后台任务用)
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

/// 消息总线服务 - 封装 MessageBus，提供生命周期管理
#[derive(Clone, Debug)]
pub struct MessageBusService {
    bus: Arc<MessageBus>,
}

impl MessageBusService {
    pub fn new() -> Self {
        Self {
            bus: Arc::new(MessageBus::new()),
        }
    }

    /// 获取消息总线引用
    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }
}

impl Default for MessageBusService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::{EventType, SyncPayload};

    #[tokio::test]
    async fn publish_reaches_all_subscribers() {
        let bus = MessageBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let payload = SyncPayload {
            resource: "product".into(),
            version: 1,
            action: "created".into(),
            id: "product:a".into(),
            data: None,
        };
        bus.publish(BusMessage::sync(&payload)).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().event_type, EventType::Sync);
        assert_eq!(rx2.recv().await.unwrap().event_type, EventType::Sync);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = MessageBus::new();
        bus.publish(BusMessage::notification("hello")).await.unwrap();
    }
}
