//! 消息总线消息类型定义
//!
//! 这些类型在 store-server 和 storefront 客户端之间共享，
//! 用于实时数据同步（catalog、cart、order 变更通知）。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// 协议版本号
pub const PROTOCOL_VERSION: u16 = 1;

/// 消息总线事件类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventType {
    /// 系统通知
    Notification = 1,
    /// 同步信号 (资源变更)
    Sync = 4,
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventType::Notification => write!(f, "notification"),
            EventType::Sync => write!(f, "sync"),
        }
    }
}

/// 同步载荷 - 资源变更通知
///
/// 每次数据库写入后服务器都会广播一条 Sync 消息；
/// 客户端按 resource + version 判断是否需要全量刷新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// 资源类型 (例如: "product", "cart_line", "favorite", "order")
    pub resource: String,
    /// 版本号 (单调递增)
    pub version: u64,
    /// 变更类型 ("created", "updated", "deleted")
    pub action: String,
    /// 资源 ID
    pub id: String,
    /// 资源数据 (deleted 时为 None)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// 消息总线传输消息
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusMessage {
    pub request_id: Uuid,
    pub event_type: EventType,
    /// 发出时刻 (Unix 毫秒)
    pub timestamp: i64,
    pub source: Option<String>,
    pub payload: Vec<u8>,
}

impl BusMessage {
    pub fn new(event_type: EventType, payload: Vec<u8>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            event_type,
            timestamp: chrono::Utc::now().timestamp_millis(),
            source: None,
            payload,
        }
    }

    /// 设置消息来源
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }

    /// 创建同步消息
    pub fn sync(payload: &SyncPayload) -> Self {
        Self::new(
            EventType::Sync,
            serde_json::to_vec(payload).expect("Failed to serialize sync payload"),
        )
    }

    /// 创建通知消息
    pub fn notification(text: &str) -> Self {
        Self::new(EventType::Notification, text.as_bytes().to_vec())
    }

    /// 解析载荷为指定类型
    pub fn parse_payload<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sync_message_round_trip() {
        let payload = SyncPayload {
            resource: "product".to_string(),
            version: 3,
            action: "updated".to_string(),
            id: "product:cheesecake".to_string(),
            data: Some(serde_json::json!({"name": "Cheesecake"})),
        };
        let msg = BusMessage::sync(&payload);
        assert_eq!(msg.event_type, EventType::Sync);
        assert!(msg.timestamp > 0);

        let parsed: SyncPayload = msg.parse_payload().unwrap();
        assert_eq!(parsed, payload);
    }

    #[test]
    fn deleted_sync_omits_data() {
        let payload = SyncPayload {
            resource: "cart_line".to_string(),
            version: 1,
            action: "deleted".to_string(),
            id: "cart_line:x".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("data").is_none());
    }
}
