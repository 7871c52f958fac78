use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use shared::message::{BusMessage, SyncPayload};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::{CatalogFeed, MessageBus, MessageBusService};

/// 资源版本管理器
///
/// 使用 DashMap 实现无锁并发的版本号管理。
/// 每种资源类型维护独立的版本号，支持原子递增。
///
/// broadcast_sync 时自动生成递增的版本号，
/// 订阅者可以通过版本号判断数据新旧。
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// 递增指定资源的版本号并返回新值
    ///
    /// 如果资源不存在，从 0 开始递增（返回 1）
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    /// 获取指定资源的当前版本号
    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | db | Surreal<Db> | 嵌入式数据库 |
/// | message_bus | MessageBusService | 消息总线服务 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | resource_versions | Arc<ResourceVersions> | 资源版本管理 |
/// | catalog_feed | CatalogFeed | 目录实时推送 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 嵌入式数据库 (SurrealDB)
    pub db: Surreal<Db>,
    /// 消息总线服务
    pub message_bus: MessageBusService,
    /// JWT 认证服务 (Arc 共享所有权)
    pub jwt_service: Arc<JwtService>,
    /// 资源版本管理器 (用于 broadcast_sync 自动递增版本号)
    pub resource_versions: Arc<ResourceVersions>,
    /// 目录实时推送
    pub catalog_feed: CatalogFeed,
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 按顺序初始化：
    /// 1. 工作目录结构
    /// 2. 数据库 (work_dir/database/store.db)
    /// 3. 各服务 (MessageBus, JWT, CatalogFeed)
    ///
    /// # Panics
    ///
    /// 数据库初始化失败时 panic
    pub async fn initialize(config: &Config) -> Self {
        config
            .ensure_work_dir_structure()
            .expect("Failed to create work directory structure");

        let db_path = config.database_dir().join("store.db");
        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");
        let db = db_service.db;

        let message_bus = MessageBusService::new();
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let resource_versions = Arc::new(ResourceVersions::new());
        let catalog_feed = CatalogFeed::new(db.clone());

        Self {
            config: config.clone(),
            db,
            message_bus,
            jwt_service,
            resource_versions,
            catalog_feed,
        }
    }

    /// 测试用：内存数据库
    pub async fn initialize_in_memory(config: &Config) -> Self {
        let db = DbService::new_in_memory()
            .await
            .expect("Failed to initialize in-memory database")
            .db;

        let message_bus = MessageBusService::new();
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let resource_versions = Arc::new(ResourceVersions::new());
        let catalog_feed = CatalogFeed::new(db.clone());

        Self {
            config: config.clone(),
            db,
            message_bus,
            jwt_service,
            resource_versions,
            catalog_feed,
        }
    }

    /// 启动后台任务
    ///
    /// 必须在 `Server::run()` 之前调用
    ///
    /// 启动的任务：
    /// - 目录推送循环 (CatalogFeed)
    pub async fn start_background_tasks(&self) {
        self.catalog_feed.clone().spawn(self.message_bus.bus().clone());
    }

    /// 获取数据库实例
    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    /// 获取工作目录
    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// 获取消息总线
    pub fn message_bus(&self) -> &Arc<MessageBus> {
        self.message_bus.bus()
    }

    /// 广播同步消息
    ///
    /// 向所有订阅者广播资源变更通知。
    /// 版本号由 ResourceVersions 自动递增管理。
    ///
    /// # 参数
    /// - `resource`: 资源类型 (如 "product", "customer_order")
    /// - `action`: 变更类型 ("created", "updated", "deleted")
    /// - `id`: 资源 ID
    /// - `data`: 资源数据 (deleted 时为 None)
    pub async fn broadcast_sync<T: serde::Serialize>(
        &self,
        resource: &str,
        action: &str,
        id: &str,
        data: Option<&T>,
    ) {
        let version = self.resource_versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data: data.and_then(|d| serde_json::to_value(d).ok()),
        };
        let _ = self.message_bus().publish(BusMessage::sync(&payload)).await;
    }

    /// 触发关闭
    pub fn shutdown(&self) {
        self.message_bus.bus().shutdown();
    }
}
