//! Repository Module
//!
//! Provides CRUD operations for the SurrealDB tables.

// Accounts
pub mod user;

// Catalog
pub mod product;

// Cart & Favorites
pub mod cart;
pub mod favorite;

// Orders
pub mod order;

// Re-exports
pub use cart::CartRepository;
pub use favorite::FavoriteRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "product:abc".parse()?;
//   - 获取表名: id.table()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// 解析客户端传来的 ID。接受 "table:key" 或裸 key 两种格式。
pub fn parse_id(table: &str, id: &str) -> RepoResult<RecordId> {
    if let Some((tb, key)) = id.split_once(':') {
        if tb != table {
            return Err(RepoError::Validation(format!(
                "Expected {} id, got {}",
                table, id
            )));
        }
        return Ok(RecordId::from_table_key(tb, key));
    }
    Ok(RecordId::from_table_key(table, id))
}

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_accepts_prefixed_and_bare() {
        let a = parse_id("product", "product:tiramisu").unwrap();
        let b = parse_id("product", "tiramisu").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.table(), "product");
    }

    #[test]
    fn parse_id_rejects_wrong_table() {
        assert!(parse_id("product", "order:x").is_err());
    }
}
