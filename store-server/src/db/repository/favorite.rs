//! Favorite Mark Repository

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::Favorite;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct FavoriteRepository {
    base: BaseRepository,
}

impl FavoriteRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All marks for an owner
    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Vec<Favorite>> {
        let marks: Vec<Favorite> = self
            .base
            .db()
            .query("SELECT * FROM favorite WHERE owner = $owner")
            .bind(("owner", owner.clone()))
            .await?
            .take(0)?;
        Ok(marks)
    }

    /// Whether at least one mark exists for the pair
    pub async fn exists(&self, owner: &RecordId, product: &RecordId) -> RepoResult<bool> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM favorite WHERE owner = $owner AND product = $product LIMIT 1")
            .bind(("owner", owner.clone()))
            .bind(("product", product.clone()))
            .await?;
        let marks: Vec<Favorite> = result.take(0)?;
        Ok(!marks.is_empty())
    }

    /// Insert a mark for the pair
    pub async fn insert_mark(&self, owner: &RecordId, product: &RecordId) -> RepoResult<Favorite> {
        let mut result = self
            .base
            .db()
            .query("CREATE favorite SET owner = $owner, product = $product RETURN AFTER")
            .bind(("owner", owner.clone()))
            .bind(("product", product.clone()))
            .await?;
        let marks: Vec<Favorite> = result.take(0)?;
        marks
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create favorite".to_string()))
    }

    /// Delete all marks for the pair (normally at most one)
    pub async fn delete_mark(&self, owner: &RecordId, product: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE favorite WHERE owner = $owner AND product = $product")
            .bind(("owner", owner.clone()))
            .bind(("product", product.clone()))
            .await?;
        Ok(())
    }
}
