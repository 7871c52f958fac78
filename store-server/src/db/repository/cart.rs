//! Cart Line Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::CartLine;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

const CART_TABLE: &str = "cart_line";

#[derive(Clone)]
pub struct CartRepository {
    base: BaseRepository,
}

impl CartRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All cart lines for an owner
    pub async fn find_by_owner(&self, owner: &RecordId) -> RepoResult<Vec<CartLine>> {
        let lines: Vec<CartLine> = self
            .base
            .db()
            .query("SELECT * FROM cart_line WHERE owner = $owner")
            .bind(("owner", owner.clone()))
            .await?
            .take(0)?;
        Ok(lines)
    }

    /// The line for an (owner, product) pair, if any
    pub async fn find_line(
        &self,
        owner: &RecordId,
        product: &RecordId,
    ) -> RepoResult<Option<CartLine>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM cart_line WHERE owner = $owner AND product = $product LIMIT 1")
            .bind(("owner", owner.clone()))
            .bind(("product", product.clone()))
            .await?;
        let lines: Vec<CartLine> = result.take(0)?;
        Ok(lines.into_iter().next())
    }

    /// A single line by id
    pub async fn find_by_id(&self, line_id: &str) -> RepoResult<Option<CartLine>> {
        let record_id = parse_id(CART_TABLE, line_id)?;
        let line: Option<CartLine> = self.base.db().select(record_id).await?;
        Ok(line)
    }

    /// Insert a fresh line
    pub async fn insert_line(
        &self,
        owner: &RecordId,
        product: &RecordId,
        quantity: i64,
    ) -> RepoResult<CartLine> {
        let mut result = self
            .base
            .db()
            .query(
                "CREATE cart_line SET owner = $owner, product = $product, \
                 quantity = $quantity RETURN AFTER",
            )
            .bind(("owner", owner.clone()))
            .bind(("product", product.clone()))
            .bind(("quantity", quantity))
            .await?;
        let lines: Vec<CartLine> = result.take(0)?;
        lines
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create cart line".to_string()))
    }

    /// Overwrite a line's quantity. No lower-bound enforcement at this layer.
    pub async fn set_quantity(&self, line_id: &str, quantity: i64) -> RepoResult<CartLine> {
        let record_id = parse_id(CART_TABLE, line_id)?;
        let mut result = self
            .base
            .db()
            .query("UPDATE $line SET quantity = $quantity RETURN AFTER")
            .bind(("line", record_id))
            .bind(("quantity", quantity))
            .await?;
        let lines: Vec<CartLine> = result.take(0)?;
        lines
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Cart line {} not found", line_id)))
    }

    /// Delete a single line, returning the deleted record
    pub async fn delete_line(&self, line_id: &str) -> RepoResult<CartLine> {
        let record_id = parse_id(CART_TABLE, line_id)?;
        let result: Option<CartLine> = self.base.db().delete(record_id).await?;
        result.ok_or_else(|| RepoError::NotFound(format!("Cart line {} not found", line_id)))
    }

    /// Delete every line for an owner
    pub async fn delete_by_owner(&self, owner: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("DELETE cart_line WHERE owner = $owner")
            .bind(("owner", owner.clone()))
            .await?;
        Ok(())
    }
}
