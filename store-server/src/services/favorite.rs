//! Favorites
//!
//! 收藏是 (owner, product) 标记记录。toggle 是先读后写的两步：
//! 先查是否存在，再按结果删除或插入，两步之间没有任何并发防护，
//! 并发 toggle 可能产生重复标记；读取端用 id 集合吸收重复。

use std::collections::HashSet;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

use crate::db::models::Product;
use crate::db::repository::{FavoriteRepository, ProductRepository, RepoResult, parse_id};

#[derive(Clone)]
pub struct FavoriteService {
    repo: FavoriteRepository,
    product_repo: ProductRepository,
}

impl FavoriteService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: FavoriteRepository::new(db.clone()),
            product_repo: ProductRepository::new(db),
        }
    }

    /// The owner's favorite product ids. Duplicate marks collapse into the set.
    pub async fn favorite_ids(&self, owner: &RecordId) -> RepoResult<HashSet<String>> {
        let marks = self.repo.find_by_owner(owner).await?;
        Ok(marks.into_iter().map(|m| m.product.to_string()).collect())
    }

    /// The favorited products, joined to the catalog.
    ///
    /// Marks whose product has since been deleted are dropped from the view.
    pub async fn favorite_products(&self, owner: &RecordId) -> RepoResult<Vec<Product>> {
        let ids = self.favorite_ids(owner).await?;
        let products = self.product_repo.find_all().await?;
        Ok(products
            .into_iter()
            .filter(|p| {
                p.id.as_ref()
                    .map(|id| ids.contains(&id.to_string()))
                    .unwrap_or(false)
            })
            .collect())
    }

    /// Flip the mark for (owner, product) and return the fresh id set.
    ///
    /// Check-then-act: exists → delete, otherwise insert.
    pub async fn toggle(&self, owner: &RecordId, product_id: &str) -> RepoResult<HashSet<String>> {
        let product = parse_id("product", product_id)?;

        if self.repo.exists(owner, &product).await? {
            self.repo.delete_mark(owner, &product).await?;
        } else {
            self.repo.insert_mark(owner, &product).await?;
        }

        self.favorite_ids(owner).await
    }

    pub async fn is_favorite(&self, owner: &RecordId, product_id: &str) -> RepoResult<bool> {
        let product = parse_id("product", product_id)?;
        self.repo.exists(owner, &product).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn toggle_flips_the_mark() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let service = FavoriteService::new(db);
        let owner = RecordId::from_table_key("user", "u1");

        let ids = service.toggle(&owner, "product:tiramisu").await.unwrap();
        assert!(ids.contains("product:tiramisu"));
        assert!(service.is_favorite(&owner, "product:tiramisu").await.unwrap());

        let ids = service.toggle(&owner, "product:tiramisu").await.unwrap();
        assert!(ids.is_empty());
        assert!(!service.is_favorite(&owner, "product:tiramisu").await.unwrap());
    }

    #[tokio::test]
    async fn dangling_marks_are_dropped_from_the_joined_view() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let product_repo = ProductRepository::new(db.clone());
        let service = FavoriteService::new(db);
        let owner = RecordId::from_table_key("user", "u1");

        let kept = product_repo
            .create(crate::db::models::ProductCreate {
                name: "Opera".into(),
                description: None,
                price: 650.0,
                image_url: None,
                category: "Classic".into(),
                is_available: Some(true),
            })
            .await
            .unwrap();
        service
            .toggle(&owner, &kept.id.clone().unwrap().to_string())
            .await
            .unwrap();
        // Mark pointing at a product that no longer exists
        service.toggle(&owner, "product:retired").await.unwrap();

        assert_eq!(service.favorite_ids(&owner).await.unwrap().len(), 2);
        let joined = service.favorite_products(&owner).await.unwrap();
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].name, "Opera");
    }

    #[tokio::test]
    async fn favorites_are_per_owner() {
        let db = DbService::new_in_memory().await.unwrap().db;
        let service = FavoriteService::new(db);
        let a = RecordId::from_table_key("user", "a");
        let b = RecordId::from_table_key("user", "b");

        service.toggle(&a, "product:opera").await.unwrap();

        assert!(service.favorite_ids(&b).await.unwrap().is_empty());
        assert_eq!(service.favorite_ids(&a).await.unwrap().len(), 1);
    }
}
