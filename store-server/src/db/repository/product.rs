//! Product Repository

use super::{BaseRepository, RepoError, RepoResult, parse_id};
use crate::db::models::{CATEGORY_ALL, Product, ProductCreate, ProductUpdate};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

const PRODUCT_TABLE: &str = "product";

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find every product, available or not (cart join uses this)
    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find all available products
    pub async fn find_available(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_available = true")
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find available products in a category (exact, case-sensitive match)
    ///
    /// The sentinel "All" returns every available product.
    pub async fn find_by_category(&self, category: &str) -> RepoResult<Vec<Product>> {
        if category == CATEGORY_ALL {
            return self.find_available().await;
        }
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM product WHERE is_available = true AND category = $category")
            .bind(("category", category.to_string()))
            .await?
            .take(0)?;
        Ok(products)
    }

    /// Find product by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let record_id = parse_id(PRODUCT_TABLE, id)?;
        let product: Option<Product> = self.base.db().select(record_id).await?;
        Ok(product)
    }

    /// Create a new product
    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.price < 0.0 {
            return Err(RepoError::Validation("price must be non-negative".into()));
        }

        let mut result = self
            .base
            .db()
            .query(
                "CREATE product SET name = $name, description = $description, \
                 price = $price, image_url = $image_url, category = $category, \
                 is_available = $is_available RETURN AFTER",
            )
            .bind(("name", data.name))
            .bind(("description", data.description.unwrap_or_default()))
            .bind(("price", data.price))
            .bind(("image_url", data.image_url.unwrap_or_default()))
            .bind(("category", data.category))
            .bind(("is_available", data.is_available.unwrap_or(true)))
            .await?;

        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Update a product
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let record_id = parse_id(PRODUCT_TABLE, id)?;

        // Build dynamic SET clauses with proper type bindings
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.description.is_some() {
            set_parts.push("description = $description");
        }
        if data.price.is_some() {
            set_parts.push("price = $price");
        }
        if data.image_url.is_some() {
            set_parts.push("image_url = $image_url");
        }
        if data.category.is_some() {
            set_parts.push("category = $category");
        }
        if data.is_available.is_some() {
            set_parts.push("is_available = $is_available");
        }

        if set_parts.is_empty() {
            return self
                .find_by_id(id)
                .await?
                .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)));
        }

        let query_str = format!("UPDATE $thing SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self.base.db().query(query_str).bind(("thing", record_id));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = data.description {
            query = query.bind(("description", v));
        }
        if let Some(v) = data.price {
            query = query.bind(("price", v));
        }
        if let Some(v) = data.image_url {
            query = query.bind(("image_url", v));
        }
        if let Some(v) = data.category {
            query = query.bind(("category", v));
        }
        if let Some(v) = data.is_available {
            query = query.bind(("is_available", v));
        }

        let mut result = query.await?;
        let products: Vec<Product> = result.take(0)?;
        products
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Product {} not found", id)))
    }

    /// Hard delete a product
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let record_id = parse_id(PRODUCT_TABLE, id)?;
        let result: Option<Product> = self.base.db().delete(record_id).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Product {} not found", id)));
        }
        Ok(())
    }
}
