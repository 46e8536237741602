//! Product catalog repository.

use sqlx::PgPool;

use aoeyaeng_core::{Price, ProductId};

use super::RepositoryError;
use crate::models::{CategoryFilter, NewProduct, Product};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: ProductId,
    name: String,
    description: String,
    price: Price,
    image_url: Option<String>,
    category: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.product_id,
            name: row.name,
            description: row.description,
            price: row.price,
            image_url: row.image_url.filter(|url| !url.is_empty()),
            category: row.category,
        }
    }
}

/// Repository for `storefront.product`.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products, optionally restricted to one category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = match filter {
            CategoryFilter::All => {
                sqlx::query_as(
                    r"
                    SELECT product_id, name, description, price, image_url, category
                    FROM storefront.product
                    ORDER BY product_id
                    ",
                )
                .fetch_all(self.pool)
                .await?
            }
            CategoryFilter::Named(category) => {
                sqlx::query_as(
                    r"
                    SELECT product_id, name, description, price, image_url, category
                    FROM storefront.product
                    WHERE category = $1
                    ORDER BY product_id
                    ",
                )
                .bind(category)
                .fetch_all(self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Distinct categories, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT category FROM storefront.product ORDER BY category",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(|(category,)| category).collect())
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails (e.g. a negative price).
    pub async fn create(&self, product: &NewProduct) -> Result<ProductId, RepositoryError> {
        let (id,): (ProductId,) = sqlx::query_as(
            r"
            INSERT INTO storefront.product (name, description, price, image_url, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING product_id
            ",
        )
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.image_url.as_deref())
        .bind(&product.category)
        .fetch_one(self.pool)
        .await?;

        Ok(id)
    }

    /// Delete every product. Cart rows referencing them cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.product")
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
