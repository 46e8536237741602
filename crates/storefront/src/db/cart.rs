//! Cart repository.
//!
//! A member's cart is the set of their `storefront.cart_item` rows; there is
//! no separate cart entity.

use sqlx::PgPool;

use aoeyaeng_core::{CartItemId, MemberId, Price, ProductId};

use super::{RepositoryError, classify};
use crate::models::CartLine;

#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    cart_item_id: CartItemId,
    product_id: ProductId,
    name: String,
    price: Price,
    image_url: Option<String>,
    quantity: i32,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "cart item {} has quantity {}",
                row.cart_item_id, row.quantity
            ))
        })?;

        Ok(Self {
            cart_item_id: row.cart_item_id,
            product_id: row.product_id,
            name: row.name,
            price: row.price,
            image_url: row.image_url.filter(|url| !url.is_empty()),
            quantity,
        })
    }
}

/// Repository for `storefront.cart_item`.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Add `quantity` of a product, accumulating onto an existing line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product (or member) doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_item(
        &self,
        member_id: MemberId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<(), RepositoryError> {
        let quantity = i32::try_from(quantity)
            .map_err(|_| RepositoryError::Conflict("quantity out of range".to_owned()))?;

        sqlx::query(
            r"
            INSERT INTO storefront.cart_item (member_id, product_id, quantity)
            VALUES ($1, $2, $3)
            ON CONFLICT (member_id, product_id)
            DO UPDATE SET quantity = storefront.cart_item.quantity + EXCLUDED.quantity
            ",
        )
        .bind(member_id)
        .bind(product_id)
        .bind(quantity)
        .execute(self.pool)
        .await
        .map_err(|e| classify(e, "cart line conflict"))?;

        Ok(())
    }

    /// The member's cart lines joined with current product data.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn lines_for_member(
        &self,
        member_id: MemberId,
    ) -> Result<Vec<CartLine>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(
            r"
            SELECT c.cart_item_id, c.quantity,
                   p.product_id, p.name, p.price, p.image_url
            FROM storefront.cart_item c
            JOIN storefront.product p ON c.product_id = p.product_id
            WHERE c.member_id = $1
            ORDER BY c.cart_item_id
            ",
        )
        .bind(member_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(CartLine::try_from).collect()
    }

    /// Remove one line, only if it belongs to `member_id`.
    ///
    /// Returns `true` if a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn remove_item(
        &self,
        cart_item_id: CartItemId,
        member_id: MemberId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "DELETE FROM storefront.cart_item WHERE cart_item_id = $1 AND member_id = $2",
        )
        .bind(cart_item_id)
        .bind(member_id)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empty the member's cart, returning how many lines were removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn clear(&self, member_id: MemberId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.cart_item WHERE member_id = $1")
            .bind(member_id)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
