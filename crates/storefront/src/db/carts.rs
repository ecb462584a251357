//! Cart repository for database operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tee_studio_core::{CartLineId, DesignId, ProductId, UserId, Variant};

use super::{CartRepository, RepositoryError};
use crate::models::{CartLine, NewCartLine};

pub(super) const CART_LINE_COLUMNS: &str =
    "id, user_id, product_id, design_id, size, color, quantity, created_at, updated_at";

#[derive(sqlx::FromRow)]
pub(super) struct CartLineRow {
    id: CartLineId,
    user_id: UserId,
    product_id: ProductId,
    design_id: DesignId,
    size: String,
    color: String,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(r: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(r.quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                RepositoryError::DataCorruption(format!(
                    "cart line {} has invalid quantity {}",
                    r.id, r.quantity
                ))
            })?;

        Ok(Self {
            id: r.id,
            owner_id: r.user_id,
            product_id: r.product_id,
            design_id: r.design_id,
            variant: Variant::from_parts_unchecked(r.size, r.color),
            quantity,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Convert a quantity to the `INTEGER` column type.
pub(super) fn db_quantity(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::Conflict(format!("quantity {quantity} out of range")))
}

/// Repository for cart line database operations.
#[derive(Clone)]
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_line(&self, id: CartLineId) -> Result<Option<CartLine>, RepositoryError> {
        let row: Option<CartLineRow> = sqlx::query_as(&format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_items WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn lines_for_owner(&self, owner: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows: Vec<CartLineRow> = sqlx::query_as(&format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_items WHERE user_id = $1 ORDER BY created_at, id"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn add_or_merge(
        &self,
        line: &NewCartLine,
        max_quantity: u32,
    ) -> Result<Option<CartLine>, RepositoryError> {
        // The merge-key unique index turns a duplicate insert into a quantity bump.
        // A bump past the cap matches no row, so nothing is returned.
        let row: Option<CartLineRow> = sqlx::query_as(&format!(
            r"
            INSERT INTO cart_items (user_id, product_id, design_id, size, color, quantity)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, product_id, design_id, size, color)
            DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity,
                          updated_at = NOW()
            WHERE cart_items.quantity + EXCLUDED.quantity <= $7
            RETURNING {CART_LINE_COLUMNS}
            "
        ))
        .bind(line.owner_id)
        .bind(line.product_id)
        .bind(line.design_id)
        .bind(line.variant.size())
        .bind(line.variant.color())
        .bind(db_quantity(line.quantity)?)
        .bind(db_quantity(max_quantity)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn set_quantity(
        &self,
        owner: UserId,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let row: Option<CartLineRow> = sqlx::query_as(&format!(
            r"
            UPDATE cart_items
            SET quantity = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {CART_LINE_COLUMNS}
            "
        ))
        .bind(id)
        .bind(owner)
        .bind(db_quantity(quantity)?)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn remove_line(&self, owner: UserId, id: CartLineId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self, owner: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
