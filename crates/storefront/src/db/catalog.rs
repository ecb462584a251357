//! Catalog repository for database operations.
//!
//! Products and designs are read-only from the checkout's point of view; the
//! insert helpers exist for seeding.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tee_studio_core::{DesignId, Money, ProductId, UserId};

use super::{CatalogLookup, RepositoryError, map_unique_violation};
use crate::models::{Design, NewDesign, NewProduct, Product};

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    category: String,
    price: Money,
    is_active: bool,
    image_url: Option<String>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: r.id,
            name: r.name,
            category: r.category,
            price: r.price,
            active: r.is_active,
            image_url: r.image_url,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DesignRow {
    id: DesignId,
    user_id: UserId,
    title: Option<String>,
    prompt: String,
    image_url: String,
    style: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DesignRow> for Design {
    fn from(r: DesignRow) -> Self {
        Self {
            id: r.id,
            owner_id: r.user_id,
            title: r.title,
            prompt: r.prompt,
            image_url: r.image_url,
            style: r.style,
            created_at: r.created_at,
        }
    }
}

/// Repository for product and design lookups.
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a user, or return the existing one with the same username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert_user(&self, username: &str) -> Result<UserId, RepositoryError> {
        let id: UserId = sqlx::query_scalar(
            r"
            INSERT INTO users (username)
            VALUES ($1)
            ON CONFLICT (username) DO UPDATE SET updated_at = NOW()
            RETURNING id
            ",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_product(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let row: ProductRow = sqlx::query_as(
            r"
            INSERT INTO products (name, category, price, is_active, image_url)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, category, price, is_active, image_url
            ",
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(product.price)
        .bind(product.active)
        .bind(product.image_url.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "product"))?;

        Ok(row.into())
    }

    /// Create a design.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn insert_design(&self, design: &NewDesign) -> Result<Design, RepositoryError> {
        let row: DesignRow = sqlx::query_as(
            r"
            INSERT INTO designs (user_id, title, prompt, image_url, style)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, title, prompt, image_url, style, created_at
            ",
        )
        .bind(design.owner_id)
        .bind(design.title.as_deref())
        .bind(&design.prompt)
        .bind(&design.image_url)
        .bind(design.style.as_deref())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }
}

#[async_trait]
impl CatalogLookup for PgCatalog {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, category, price, is_active, image_url
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    async fn get_design(&self, id: DesignId) -> Result<Option<Design>, RepositoryError> {
        let row: Option<DesignRow> = sqlx::query_as(
            r"
            SELECT id, user_id, title, prompt, image_url, style, created_at
            FROM designs
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }
}
