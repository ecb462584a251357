//! Storage for the storefront.
//!
//! # Database: `tee_studio`
//!
//! ## Tables
//!
//! - `users` - Identities referenced by carts, designs and orders
//! - `designs` - AI-generated images owned by a user
//! - `products` - Sellable blanks with their current price
//! - `cart_items` - Live cart lines (unique per owner/product/design/variant)
//! - `orders` - Order headers (unique `serial`)
//! - `order_items` - Frozen line-item snapshots
//!
//! # Backends
//!
//! Every repository is a trait so handlers never depend on a concrete backend:
//! [`Storage::postgres`] wires the `sqlx` repositories, [`Storage::memory`] wires
//! the in-process [`MemoryStore`] used for local development and tests.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p tee-studio-cli -- migrate
//! ```

pub mod carts;
pub mod catalog;
pub mod memory;
pub mod orders;
pub mod seed;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use tee_studio_core::{
    CartLineId, DesignId, OrderId, OrderSerial, OrderStatus, ProductId, UserId,
};

use crate::models::{CartLine, Design, NewCartLine, NewOrder, Order, Product};

pub use carts::PgCartRepository;
pub use catalog::PgCatalog;
pub use memory::MemoryStore;
pub use orders::{PgCheckoutStore, PgOrderRepository};

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate serial).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Map a unique-violation into `RepositoryError::Conflict`.
pub(crate) fn map_unique_violation(e: sqlx::Error, what: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(format!("{what} already exists"));
    }
    RepositoryError::Database(e)
}

/// Key-based product and design lookups.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Get a product by ID, active or not.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Get a design by ID.
    async fn get_design(&self, id: DesignId) -> Result<Option<Design>, RepositoryError>;
}

/// Live cart lines.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Get a line by ID regardless of owner.
    async fn find_line(&self, id: CartLineId) -> Result<Option<CartLine>, RepositoryError>;

    /// All lines of an owner, oldest first.
    async fn lines_for_owner(&self, owner: UserId) -> Result<Vec<CartLine>, RepositoryError>;

    /// Insert a line, or add its quantity to the existing line with the same key.
    ///
    /// Returns `None`, leaving the cart unchanged, if the merged quantity would
    /// exceed `max_quantity`.
    async fn add_or_merge(
        &self,
        line: &NewCartLine,
        max_quantity: u32,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// Overwrite the quantity of a line owned by `owner`.
    ///
    /// Returns `None` (and changes nothing) if no such line exists for `owner`.
    async fn set_quantity(
        &self,
        owner: UserId,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLine>, RepositoryError>;

    /// Delete a line owned by `owner`. Returns whether a row was removed.
    async fn remove_line(&self, owner: UserId, id: CartLineId) -> Result<bool, RepositoryError>;

    /// Delete every line of `owner`. Returns the number of rows removed.
    async fn clear(&self, owner: UserId) -> Result<u64, RepositoryError>;
}

/// Placed orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Get an order with its items.
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Get an order with its items by serial.
    async fn find_by_serial(&self, serial: &OrderSerial)
    -> Result<Option<Order>, RepositoryError>;

    /// All orders of an owner with their items, newest first.
    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError>;

    /// Overwrite the status. Returns `false` if the order does not exist.
    async fn update_status(&self, id: OrderId, status: OrderStatus)
    -> Result<bool, RepositoryError>;
}

/// Opens checkout transactions.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Begin a checkout transaction.
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, RepositoryError>;
}

/// A single checkout's unit of work.
///
/// Nothing is visible to other readers until [`CheckoutTx::commit`] succeeds;
/// dropping the transaction without committing discards every change.
#[async_trait]
pub trait CheckoutTx: Send {
    /// Read and lock the given cart lines (any owner).
    ///
    /// IDs that do not exist are absent from the result. Locked lines cannot be
    /// claimed by a concurrent checkout until this transaction ends.
    async fn lock_lines(&mut self, ids: &[CartLineId]) -> Result<Vec<CartLine>, RepositoryError>;

    /// Write the order header and every item.
    async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError>;

    /// Delete the consumed lines of `owner`. Returns the number of rows removed.
    async fn delete_lines(
        &mut self,
        owner: UserId,
        ids: &[CartLineId],
    ) -> Result<u64, RepositoryError>;

    /// Make every change visible atomically.
    async fn commit(self: Box<Self>) -> Result<(), RepositoryError>;
}

/// The set of repositories the services are built from.
///
/// Cheap to clone; every field is reference counted.
#[derive(Clone)]
pub struct Storage {
    pub catalog: Arc<dyn CatalogLookup>,
    pub carts: Arc<dyn CartRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub checkout: Arc<dyn CheckoutStore>,
    pool: Option<PgPool>,
}

impl Storage {
    /// Wire the `PostgreSQL` repositories.
    #[must_use]
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            catalog: Arc::new(PgCatalog::new(pool.clone())),
            carts: Arc::new(PgCartRepository::new(pool.clone())),
            orders: Arc::new(PgOrderRepository::new(pool.clone())),
            checkout: Arc::new(PgCheckoutStore::new(pool.clone())),
            pool: Some(pool),
        }
    }

    /// Wire the in-memory repositories.
    #[must_use]
    pub fn memory(store: MemoryStore) -> Self {
        Self {
            catalog: Arc::new(store.clone()),
            carts: Arc::new(store.clone()),
            orders: Arc::new(store.clone()),
            checkout: Arc::new(store),
            pool: None,
        }
    }

    /// The database pool, when backed by `PostgreSQL`.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        self.pool.as_ref()
    }

    /// Verify the backend is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the database does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Some(pool) = &self.pool {
            sqlx::query("SELECT 1").execute(pool).await?;
        }
        Ok(())
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(2.min(max_connections))
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
