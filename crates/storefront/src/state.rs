//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::db::Storage;
use crate::services::{CartService, OrderBuilder, OrderService, SerialGenerator};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the storage backend and the services built on it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    storage: Storage,
    carts: CartService,
    checkout: OrderBuilder,
    orders: OrderService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `storage` - Repositories the services are built from
    #[must_use]
    pub fn new(config: StorefrontConfig, storage: Storage) -> Self {
        let carts = CartService::new(storage.carts.clone(), storage.catalog.clone());
        let checkout = OrderBuilder::new(
            storage.checkout.clone(),
            storage.catalog.clone(),
            Arc::new(SerialGenerator::new()),
        );
        let orders = OrderService::new(storage.orders.clone());

        Self {
            inner: Arc::new(AppStateInner {
                config,
                storage,
                carts,
                checkout,
                orders,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.inner.storage
    }

    /// Get a reference to the cart service.
    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &OrderBuilder {
        &self.inner.checkout
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }
}
