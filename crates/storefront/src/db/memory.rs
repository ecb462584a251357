//! In-process storage backend.
//!
//! Used for local development (`STOREFRONT_STORAGE=memory`) and tests. Catalog
//! and commerce state sit behind separate locks so catalog reads never wait on
//! an open checkout.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use tee_studio_core::{
    CartLineId, DesignId, Money, OrderId, OrderItemId, OrderSerial, OrderStatus, ProductId,
    UserId,
};

use super::{
    CartRepository, CatalogLookup, CheckoutStore, CheckoutTx, OrderRepository, RepositoryError,
};
use crate::models::{
    CartLine, Design, NewCartLine, NewDesign, NewOrder, NewProduct, Order, OrderItem, Product,
};

#[derive(Default)]
struct CatalogState {
    products: BTreeMap<ProductId, Product>,
    designs: BTreeMap<DesignId, Design>,
    last_product: i32,
    last_design: i32,
}

#[derive(Default, Clone)]
struct CommerceState {
    lines: BTreeMap<CartLineId, CartLine>,
    orders: BTreeMap<OrderId, Order>,
    last_line: i32,
    last_order: i32,
    last_item: i32,
}

/// Storage held entirely in memory.
///
/// Cloning is cheap and every clone shares the same state.
#[derive(Clone, Default)]
pub struct MemoryStore {
    catalog: Arc<RwLock<CatalogState>>,
    commerce: Arc<Mutex<CommerceState>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product to the catalog.
    pub async fn add_product(&self, product: NewProduct) -> Product {
        let mut catalog = self.catalog.write().await;
        catalog.last_product += 1;
        let product = Product {
            id: ProductId::new(catalog.last_product),
            name: product.name,
            category: product.category,
            price: product.price,
            active: product.active,
            image_url: product.image_url,
        };
        catalog.products.insert(product.id, product.clone());
        product
    }

    /// Add a design to the catalog.
    pub async fn add_design(&self, design: NewDesign) -> Design {
        let mut catalog = self.catalog.write().await;
        catalog.last_design += 1;
        let design = Design {
            id: DesignId::new(catalog.last_design),
            owner_id: design.owner_id,
            title: design.title,
            prompt: design.prompt,
            image_url: design.image_url,
            style: design.style,
            created_at: Utc::now(),
        };
        catalog.designs.insert(design.id, design.clone());
        design
    }

    /// Change a product's catalog price. Returns `false` if it does not exist.
    pub async fn set_product_price(&self, id: ProductId, price: Money) -> bool {
        let mut catalog = self.catalog.write().await;
        let Some(product) = catalog.products.get_mut(&id) else {
            return false;
        };
        product.price = price;
        true
    }

    /// Activate or deactivate a product. Returns `false` if it does not exist.
    pub async fn set_product_active(&self, id: ProductId, active: bool) -> bool {
        let mut catalog = self.catalog.write().await;
        let Some(product) = catalog.products.get_mut(&id) else {
            return false;
        };
        product.active = active;
        true
    }

    /// Remove a product from the catalog, leaving cart lines that reference it.
    pub async fn remove_product(&self, id: ProductId) -> bool {
        self.catalog.write().await.products.remove(&id).is_some()
    }

    /// Remove a design from the catalog, leaving cart lines that reference it.
    pub async fn remove_design(&self, id: DesignId) -> bool {
        self.catalog.write().await.designs.remove(&id).is_some()
    }
}

#[async_trait]
impl CatalogLookup for MemoryStore {
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.catalog.read().await.products.get(&id).cloned())
    }

    async fn get_design(&self, id: DesignId) -> Result<Option<Design>, RepositoryError> {
        Ok(self.catalog.read().await.designs.get(&id).cloned())
    }
}

#[async_trait]
impl CartRepository for MemoryStore {
    async fn find_line(&self, id: CartLineId) -> Result<Option<CartLine>, RepositoryError> {
        Ok(self.commerce.lock().await.lines.get(&id).cloned())
    }

    async fn lines_for_owner(&self, owner: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(self
            .commerce
            .lock()
            .await
            .lines
            .values()
            .filter(|line| line.owner_id == owner)
            .cloned()
            .collect())
    }

    async fn add_or_merge(
        &self,
        line: &NewCartLine,
        max_quantity: u32,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let mut state = self.commerce.lock().await;
        let now = Utc::now();

        if let Some(existing) = state.lines.values_mut().find(|l| l.same_key(line)) {
            let Some(quantity) = existing
                .quantity
                .checked_add(line.quantity)
                .filter(|q| *q <= max_quantity)
            else {
                return Ok(None);
            };
            existing.quantity = quantity;
            existing.updated_at = now;
            return Ok(Some(existing.clone()));
        }

        if line.quantity > max_quantity {
            return Ok(None);
        }

        state.last_line += 1;
        let created = CartLine {
            id: CartLineId::new(state.last_line),
            owner_id: line.owner_id,
            product_id: line.product_id,
            design_id: line.design_id,
            variant: line.variant.clone(),
            quantity: line.quantity,
            created_at: now,
            updated_at: now,
        };
        state.lines.insert(created.id, created.clone());
        Ok(Some(created))
    }

    async fn set_quantity(
        &self,
        owner: UserId,
        id: CartLineId,
        quantity: u32,
    ) -> Result<Option<CartLine>, RepositoryError> {
        let mut state = self.commerce.lock().await;
        Ok(state
            .lines
            .get_mut(&id)
            .filter(|line| line.owner_id == owner)
            .map(|line| {
                line.quantity = quantity;
                line.updated_at = Utc::now();
                line.clone()
            }))
    }

    async fn remove_line(&self, owner: UserId, id: CartLineId) -> Result<bool, RepositoryError> {
        let mut state = self.commerce.lock().await;
        if state.lines.get(&id).is_some_and(|line| line.owner_id == owner) {
            state.lines.remove(&id);
            return Ok(true);
        }
        Ok(false)
    }

    async fn clear(&self, owner: UserId) -> Result<u64, RepositoryError> {
        let mut state = self.commerce.lock().await;
        let mut removed = 0;
        state.lines.retain(|_, line| {
            let keep = line.owner_id != owner;
            if !keep {
                removed += 1;
            }
            keep
        });
        Ok(removed)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.commerce.lock().await.orders.get(&id).cloned())
    }

    async fn find_by_serial(
        &self,
        serial: &OrderSerial,
    ) -> Result<Option<Order>, RepositoryError> {
        Ok(self
            .commerce
            .lock()
            .await
            .orders
            .values()
            .find(|order| &order.serial == serial)
            .cloned())
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .commerce
            .lock()
            .await
            .orders
            .values()
            .filter(|order| order.owner_id == owner)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.commerce.lock().await;
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(false);
        };
        order.status = status;
        order.updated_at = Utc::now();
        Ok(true)
    }
}

#[async_trait]
impl CheckoutStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, RepositoryError> {
        let guard = Arc::clone(&self.commerce).lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryCheckoutTx { guard, staged }))
    }
}

/// A checkout holding the commerce lock for its whole lifetime.
///
/// Changes go to a staged copy that replaces the shared state on commit.
struct MemoryCheckoutTx {
    guard: OwnedMutexGuard<CommerceState>,
    staged: CommerceState,
}

#[async_trait]
impl CheckoutTx for MemoryCheckoutTx {
    async fn lock_lines(&mut self, ids: &[CartLineId]) -> Result<Vec<CartLine>, RepositoryError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.staged.lines.get(id).cloned())
            .collect())
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError> {
        if self
            .staged
            .orders
            .values()
            .any(|existing| &existing.serial == order.serial())
        {
            return Err(RepositoryError::Conflict(
                "order serial already exists".to_string(),
            ));
        }

        let state = &mut self.staged;
        state.last_order += 1;
        let order_id = OrderId::new(state.last_order);

        let items = order
            .items()
            .iter()
            .map(|item| {
                state.last_item += 1;
                OrderItem {
                    id: OrderItemId::new(state.last_item),
                    order_id,
                    product_name: item.product_name.clone(),
                    product_image_url: item.product_image_url.clone(),
                    design_image_url: item.design_image_url.clone(),
                    variant: item.variant.clone(),
                    unit_price: item.unit_price,
                    quantity: item.quantity,
                }
            })
            .collect();

        let now = Utc::now();
        let created = Order {
            id: order_id,
            owner_id: order.owner_id(),
            serial: order.serial().clone(),
            total_amount: order.total_amount(),
            status: order.status(),
            created_at: now,
            updated_at: now,
            items,
        };
        state.orders.insert(order_id, created.clone());
        Ok(created)
    }

    async fn delete_lines(
        &mut self,
        owner: UserId,
        ids: &[CartLineId],
    ) -> Result<u64, RepositoryError> {
        let mut removed = 0;
        for id in ids {
            if self
                .staged
                .lines
                .get(id)
                .is_some_and(|line| line.owner_id == owner)
            {
                self.staged.lines.remove(id);
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        let Self { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tee_studio_core::Variant;

    use super::*;

    fn new_line(owner: i32, quantity: u32) -> NewCartLine {
        NewCartLine {
            owner_id: UserId::new(owner),
            product_id: ProductId::new(1),
            design_id: DesignId::new(1),
            variant: Variant::new("M", "Black").unwrap(),
            quantity,
        }
    }

    fn order_for(owner: UserId, suffix: u64) -> NewOrder {
        NewOrder::new(
            owner,
            OrderSerial::from_parts(1_700_000_000, suffix),
            vec![crate::models::NewOrderItem {
                product_name: "Classic Tee".to_string(),
                product_image_url: None,
                design_image_url: "/static/images/ai.png".to_string(),
                variant: Variant::new("M", "Black").unwrap(),
                unit_price: Money::from_cents(1000),
                quantity: 1,
            }],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_add_merges_same_key() {
        let store = MemoryStore::new();
        let first = store.add_or_merge(&new_line(1, 2), 10).await.unwrap().unwrap();
        let second = store.add_or_merge(&new_line(1, 3), 10).await.unwrap().unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 5);
        assert_eq!(store.lines_for_owner(UserId::new(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_merge_respects_max_quantity() {
        let store = MemoryStore::new();
        store.add_or_merge(&new_line(1, 8), 10).await.unwrap().unwrap();

        assert!(store.add_or_merge(&new_line(1, 3), 10).await.unwrap().is_none());
        assert!(store.add_or_merge(&new_line(1, u32::MAX), 10).await.unwrap().is_none());

        let merged = store.add_or_merge(&new_line(1, 2), 10).await.unwrap().unwrap();
        assert_eq!(merged.quantity, 10);
    }

    #[tokio::test]
    async fn test_set_quantity_scoped_to_owner() {
        let store = MemoryStore::new();
        let line = store.add_or_merge(&new_line(1, 2), 10).await.unwrap().unwrap();

        let other = store.set_quantity(UserId::new(2), line.id, 9).await.unwrap();
        assert!(other.is_none());
        assert_eq!(store.find_line(line.id).await.unwrap().unwrap().quantity, 2);
    }

    #[tokio::test]
    async fn test_commit_applies_staged_changes() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let line = store.add_or_merge(&new_line(1, 1), 10).await.unwrap().unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.lock_lines(&[line.id]).await.unwrap().len(), 1);
        let order = tx.insert_order(&order_for(owner, 1)).await.unwrap();
        assert_eq!(tx.delete_lines(owner, &[line.id]).await.unwrap(), 1);
        tx.commit().await.unwrap();

        assert!(store.find_line(line.id).await.unwrap().is_none());
        assert_eq!(store.find_by_id(order.id).await.unwrap(), Some(order));
    }

    #[tokio::test]
    async fn test_drop_without_commit_rolls_back() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);
        let line = store.add_or_merge(&new_line(1, 1), 10).await.unwrap().unwrap();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_order(&order_for(owner, 1)).await.unwrap();
            tx.delete_lines(owner, &[line.id]).await.unwrap();
        }

        assert!(store.find_line(line.id).await.unwrap().is_some());
        assert!(store.find_by_owner(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_serial_conflicts() {
        let store = MemoryStore::new();
        let owner = UserId::new(1);

        let mut tx = store.begin().await.unwrap();
        tx.insert_order(&order_for(owner, 7)).await.unwrap();
        let err = tx.insert_order(&order_for(owner, 7)).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_catalog_readable_during_checkout() {
        let store = MemoryStore::new();
        let product = store
            .add_product(NewProduct {
                name: "Classic Tee".to_string(),
                category: "tshirt".to_string(),
                price: Money::from_cents(1999),
                active: true,
                image_url: None,
            })
            .await;

        let _tx = store.begin().await.unwrap();
        let found = store.get_product(product.id).await.unwrap();
        assert_eq!(found, Some(product));
    }
}
