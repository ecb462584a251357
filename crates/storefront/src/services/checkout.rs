//! Checkout: turning selected cart lines into an order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{info, instrument};

use tee_studio_core::{CartLineId, UserId};

use super::{CommerceError, Entity, SerialGenerator};
use crate::db::{CatalogLookup, CheckoutStore};
use crate::models::{CartLine, NewOrder, NewOrderItem, Order};

/// Builds orders from cart lines.
#[derive(Clone)]
pub struct OrderBuilder {
    checkout: Arc<dyn CheckoutStore>,
    catalog: Arc<dyn CatalogLookup>,
    serials: Arc<SerialGenerator>,
}

impl OrderBuilder {
    #[must_use]
    pub fn new(
        checkout: Arc<dyn CheckoutStore>,
        catalog: Arc<dyn CatalogLookup>,
        serials: Arc<SerialGenerator>,
    ) -> Self {
        Self {
            checkout,
            catalog,
            serials,
        }
    }

    /// Create an order from the owner's selected cart lines.
    ///
    /// Runs in a single checkout transaction: the lines are locked, priced
    /// from the current catalog, written as an order and removed from the
    /// cart. On any error nothing is persisted and the cart is unchanged.
    /// Repeated IDs in `line_ids` count once.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `line_ids` is empty or the total quantity is zero
    /// - `NotFound` if a line, or its product or design, does not exist
    /// - `OwnershipViolation` if a line belongs to another user
    /// - `Unavailable` if a product is inactive
    /// - `Storage` if the transaction fails
    #[instrument(skip(self, line_ids), fields(lines = line_ids.len()))]
    pub async fn create_order(
        &self,
        owner: UserId,
        line_ids: &[CartLineId],
    ) -> Result<Order, CommerceError> {
        let mut seen = HashSet::with_capacity(line_ids.len());
        let ids: Vec<CartLineId> = line_ids
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();

        if ids.is_empty() {
            return Err(CommerceError::invalid("no cart lines selected"));
        }

        let mut tx = self.checkout.begin().await?;

        let mut locked: HashMap<CartLineId, CartLine> = tx
            .lock_lines(&ids)
            .await?
            .into_iter()
            .map(|line| (line.id, line))
            .collect();

        let mut lines = Vec::with_capacity(ids.len());
        for id in &ids {
            let line = locked
                .remove(id)
                .ok_or_else(|| CommerceError::not_found(Entity::CartLine, id))?;
            if line.owner_id != owner {
                return Err(CommerceError::ownership_violation(Entity::CartLine, id));
            }
            lines.push(line);
        }

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            items.push(self.snapshot(line).await?);
        }

        let serial = self.serials.issue();
        let order = NewOrder::new(owner, serial, items)
            .ok_or_else(|| CommerceError::invalid("selected lines have no quantity"))?;

        let created = tx.insert_order(&order).await?;
        tx.delete_lines(owner, &ids).await?;
        tx.commit().await?;

        info!(
            order_id = %created.id,
            serial = %created.serial,
            total = %created.total_amount,
            items = created.items.len(),
            "order created"
        );

        Ok(created)
    }

    /// Freeze a line against the current catalog.
    async fn snapshot(&self, line: &CartLine) -> Result<NewOrderItem, CommerceError> {
        let product = self
            .catalog
            .get_product(line.product_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::Product, line.product_id))?;
        if !product.active {
            return Err(CommerceError::unavailable(Entity::Product, line.product_id));
        }

        let design = self
            .catalog
            .get_design(line.design_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::Design, line.design_id))?;

        Ok(NewOrderItem {
            product_name: product.name,
            product_image_url: product.image_url,
            design_image_url: design.image_url,
            variant: line.variant.clone(),
            unit_price: product.price,
            quantity: line.quantity,
        })
    }
}
