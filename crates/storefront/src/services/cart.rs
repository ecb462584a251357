//! Cart service.
//!
//! Owns the rules for live cart lines: catalog validation on add, merge on
//! duplicate key, and owner scoping on every mutation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, instrument};

use tee_studio_core::{CartLineId, DesignId, ProductId, UserId, Variant};

use super::{CommerceError, Entity};
use crate::db::{CartRepository, CatalogLookup};
use crate::models::{CartLine, CartLineView, CartSummary, Design, NewCartLine, Product};

/// Largest quantity accepted in a single request.
pub const MAX_LINE_QUANTITY: u32 = 9_999;

/// Cart operations for one storage backend.
#[derive(Clone)]
pub struct CartService {
    carts: Arc<dyn CartRepository>,
    catalog: Arc<dyn CatalogLookup>,
}

impl CartService {
    #[must_use]
    pub fn new(carts: Arc<dyn CartRepository>, catalog: Arc<dyn CatalogLookup>) -> Self {
        Self { carts, catalog }
    }

    /// Add a line to the owner's cart, merging with an existing line of the
    /// same product, design and variant.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `quantity` is zero or above [`MAX_LINE_QUANTITY`],
    ///   or if merging would take the line above it
    /// - `NotFound` if the product or design does not exist
    /// - `Unavailable` if the product is inactive
    /// - `OwnershipViolation` if the design belongs to another user
    #[instrument(skip(self, variant), fields(variant = %variant))]
    pub async fn add_line(
        &self,
        owner: UserId,
        product_id: ProductId,
        design_id: DesignId,
        variant: Variant,
        quantity: u32,
    ) -> Result<CartLine, CommerceError> {
        validate_quantity(quantity)?;

        let product = self
            .catalog
            .get_product(product_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::Product, product_id))?;
        if !product.active {
            return Err(CommerceError::unavailable(Entity::Product, product_id));
        }

        let design = self
            .catalog
            .get_design(design_id)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::Design, design_id))?;
        if design.owner_id != owner {
            return Err(CommerceError::ownership_violation(Entity::Design, design_id));
        }

        let line = self
            .carts
            .add_or_merge(
                &NewCartLine {
                    owner_id: owner,
                    product_id,
                    design_id,
                    variant,
                    quantity,
                },
                MAX_LINE_QUANTITY,
            )
            .await?
            .ok_or_else(|| {
                CommerceError::invalid(format!(
                    "cart line quantity would exceed {MAX_LINE_QUANTITY}"
                ))
            })?;

        debug!(line = %line.id, quantity = line.quantity, "cart line saved");
        Ok(line)
    }

    /// Everything in the owner's cart, joined with current catalog data.
    ///
    /// Lines whose product or design no longer resolves are still returned,
    /// without the missing snapshot and without a line total.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if a lookup fails.
    #[instrument(skip(self))]
    pub async fn get_lines(&self, owner: UserId) -> Result<CartSummary, CommerceError> {
        let lines = self.carts.lines_for_owner(owner).await?;

        let mut products: HashMap<ProductId, Option<Product>> = HashMap::new();
        let mut designs: HashMap<DesignId, Option<Design>> = HashMap::new();
        let mut items = Vec::with_capacity(lines.len());

        for line in lines {
            if !products.contains_key(&line.product_id) {
                let product = self.catalog.get_product(line.product_id).await?;
                products.insert(line.product_id, product);
            }
            if !designs.contains_key(&line.design_id) {
                let design = self.catalog.get_design(line.design_id).await?;
                designs.insert(line.design_id, design);
            }

            let product = products.get(&line.product_id).cloned().flatten();
            let design = designs.get(&line.design_id).cloned().flatten();
            let line_total = product.as_ref().map(|p| p.price.times(line.quantity));

            items.push(CartLineView {
                line,
                product,
                design,
                line_total,
            });
        }

        Ok(CartSummary::new(items))
    }

    /// Overwrite the quantity of one of the owner's lines.
    ///
    /// # Errors
    ///
    /// - `InvalidRequest` if `quantity` is zero or above [`MAX_LINE_QUANTITY`]
    /// - `NotFound` if the line does not exist or belongs to another user
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        owner: UserId,
        line_id: CartLineId,
        quantity: u32,
    ) -> Result<CartLine, CommerceError> {
        validate_quantity(quantity)?;

        self.carts
            .set_quantity(owner, line_id, quantity)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::CartLine, line_id))
    }

    /// Remove one of the owner's lines.
    ///
    /// Removing a line that does not exist, or that belongs to someone else,
    /// changes nothing and is not an error.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete fails.
    #[instrument(skip(self))]
    pub async fn remove_line(&self, owner: UserId, line_id: CartLineId) -> Result<(), CommerceError> {
        let removed = self.carts.remove_line(owner, line_id).await?;
        debug!(removed, "cart line removed");
        Ok(())
    }

    /// Empty the owner's cart. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the delete fails.
    #[instrument(skip(self))]
    pub async fn clear_all(&self, owner: UserId) -> Result<(), CommerceError> {
        let removed = self.carts.clear(owner).await?;
        debug!(removed, "cart cleared");
        Ok(())
    }
}

fn validate_quantity(quantity: u32) -> Result<(), CommerceError> {
    if quantity == 0 {
        return Err(CommerceError::invalid("quantity must be greater than zero"));
    }
    if quantity > MAX_LINE_QUANTITY {
        return Err(CommerceError::invalid(format!(
            "quantity must be at most {MAX_LINE_QUANTITY}"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use tee_studio_core::Money;

    use super::*;
    use crate::services::testing::seeded;

    fn black_m() -> Variant {
        Variant::new("M", "Black").unwrap()
    }

    #[tokio::test]
    async fn test_add_same_key_twice_merges() {
        let s = seeded().await;
        s.carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();
        s.carts
            .add_line(s.owner, s.tee.id, s.design.id, Variant::new(" M ", "Black").unwrap(), 3)
            .await
            .unwrap();

        let summary = s.carts.get_lines(s.owner).await.unwrap();
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.items[0].line.quantity, 5);
        assert_eq!(summary.total_items, 5);
        assert_eq!(summary.total_value, Money::from_cents(5000));
    }

    #[tokio::test]
    async fn test_merge_past_max_quantity_is_rejected() {
        let s = seeded().await;
        let line = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), MAX_LINE_QUANTITY)
            .await
            .unwrap();

        let err = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::InvalidRequest(_)));

        let summary = s.carts.get_lines(s.owner).await.unwrap();
        assert_eq!(summary.items[0].line.quantity, MAX_LINE_QUANTITY);

        // The stored quantity is still accepted by an update.
        let updated = s
            .carts
            .update_quantity(s.owner, line.id, MAX_LINE_QUANTITY)
            .await
            .unwrap();
        assert_eq!(updated.quantity, MAX_LINE_QUANTITY);
    }

    #[tokio::test]
    async fn test_different_variant_is_a_new_line() {
        let s = seeded().await;
        s.carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 1)
            .await
            .unwrap();
        s.carts
            .add_line(s.owner, s.tee.id, s.design.id, Variant::new("L", "Black").unwrap(), 1)
            .await
            .unwrap();

        assert_eq!(s.carts.get_lines(s.owner).await.unwrap().items.len(), 2);
    }

    #[tokio::test]
    async fn test_add_rejects_bad_quantity() {
        let s = seeded().await;
        for quantity in [0, MAX_LINE_QUANTITY + 1] {
            let err = s
                .carts
                .add_line(s.owner, s.tee.id, s.design.id, black_m(), quantity)
                .await
                .unwrap_err();
            assert!(matches!(err, CommerceError::InvalidRequest(_)));
        }
        assert!(s.carts.get_lines(s.owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_product_is_not_found() {
        let s = seeded().await;
        let err = s
            .carts
            .add_line(s.owner, ProductId::new(99), s.design.id, black_m(), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommerceError::NotFound {
                entity: Entity::Product,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_add_unknown_design_is_not_found() {
        let s = seeded().await;
        let err = s
            .carts
            .add_line(s.owner, s.tee.id, DesignId::new(99), black_m(), 1)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CommerceError::NotFound {
                entity: Entity::Design,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_add_inactive_product_is_unavailable() {
        let s = seeded().await;
        s.store.set_product_active(s.tee.id, false).await;

        let err = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn test_add_foreign_design_is_ownership_violation() {
        let s = seeded().await;
        let err = s
            .carts
            .add_line(s.owner, s.tee.id, s.other_design.id, black_m(), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::OwnershipViolation { .. }));
        assert!(s.carts.get_lines(s.owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_quantity() {
        let s = seeded().await;
        let line = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();

        let updated = s.carts.update_quantity(s.owner, line.id, 4).await.unwrap();
        assert_eq!(updated.quantity, 4);
        assert_eq!(
            s.carts.get_lines(s.owner).await.unwrap().total_value,
            Money::from_cents(4000)
        );
    }

    #[tokio::test]
    async fn test_update_quantity_of_foreign_line_is_not_found() {
        let s = seeded().await;
        let line = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();

        let err = s
            .carts
            .update_quantity(s.other, line.id, 7)
            .await
            .unwrap_err();
        assert!(matches!(err, CommerceError::NotFound { .. }));

        let summary = s.carts.get_lines(s.owner).await.unwrap();
        assert_eq!(summary.items[0].line.quantity, 2);
    }

    #[tokio::test]
    async fn test_update_quantity_rejects_zero() {
        let s = seeded().await;
        let line = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();

        let err = s.carts.update_quantity(s.owner, line.id, 0).await.unwrap_err();
        assert!(matches!(err, CommerceError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_remove_foreign_line_is_noop() {
        let s = seeded().await;
        let line = s
            .carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();

        s.carts.remove_line(s.other, line.id).await.unwrap();
        assert_eq!(s.carts.get_lines(s.owner).await.unwrap().items.len(), 1);

        s.carts.remove_line(s.owner, line.id).await.unwrap();
        s.carts.remove_line(s.owner, line.id).await.unwrap();
        assert!(s.carts.get_lines(s.owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_all_twice() {
        let s = seeded().await;
        s.carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();

        s.carts.clear_all(s.owner).await.unwrap();
        assert!(s.carts.get_lines(s.owner).await.unwrap().is_empty());
        s.carts.clear_all(s.owner).await.unwrap();
        assert!(s.carts.get_lines(s.owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_vanished_product_is_listed_without_total() {
        let s = seeded().await;
        s.carts
            .add_line(s.owner, s.tee.id, s.design.id, black_m(), 2)
            .await
            .unwrap();
        s.carts
            .add_line(s.owner, s.hoodie.id, s.design.id, black_m(), 1)
            .await
            .unwrap();
        s.store.remove_product(s.tee.id).await;

        let summary = s.carts.get_lines(s.owner).await.unwrap();
        assert_eq!(summary.items.len(), 2);
        assert!(summary.items[0].product.is_none());
        assert!(summary.items[0].design.is_some());
        assert_eq!(summary.items[0].line_total, None);
        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_value, Money::from_cents(2500));
    }
}
