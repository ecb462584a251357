//! Cart domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tee_studio_core::{CartLineId, DesignId, Money, ProductId, UserId, Variant};

use super::catalog::{Design, Product};

/// A live line in a user's cart.
///
/// `(owner_id, product_id, design_id, variant)` is the merge key: at most one
/// line exists per key and adding the same key again raises its quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLine {
    pub id: CartLineId,
    pub owner_id: UserId,
    pub product_id: ProductId,
    pub design_id: DesignId,
    pub variant: Variant,
    /// Always at least 1.
    pub quantity: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CartLine {
    /// Whether `other` would merge into this line.
    #[must_use]
    pub fn same_key(&self, other: &NewCartLine) -> bool {
        self.owner_id == other.owner_id
            && self.product_id == other.product_id
            && self.design_id == other.design_id
            && self.variant == other.variant
    }
}

/// A validated line about to be added (or merged) into a cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCartLine {
    pub owner_id: UserId,
    pub product_id: ProductId,
    pub design_id: DesignId,
    pub variant: Variant,
    pub quantity: u32,
}

/// A cart line joined with its current catalog data.
///
/// `product`/`design` are `None` when the referenced row no longer resolves.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    #[serde(flatten)]
    pub line: CartLine,
    pub product: Option<Product>,
    pub design: Option<Design>,
    /// Current price times quantity, when the product still resolves.
    pub line_total: Option<Money>,
}

/// Everything in a user's cart.
#[derive(Debug, Clone, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartLineView>,
    /// Sum of quantities over all lines.
    pub total_items: u32,
    /// Sum of `line_total` over lines whose product still resolves.
    pub total_value: Money,
}

impl CartSummary {
    /// Build a summary, computing the totals from the lines.
    #[must_use]
    pub fn new(items: Vec<CartLineView>) -> Self {
        let total_items = items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.line.quantity));
        let total_value = items.iter().filter_map(|item| item.line_total).sum();

        Self {
            items,
            total_items,
            total_value,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
