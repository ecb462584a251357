//! Order domain types.
//!
//! An order is a frozen snapshot: its items copy the product name, images,
//! variant and unit price at checkout time and never point back at live cart
//! or catalog rows. Only `status` changes after creation.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tee_studio_core::{Money, OrderId, OrderItemId, OrderSerial, OrderStatus, UserId, Variant};

/// A placed order with its line-item snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub owner_id: UserId,
    pub serial: OrderSerial,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Never empty.
    pub items: Vec<OrderItem>,
}

/// One frozen line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub design_image_url: String,
    pub variant: Variant,
    pub unit_price: Money,
    pub quantity: u32,
}

impl OrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// Snapshot of one cart line, ready to be persisted as an [`OrderItem`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub design_image_url: String,
    pub variant: Variant,
    pub unit_price: Money,
    pub quantity: u32,
}

impl NewOrderItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.unit_price.times(self.quantity)
    }
}

/// An order about to be persisted.
///
/// Construction guarantees at least one item and a total equal to the sum of
/// the item line totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    owner_id: UserId,
    serial: OrderSerial,
    total_amount: Money,
    status: OrderStatus,
    items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build a pending order from item snapshots.
    ///
    /// Returns `None` when `items` is empty or every item has zero quantity.
    #[must_use]
    pub fn new(owner_id: UserId, serial: OrderSerial, items: Vec<NewOrderItem>) -> Option<Self> {
        if items.iter().all(|item| item.quantity == 0) {
            return None;
        }

        let total_amount = items.iter().map(NewOrderItem::line_total).sum();

        Some(Self {
            owner_id,
            serial,
            total_amount,
            status: OrderStatus::Pending,
            items,
        })
    }

    #[must_use]
    pub const fn owner_id(&self) -> UserId {
        self.owner_id
    }

    #[must_use]
    pub const fn serial(&self) -> &OrderSerial {
        &self.serial
    }

    #[must_use]
    pub const fn total_amount(&self) -> Money {
        self.total_amount
    }

    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    #[must_use]
    pub fn items(&self) -> &[NewOrderItem] {
        &self.items
    }
}
