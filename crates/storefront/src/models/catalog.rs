//! Catalog types consumed by the cart and checkout.

use chrono::{DateTime, Utc};
use serde::Serialize;

use tee_studio_core::{DesignId, Money, ProductId, UserId};

/// A sellable blank (t-shirt, hoodie, ...) as seen by the checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    /// Current catalog price per unit.
    pub price: Money,
    /// Inactive products cannot be added to carts or ordered.
    pub active: bool,
    pub image_url: Option<String>,
}

/// An AI-generated image owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Design {
    pub id: DesignId,
    pub owner_id: UserId,
    pub title: Option<String>,
    pub prompt: String,
    pub image_url: String,
    pub style: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub price: Money,
    pub active: bool,
    pub image_url: Option<String>,
}

/// Parameters for creating a design.
#[derive(Debug, Clone)]
pub struct NewDesign {
    pub owner_id: UserId,
    pub title: Option<String>,
    pub prompt: String,
    pub image_url: String,
    pub style: Option<String>,
}
