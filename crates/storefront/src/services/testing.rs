//! Seeded in-memory catalog shared by the service tests.

use std::sync::Arc;

use tee_studio_core::{Money, UserId};

use super::{CartService, OrderBuilder, OrderService, SerialGenerator};
use crate::db::{MemoryStore, Storage};
use crate::models::{Design, NewDesign, NewProduct, Product};

pub struct Seeded {
    pub store: MemoryStore,
    pub owner: UserId,
    pub other: UserId,
    /// 10.00
    pub tee: Product,
    /// 25.00
    pub hoodie: Product,
    /// Owned by `owner`.
    pub design: Design,
    /// Owned by `other`.
    pub other_design: Design,
    pub carts: CartService,
    pub builder: OrderBuilder,
    pub orders: OrderService,
}

fn new_product(name: &str, category: &str, cents: u32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category: category.to_string(),
        price: Money::from_cents(cents),
        active: true,
        image_url: Some(format!("/static/images/{category}.png")),
    }
}

fn new_design(owner: UserId, title: &str) -> NewDesign {
    NewDesign {
        owner_id: owner,
        title: Some(title.to_string()),
        prompt: format!("{title} in neon colors"),
        image_url: format!("/static/images/{}.png", title.to_lowercase()),
        style: Some("neon".to_string()),
    }
}

pub async fn seeded() -> Seeded {
    let store = MemoryStore::new();
    let owner = UserId::new(1);
    let other = UserId::new(2);

    let tee = store.add_product(new_product("Classic Tee", "tshirt", 1000)).await;
    let hoodie = store.add_product(new_product("Zip Hoodie", "hoodie", 2500)).await;
    let design = store.add_design(new_design(owner, "Tiger")).await;
    let other_design = store.add_design(new_design(other, "Dragon")).await;

    let storage = Storage::memory(store.clone());
    let carts = CartService::new(storage.carts.clone(), storage.catalog.clone());
    let builder = OrderBuilder::new(
        storage.checkout.clone(),
        storage.catalog.clone(),
        Arc::new(SerialGenerator::new()),
    );
    let orders = OrderService::new(storage.orders.clone());

    Seeded {
        store,
        owner,
        other,
        tee,
        hoodie,
        design,
        other_design,
        carts,
        builder,
        orders,
    }
}
