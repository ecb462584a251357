//! Demo catalog for local development.
//!
//! Loaded into the in-memory backend at startup and written to `PostgreSQL`
//! by `ts-cli seed`.

use tee_studio_core::{Money, UserId};

use super::{MemoryStore, PgCatalog, RepositoryError};
use crate::models::{NewDesign, NewProduct};

/// Username of the demo account owning the demo design.
pub const DEMO_USERNAME: &str = "demo";

/// What a seed run created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub user_id: UserId,
    pub products: usize,
    pub designs: usize,
}

/// Products every fresh environment starts with.
#[must_use]
pub fn demo_products() -> Vec<NewProduct> {
    [
        ("Classic Tee", "tshirt", 2000),
        ("Heavyweight Tee", "tshirt", 2800),
        ("Long Sleeve Tee", "longsleeve", 3200),
        ("Pullover Hoodie", "hoodie", 5500),
    ]
    .into_iter()
    .map(|(name, category, cents)| NewProduct {
        name: name.to_string(),
        category: category.to_string(),
        price: Money::from_cents(cents),
        active: true,
        image_url: Some(format!("/static/images/products/{category}.png")),
    })
    .collect()
}

/// A design owned by the demo account.
#[must_use]
pub fn demo_design(owner: UserId) -> NewDesign {
    NewDesign {
        owner_id: owner,
        title: Some("Sunset Tiger".to_string()),
        prompt: "a tiger watching a synthwave sunset".to_string(),
        image_url: "/static/images/designs/sunset-tiger.png".to_string(),
        style: Some("synthwave".to_string()),
    }
}

/// Load the demo catalog into an in-memory store, owned by user 1.
pub async fn seed_memory(store: &MemoryStore) -> SeedSummary {
    let user_id = UserId::new(1);
    let products = demo_products();
    let count = products.len();

    for product in products {
        store.add_product(product).await;
    }
    store.add_design(demo_design(user_id)).await;

    SeedSummary {
        user_id,
        products: count,
        designs: 1,
    }
}

/// Write the demo account and catalog to `PostgreSQL`.
///
/// # Errors
///
/// Returns `RepositoryError` if any insert fails.
pub async fn seed_postgres(catalog: &PgCatalog) -> Result<SeedSummary, RepositoryError> {
    let user_id = catalog.upsert_user(DEMO_USERNAME).await?;

    let products = demo_products();
    for product in &products {
        catalog.insert_product(product).await?;
    }
    catalog.insert_design(&demo_design(user_id)).await?;

    Ok(SeedSummary {
        user_id,
        products: products.len(),
        designs: 1,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::CatalogLookup;
    use tee_studio_core::{DesignId, ProductId};

    #[tokio::test]
    async fn test_seed_memory() {
        let store = MemoryStore::new();
        let summary = seed_memory(&store).await;

        assert_eq!(summary.products, 4);
        let tee = store.get_product(ProductId::new(1)).await.unwrap().unwrap();
        assert_eq!(tee.price.to_string(), "20.00");
        let design = store.get_design(DesignId::new(1)).await.unwrap().unwrap();
        assert_eq!(design.owner_id, summary.user_id);
    }
}
