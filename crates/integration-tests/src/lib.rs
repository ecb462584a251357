//! Integration tests for Tee Studio.
//!
//! Tests drive the full storefront router in-process with
//! `tower::ServiceExt::oneshot`, backed by the in-memory store, so no
//! database or running server is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p tee-studio-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `cart_api` - Cart endpoints and identity handling
//! - `checkout_api` - Checkout and order endpoints
//! - `health` - Liveness and readiness

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use tee_studio_core::{DesignId, Money, ProductId, UserId};
use tee_studio_storefront::config::{ConfigError, StorefrontConfig};
use tee_studio_storefront::db::{MemoryStore, Storage};
use tee_studio_storefront::middleware::USER_ID_HEADER;
use tee_studio_storefront::models::{NewDesign, NewProduct};
use tee_studio_storefront::routes;
use tee_studio_storefront::state::AppState;

/// A storefront wired to a seeded in-memory store.
pub struct TestApp {
    pub store: MemoryStore,
    pub router: Router,
    /// Owner of `design`.
    pub alice: UserId,
    /// Owner of `other_design`.
    pub bob: UserId,
    /// Priced 10.00.
    pub tee: ProductId,
    /// Priced 25.00.
    pub hoodie: ProductId,
    pub design: DesignId,
    pub other_design: DesignId,
}

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    /// Build a fresh application with two users, two products and one
    /// design per user.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the test configuration is rejected.
    pub async fn spawn() -> Result<Self, ConfigError> {
        let config = StorefrontConfig::from_lookup(|key| {
            (key == "STOREFRONT_STORAGE").then(|| "memory".to_string())
        })?;

        let store = MemoryStore::new();
        let alice = UserId::new(1);
        let bob = UserId::new(2);

        let tee = store.add_product(new_product("Classic Tee", 1000)).await.id;
        let hoodie = store.add_product(new_product("Zip Hoodie", 2500)).await.id;
        let design = store.add_design(new_design(alice, "Tiger")).await.id;
        let other_design = store.add_design(new_design(bob, "Dragon")).await.id;

        let state = AppState::new(config, Storage::memory(store.clone()));

        Ok(Self {
            store,
            router: routes::app(state),
            alice,
            bob,
            tee,
            hoodie,
            design,
            other_design,
        })
    }

    /// Send a request as `user` (or anonymously) and decode the JSON body.
    ///
    /// Empty bodies decode to `Value::Null`; plain-text bodies to a string.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the router fails.
    #[allow(clippy::unwrap_used)]
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        user: Option<UserId>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(USER_ID_HEADER, user.to_string());
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    /// Add a cart line as `user` and return its ID.
    ///
    /// # Panics
    ///
    /// Panics if the line is not created.
    #[allow(clippy::unwrap_used)]
    pub async fn add_line(
        &self,
        user: UserId,
        product: ProductId,
        design: DesignId,
        size: &str,
        color: &str,
        quantity: u32,
    ) -> i64 {
        let response = self
            .send(
                Method::POST,
                "/api/v1/cart",
                Some(user),
                Some(serde_json::json!({
                    "product_id": product.as_i32(),
                    "design_id": design.as_i32(),
                    "size": size,
                    "color": color,
                    "quantity": quantity,
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["id"].as_i64().unwrap()
    }
}

/// Parse a money string from a response body.
///
/// # Panics
///
/// Panics if the value is not a valid amount.
#[allow(clippy::unwrap_used)]
#[must_use]
pub fn money(value: &Value) -> Money {
    Money::parse(value.as_str().unwrap()).unwrap()
}

fn new_product(name: &str, cents: u32) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        category: "tshirt".to_string(),
        price: Money::from_cents(cents),
        active: true,
        image_url: Some(format!("/static/images/{}.png", name.to_lowercase())),
    }
}

fn new_design(owner: UserId, title: &str) -> NewDesign {
    NewDesign {
        owner_id: owner,
        title: Some(title.to_string()),
        prompt: format!("a {title} in watercolor"),
        image_url: format!("/static/images/designs/{}.png", title.to_lowercase()),
        style: Some("watercolor".to_string()),
    }
}
