//! Checkout and order endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use serde_json::json;
use tee_studio_integration_tests::{TestApp, money};

use tee_studio_core::Money;

async fn checkout(app: &TestApp, ids: &[i64]) -> tee_studio_integration_tests::TestResponse {
    app.send(
        Method::POST,
        "/api/v1/orders",
        Some(app.alice),
        Some(json!({ "cart_item_ids": ids })),
    )
    .await
}

#[tokio::test]
async fn test_checkout_creates_order_and_empties_cart() {
    let app = TestApp::spawn().await.unwrap();
    let l1 = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 2)
        .await;
    let l2 = app
        .add_line(app.alice, app.hoodie, app.design, "M", "Black", 1)
        .await;

    let response = checkout(&app, &[l1, l2]).await;

    assert_eq!(response.status, StatusCode::CREATED);
    let order = &response.body;
    assert_eq!(money(&order["total_amount"]), Money::from_cents(4500));
    assert_eq!(order["status"], "pending");
    assert!(order["serial"].as_str().unwrap().starts_with("ORD"));

    let items = order["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    let tee = items
        .iter()
        .find(|item| item["product_name"] == "Classic Tee")
        .unwrap();
    assert_eq!(money(&tee["unit_price"]), Money::from_cents(1000));
    assert_eq!(tee["quantity"], 2);
    assert_eq!(tee["variant"]["color"], "White");
    assert_eq!(tee["design_image_url"], "/static/images/designs/tiger.png");

    let cart = app
        .send(Method::GET, "/api/v1/cart", Some(app.alice), None)
        .await;
    assert!(cart.body["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_rejections_leave_cart_intact() {
    let app = TestApp::spawn().await.unwrap();
    let mine = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 1)
        .await;
    let bobs = app
        .add_line(app.bob, app.tee, app.other_design, "S", "Red", 1)
        .await;

    assert_eq!(checkout(&app, &[]).await.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        checkout(&app, &[mine, bobs]).await.status,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        checkout(&app, &[mine, 9999]).await.status,
        StatusCode::NOT_FOUND
    );

    app.store.set_product_active(app.tee, false).await;
    assert_eq!(checkout(&app, &[mine]).await.status, StatusCode::CONFLICT);

    let orders = app
        .send(Method::GET, "/api/v1/orders", Some(app.alice), None)
        .await;
    assert_eq!(orders.body["count"], 0);

    let cart = app
        .send(Method::GET, "/api/v1/cart", Some(app.alice), None)
        .await;
    assert_eq!(cart.body["items"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_order_is_a_snapshot() {
    let app = TestApp::spawn().await.unwrap();
    let line = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 3)
        .await;
    let created = checkout(&app, &[line]).await.body;
    let id = created["id"].as_i64().unwrap();

    app.store
        .set_product_price(app.tee, Money::from_cents(9900))
        .await;
    app.store.remove_design(app.design).await;

    let fetched = app
        .send(
            Method::GET,
            &format!("/api/v1/orders/{id}"),
            Some(app.alice),
            None,
        )
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(money(&fetched.body["total_amount"]), Money::from_cents(3000));
    assert_eq!(fetched.body["items"], created["items"]);
}

#[tokio::test]
async fn test_order_history_and_lookups() {
    let app = TestApp::spawn().await.unwrap();
    let first_line = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 1)
        .await;
    let first = checkout(&app, &[first_line]).await.body;
    let second_line = app
        .add_line(app.alice, app.hoodie, app.design, "L", "White", 1)
        .await;
    let second = checkout(&app, &[second_line]).await.body;

    let history = app
        .send(Method::GET, "/api/v1/orders", Some(app.alice), None)
        .await;
    assert_eq!(history.status, StatusCode::OK);
    assert_eq!(history.body["count"], 2);
    assert_eq!(history.body["orders"][0]["id"], second["id"]);
    assert_eq!(history.body["orders"][1]["id"], first["id"]);

    let bobs_history = app
        .send(Method::GET, "/api/v1/orders", Some(app.bob), None)
        .await;
    assert_eq!(bobs_history.body["count"], 0);

    let serial = first["serial"].as_str().unwrap();
    let by_serial = app
        .send(
            Method::GET,
            &format!("/api/v1/orders/sn/{serial}"),
            Some(app.alice),
            None,
        )
        .await;
    assert_eq!(by_serial.status, StatusCode::OK);
    assert_eq!(by_serial.body["id"], first["id"]);

    let bad_serial = app
        .send(
            Method::GET,
            "/api/v1/orders/sn/not-a-serial",
            Some(app.alice),
            None,
        )
        .await;
    assert_eq!(bad_serial.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_order_is_forbidden_and_missing_is_not_found() {
    let app = TestApp::spawn().await.unwrap();
    let line = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 1)
        .await;
    let order = checkout(&app, &[line]).await.body;
    let id = order["id"].as_i64().unwrap();
    let serial = order["serial"].as_str().unwrap();

    let foreign = app
        .send(
            Method::GET,
            &format!("/api/v1/orders/{id}"),
            Some(app.bob),
            None,
        )
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let foreign_serial = app
        .send(
            Method::GET,
            &format!("/api/v1/orders/sn/{serial}"),
            Some(app.bob),
            None,
        )
        .await;
    assert_eq!(foreign_serial.status, StatusCode::FORBIDDEN);

    let missing = app
        .send(Method::GET, "/api/v1/orders/4040", Some(app.bob), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_status_updates() {
    let app = TestApp::spawn().await.unwrap();
    let line = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 1)
        .await;
    let order = checkout(&app, &[line]).await.body;
    let uri = format!("/api/v1/orders/{}/status", order["id"]);

    let paid = app
        .send(Method::PUT, &uri, Some(app.alice), Some(json!({ "status": "paid" })))
        .await;
    assert_eq!(paid.status, StatusCode::OK);
    assert_eq!(paid.body["status"], "paid");
    assert_eq!(paid.body["total_amount"], order["total_amount"]);

    // No transition rules: a paid order can go back to pending.
    let pending = app
        .send(
            Method::PUT,
            &uri,
            Some(app.alice),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(pending.body["status"], "pending");

    let unknown = app
        .send(
            Method::PUT,
            &uri,
            Some(app.alice),
            Some(json!({ "status": "teleported" })),
        )
        .await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let foreign = app
        .send(Method::PUT, &uri, Some(app.bob), Some(json!({ "status": "cancelled" })))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let missing = app
        .send(
            Method::PUT,
            "/api/v1/orders/4040/status",
            Some(app.alice),
            Some(json!({ "status": "paid" })),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_twice_fails_second_time() {
    let app = TestApp::spawn().await.unwrap();
    let line = app
        .add_line(app.alice, app.tee, app.design, "L", "White", 1)
        .await;

    assert_eq!(checkout(&app, &[line]).await.status, StatusCode::CREATED);
    assert_eq!(checkout(&app, &[line]).await.status, StatusCode::NOT_FOUND);

    let history = app
        .send(Method::GET, "/api/v1/orders", Some(app.alice), None)
        .await;
    assert_eq!(history.body["count"], 1);
}
