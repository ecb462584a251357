//! Liveness and readiness endpoints.

#![allow(clippy::unwrap_used)]

use axum::http::{Method, StatusCode};
use tee_studio_integration_tests::TestApp;

#[tokio::test]
async fn test_liveness() {
    let app = TestApp::spawn().await.unwrap();
    let response = app.send(Method::GET, "/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_readiness_with_memory_storage() {
    let app = TestApp::spawn().await.unwrap();
    let response = app.send(Method::GET, "/health/ready", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = TestApp::spawn().await.unwrap();
    let response = app
        .send(Method::GET, "/api/v1/wishlist", Some(app.alice), None)
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
