//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (storage ping)
//!
//! # Cart (requires x-user-id)
//! POST   /api/v1/cart                 - Add a line (merges identical lines)
//! GET    /api/v1/cart                 - Lines with catalog data and totals
//! PUT    /api/v1/cart/{id}            - Update a line's quantity
//! DELETE /api/v1/cart/{id}            - Remove a line
//! DELETE /api/v1/cart                 - Empty the cart
//!
//! # Orders (requires x-user-id)
//! POST   /api/v1/orders               - Check out selected cart lines
//! GET    /api/v1/orders               - Order history, newest first
//! GET    /api/v1/orders/{id}          - Order detail
//! GET    /api/v1/orders/sn/{serial}   - Order detail by serial
//! PUT    /api/v1/orders/{id}/status   - Update order status
//! ```

pub mod cart;
pub mod health;
pub mod orders;

use axum::{
    Router,
    routing::{get, put},
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::middleware::{REQUEST_ID_HEADER, request_id_middleware};
use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).post(cart::add).delete(cart::clear))
        .route("/{id}", put(cart::update).delete(cart::remove))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", put(orders::update_status))
        .route("/sn/{serial}", get(orders::show_by_serial))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest(
            "/api/v1",
            Router::new()
                .nest("/cart", cart_routes())
                .nest("/orders", order_routes()),
        )
}

/// Build the complete application: routes, state and middleware.
///
/// Sentry layers are added by the binary so tests can drive this router
/// without a Sentry client.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = tracing::field::Empty,
                user_id = tracing::field::Empty,
            )
        })
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .merge(routes())
        .with_state(state)
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(trace)
        .layer(CorsLayer::new().expose_headers([axum::http::HeaderName::from_static(
            REQUEST_ID_HEADER,
        )]))
}
