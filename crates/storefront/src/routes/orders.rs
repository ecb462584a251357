//! Order route handlers.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tee_studio_core::{CartLineId, InvalidOrderStatus, OrderId, OrderSerial, OrderStatus};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::Order;
use crate::services::CommerceError;
use crate::state::AppState;

/// Checkout request body.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub cart_item_ids: Vec<CartLineId>,
}

/// Status update request body.
///
/// Kept as a string so unknown statuses produce a descriptive 400.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Order history response.
#[derive(Debug, Serialize)]
pub struct OrderList {
    pub orders: Vec<Order>,
    pub count: usize,
}

/// Check out the selected cart lines.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>)> {
    let Json(body) = payload?;

    let order = state
        .checkout()
        .create_order(user.id, &body.cart_item_ids)
        .await?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// The user's orders, newest first.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<OrderList>> {
    let orders = state.orders().find_by_owner(user.id).await?;
    Ok(Json(OrderList {
        count: orders.len(),
        orders,
    }))
}

/// One of the user's orders by ID.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    id: std::result::Result<Path<OrderId>, PathRejection>,
) -> Result<Json<Order>> {
    let Path(id) = id?;
    Ok(Json(state.orders().get_order_by_id(user.id, id).await?))
}

/// One of the user's orders by serial.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show_by_serial(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(serial): Path<String>,
) -> Result<Json<Order>> {
    let serial =
        OrderSerial::parse(&serial).map_err(|e| CommerceError::invalid(e.to_string()))?;
    Ok(Json(
        state
            .orders()
            .get_order_by_serial(user.id, &serial)
            .await?,
    ))
}

/// Overwrite the status of one of the user's orders.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update_status(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    id: std::result::Result<Path<OrderId>, PathRejection>,
    payload: std::result::Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<Order>> {
    let Path(id) = id?;
    let Json(body) = payload?;

    let status: OrderStatus = body
        .status
        .parse()
        .map_err(|e: InvalidOrderStatus| CommerceError::invalid(e.to_string()))?;

    let order = state
        .orders()
        .update_status_for_owner(user.id, id, status)
        .await?;

    Ok(Json(order))
}
