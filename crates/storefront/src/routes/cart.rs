//! Cart route handlers.
//!
//! JSON API over [`CartService`](crate::services::CartService). Every handler
//! acts on the cart of the user in `x-user-id`.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use tee_studio_core::{CartLineId, DesignId, ProductId, Variant};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::models::{CartLine, CartSummary};
use crate::services::CommerceError;
use crate::state::AppState;

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub design_id: DesignId,
    pub size: String,
    pub color: String,
    pub quantity: u32,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// Add a line to the cart, merging with an identical line.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    payload: std::result::Result<Json<AddToCartRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CartLine>)> {
    let Json(body) = payload?;

    let variant = Variant::new(&body.size, &body.color)
        .map_err(|e| CommerceError::invalid(e.to_string()))?;

    let line = state
        .carts()
        .add_line(user.id, body.product_id, body.design_id, variant, body.quantity)
        .await?;

    Ok((StatusCode::CREATED, Json(line)))
}

/// List the cart with current catalog data and totals.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartSummary>> {
    Ok(Json(state.carts().get_lines(user.id).await?))
}

/// Overwrite the quantity of a line.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    id: std::result::Result<Path<CartLineId>, PathRejection>,
    payload: std::result::Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> Result<Json<CartLine>> {
    let Path(id) = id?;
    let Json(body) = payload?;

    let line = state
        .carts()
        .update_quantity(user.id, id, body.quantity)
        .await?;

    Ok(Json(line))
}

/// Remove a line. Succeeds even if the line is already gone.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    id: std::result::Result<Path<CartLineId>, PathRejection>,
) -> Result<StatusCode> {
    let Path(id) = id?;
    state.carts().remove_line(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Empty the cart.
#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn clear(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode> {
    state.carts().clear_all(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
