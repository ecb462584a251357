//! Order reads and status updates.

use std::sync::Arc;

use tracing::{info, instrument};

use tee_studio_core::{OrderId, OrderSerial, OrderStatus, UserId};

use super::{CommerceError, Entity};
use crate::db::OrderRepository;
use crate::models::Order;

/// Order lookups, with and without an owner check.
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
}

impl OrderService {
    #[must_use]
    pub fn new(orders: Arc<dyn OrderRepository>) -> Self {
        Self { orders }
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn find_by_id(&self, id: OrderId) -> Result<Order, CommerceError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::Order, id))
    }

    /// Get an order with its items by serial.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no order has this serial.
    #[instrument(skip(self, serial), fields(serial = %serial))]
    pub async fn find_by_serial(&self, serial: &OrderSerial) -> Result<Order, CommerceError> {
        self.orders
            .find_by_serial(serial)
            .await?
            .ok_or_else(|| CommerceError::not_found(Entity::Order, serial))
    }

    /// All of the owner's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the query fails.
    #[instrument(skip(self))]
    pub async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, CommerceError> {
        Ok(self.orders.find_by_owner(owner).await?)
    }

    /// Overwrite an order's status. Any status may follow any other.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: OrderId, status: OrderStatus) -> Result<(), CommerceError> {
        if !self.orders.update_status(id, status).await? {
            return Err(CommerceError::not_found(Entity::Order, id));
        }
        info!(order_id = %id, status = %status, "order status updated");
        Ok(())
    }

    /// Get one of the owner's orders.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order does not exist
    /// - `AccessDenied` if it belongs to another user
    #[instrument(skip(self))]
    pub async fn get_order_by_id(&self, owner: UserId, id: OrderId) -> Result<Order, CommerceError> {
        let order = self.find_by_id(id).await?;
        ensure_owner(&order, owner)?;
        Ok(order)
    }

    /// Get one of the owner's orders by serial.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no order has this serial
    /// - `AccessDenied` if it belongs to another user
    #[instrument(skip(self, serial), fields(serial = %serial))]
    pub async fn get_order_by_serial(
        &self,
        owner: UserId,
        serial: &OrderSerial,
    ) -> Result<Order, CommerceError> {
        let order = self.find_by_serial(serial).await?;
        ensure_owner(&order, owner)?;
        Ok(order)
    }

    /// Overwrite the status of one of the owner's orders and return it.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the order does not exist
    /// - `AccessDenied` if it belongs to another user
    #[instrument(skip(self))]
    pub async fn update_status_for_owner(
        &self,
        owner: UserId,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, CommerceError> {
        let order = self.find_by_id(id).await?;
        ensure_owner(&order, owner)?;

        self.update_status(id, status).await?;
        self.find_by_id(id).await
    }
}

fn ensure_owner(order: &Order, owner: UserId) -> Result<(), CommerceError> {
    if order.owner_id == owner {
        Ok(())
    } else {
        Err(CommerceError::access_denied(Entity::Order, order.id))
    }
}
