//! Order repository and checkout transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};

use tee_studio_core::{
    CartLineId, Money, OrderId, OrderItemId, OrderSerial, OrderStatus, UserId, Variant,
};

use super::carts::{CART_LINE_COLUMNS, CartLineRow, db_quantity};
use super::{CheckoutStore, CheckoutTx, OrderRepository, RepositoryError, map_unique_violation};
use crate::models::{CartLine, NewOrder, Order, OrderItem};

const ORDER_COLUMNS: &str = "id, user_id, serial, total_amount, status, created_at, updated_at";

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_name, product_image_url, \
     design_image_url, size, color, unit_price, quantity";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    serial: OrderSerial,
    total_amount: Money,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        if items.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "order {} has no items",
                self.id
            )));
        }

        Ok(Order {
            id: self.id,
            owner_id: self.user_id,
            serial: self.serial,
            total_amount: self.total_amount,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            items,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_name: String,
    product_image_url: Option<String>,
    design_image_url: String,
    size: String,
    color: String,
    unit_price: Money,
    quantity: i32,
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(r: OrderItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(r.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "order item {} has invalid quantity {}",
                r.id, r.quantity
            ))
        })?;

        Ok(Self {
            id: r.id,
            order_id: r.order_id,
            product_name: r.product_name,
            product_image_url: r.product_image_url,
            design_image_url: r.design_image_url,
            variant: Variant::from_parts_unchecked(r.size, r.color),
            unit_price: r.unit_price,
            quantity,
        })
    }
}

/// Repository for order reads and status updates.
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the items of every header in one query and assemble the orders.
    async fn with_items(&self, headers: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = headers.iter().map(|h| h.id.as_i32()).collect();
        let rows: Vec<OrderItemRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) ORDER BY id"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = OrderItem::try_from(row)?;
            by_order.entry(item.order_id).or_default().push(item);
        }

        headers
            .into_iter()
            .map(|h| {
                let items = by_order.remove(&h.id).unwrap_or_default();
                h.into_order(items)
            })
            .collect()
    }

    async fn find_one(
        &self,
        header: Option<OrderRow>,
    ) -> Result<Option<Order>, RepositoryError> {
        match header {
            Some(h) => Ok(self.with_items(vec![h]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let header: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        self.find_one(header).await
    }

    async fn find_by_serial(
        &self,
        serial: &OrderSerial,
    ) -> Result<Option<Order>, RepositoryError> {
        let header: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE serial = $1"))
                .bind(serial)
                .fetch_optional(&self.pool)
                .await?;

        self.find_one(header).await
    }

    async fn find_by_owner(&self, owner: UserId) -> Result<Vec<Order>, RepositoryError> {
        let headers: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        self.with_items(headers).await
    }

    async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(status)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Opens `PostgreSQL` checkout transactions.
#[derive(Clone)]
pub struct PgCheckoutStore {
    pool: PgPool,
}

impl PgCheckoutStore {
    /// Create a new checkout store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckoutStore for PgCheckoutStore {
    async fn begin(&self) -> Result<Box<dyn CheckoutTx>, RepositoryError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgCheckoutTx { tx }))
    }
}

/// A checkout running inside one database transaction.
///
/// `sqlx` rolls the transaction back when it is dropped uncommitted.
pub struct PgCheckoutTx {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl CheckoutTx for PgCheckoutTx {
    async fn lock_lines(&mut self, ids: &[CartLineId]) -> Result<Vec<CartLine>, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(CartLineId::as_i32).collect();

        // Ordered by id so overlapping checkouts acquire row locks in the same order.
        let rows: Vec<CartLineRow> = sqlx::query_as(&format!(
            "SELECT {CART_LINE_COLUMNS} FROM cart_items WHERE id = ANY($1) ORDER BY id FOR UPDATE"
        ))
        .bind(&ids)
        .fetch_all(&mut *self.tx)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn insert_order(&mut self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let quantities = order
            .items()
            .iter()
            .map(|item| db_quantity(item.quantity))
            .collect::<Result<Vec<_>, _>>()?;

        let header: OrderRow = sqlx::query_as(&format!(
            r"
            INSERT INTO orders (user_id, serial, total_amount, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {ORDER_COLUMNS}
            "
        ))
        .bind(order.owner_id())
        .bind(order.serial())
        .bind(order.total_amount())
        .bind(order.status())
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| map_unique_violation(e, "order serial"))?;

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO order_items (order_id, product_name, product_image_url, \
             design_image_url, size, color, unit_price, quantity) ",
        );
        builder.push_values(
            order.items().iter().zip(quantities),
            |mut b, (item, quantity)| {
                b.push_bind(header.id)
                    .push_bind(&item.product_name)
                    .push_bind(item.product_image_url.as_deref())
                    .push_bind(&item.design_image_url)
                    .push_bind(item.variant.size())
                    .push_bind(item.variant.color())
                    .push_bind(item.unit_price)
                    .push_bind(quantity);
            },
        );
        builder.push(" RETURNING ");
        builder.push(ORDER_ITEM_COLUMNS);

        let rows: Vec<OrderItemRow> = builder
            .build_query_as()
            .fetch_all(&mut *self.tx)
            .await?;

        let items = rows
            .into_iter()
            .map(OrderItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        header.into_order(items)
    }

    async fn delete_lines(
        &mut self,
        owner: UserId,
        ids: &[CartLineId],
    ) -> Result<u64, RepositoryError> {
        let ids: Vec<i32> = ids.iter().map(CartLineId::as_i32).collect();

        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND id = ANY($2)")
            .bind(owner)
            .bind(&ids)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit(self: Box<Self>) -> Result<(), RepositoryError> {
        self.tx.commit().await?;
        Ok(())
    }
}
