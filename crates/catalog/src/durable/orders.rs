//! Order repository for the durable store.
//!
//! Line items are stored as a JSONB document; orders are immutable after
//! checkout, so there is no patch path.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use toolkart_core::{Order, OrderDraft, OrderId, OrderItem, OrderStatus, UserId};

use super::new_id;
use crate::error::StoreError;

const ORDER_COLUMNS: &str =
    "id, user_id, items, subtotal, shipping, tax, total, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    items: Json<Vec<OrderItem>>,
    subtotal: f64,
    shipping: f64,
    tax: f64,
    total: f64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: UserId::new(row.user_id),
            items: row.items.0,
            subtotal: row.subtotal,
            shipping: row.shipping,
            tax: row.tax,
            total: row.total,
            status: OrderStatus::parse_lenient(&row.status),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for order operations. Every read is scoped to the owning
/// user; someone else's order is indistinguishable from a missing one.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create an order for `user_id` from a normalized draft.
    ///
    /// # Errors
    ///
    /// `Validation` when the draft has no items.
    pub async fn create(
        &self,
        user_id: &UserId,
        draft: &OrderDraft,
    ) -> Result<Order, StoreError> {
        let order = draft.normalize(OrderId::new(new_id()), user_id.clone(), Utc::now())?;

        sqlx::query(
            "INSERT INTO store_order
                 (id, user_id, items, subtotal, shipping, tax, total, status,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(order.id.as_str())
        .bind(order.user_id.as_str())
        .bind(Json(&order.items))
        .bind(order.subtotal)
        .bind(order.shipping)
        .bind(order.tax)
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(self.pool)
        .await?;
        Ok(order)
    }

    /// Orders owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM store_order WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(user_id.as_str())
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Most recent orders across all users, for the admin dashboard.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn recent(&self, limit: u32) -> Result<Vec<Order>, StoreError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM store_order ORDER BY created_at DESC LIMIT $1"
        );
        let rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One order scoped to its owner.
    ///
    /// # Errors
    ///
    /// `NotFound` when the order is missing or owned by someone else.
    pub async fn get(&self, user_id: &UserId, id: &OrderId) -> Result<Order, StoreError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM store_order WHERE id = $1 AND user_id = $2");
        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .bind(user_id.as_str())
            .fetch_optional(self.pool)
            .await?;
        row.map(Into::into).ok_or(StoreError::NotFound("order"))
    }
}
