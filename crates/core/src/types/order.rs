//! Order records, line items, and the checkout draft normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DraftError;
use super::id::{OrderId, ProductId, UserId};

/// Order lifecycle status. Unknown input values fall back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Parse a status string leniently; anything unrecognized is `Pending`.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "paid" => Self::Paid,
            "shipped" => Self::Shipped,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Lowercase wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Shipped => "shipped",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// A normalized order line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<ProductId>,
    pub title: String,
    pub price: f64,
    pub quantity: u32,
}

/// Canonical order shape returned by both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Total number of units across all line items.
    #[must_use]
    pub fn items_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Raw line item as submitted by checkout callers.
///
/// Accepts the field aliases the storefront clients actually send:
/// `name` for `title` and `qty` for `quantity`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDraft {
    pub product_id: Option<ProductId>,
    #[serde(alias = "name")]
    pub title: Option<String>,
    pub price: Option<f64>,
    #[serde(alias = "qty")]
    pub quantity: Option<f64>,
}

impl OrderItemDraft {
    /// Coerce this draft into a normalized [`OrderItem`].
    ///
    /// Missing titles become `"Item"`, non-finite prices become 0, and the
    /// quantity is clamped to at least 1.
    #[must_use]
    pub fn normalize(&self) -> OrderItem {
        let title = self
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Item")
            .to_owned();
        let price = self.price.filter(|p| p.is_finite()).unwrap_or(0.0);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped first
        let quantity = self
            .quantity
            .filter(|q| q.is_finite() && *q >= 1.0)
            .map_or(1, |q| q.round() as u32);

        OrderItem {
            product_id: self.product_id.clone(),
            title,
            price,
            quantity,
        }
    }
}

/// Input for creating an order.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    #[serde(default)]
    pub items: Vec<OrderItemDraft>,
    #[serde(default)]
    pub shipping: f64,
    #[serde(default)]
    pub tax: f64,
    /// Caller-supplied override; computed from items when absent.
    pub subtotal: Option<f64>,
    /// Caller-supplied override; `subtotal + shipping + tax` when absent.
    pub total: Option<f64>,
    pub status: Option<String>,
}

impl OrderDraft {
    /// Normalize this draft into a full [`Order`] owned by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::EmptyOrder`] when there are no items.
    pub fn normalize(
        &self,
        id: OrderId,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Order, DraftError> {
        if self.items.is_empty() {
            return Err(DraftError::EmptyOrder);
        }

        let items: Vec<OrderItem> = self.items.iter().map(OrderItemDraft::normalize).collect();
        let shipping = finite_or_zero(self.shipping);
        let tax = finite_or_zero(self.tax);
        let subtotal = self
            .subtotal
            .filter(|v| v.is_finite())
            .unwrap_or_else(|| {
                items
                    .iter()
                    .map(|item| item.price * f64::from(item.quantity))
                    .sum()
            });
        let total = self
            .total
            .filter(|v| v.is_finite())
            .unwrap_or(subtotal + shipping + tax);
        let status = self
            .status
            .as_deref()
            .map_or(OrderStatus::Pending, OrderStatus::parse_lenient);

        Ok(Order {
            id,
            user_id,
            items,
            subtotal,
            shipping,
            tax,
            total,
            status,
            created_at: now,
            updated_at: now,
        })
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
