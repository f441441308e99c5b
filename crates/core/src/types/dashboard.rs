//! Admin dashboard output shapes and analytics series types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::Category;
use super::id::{CategoryId, OrderId, ProductId, UserId};
use super::order::{OrderItem, OrderStatus};

/// Time-bucketing granularity for sales series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Weekly,
    Monthly,
    Quarterly,
}

/// One point in a revenue series: a bucket label and its summed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesPoint {
    pub label: String,
    pub value: f64,
}

/// Headline sales metrics for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_sales: f64,
    pub total_orders: u64,
    pub average_order_value: f64,
    pub orders_today: u64,
    pub pending_orders: u64,
    /// Products with stock below the low-stock threshold.
    pub stock_alerts: u64,
}

/// Bucketed revenue series at the three dashboard granularities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub weekly_sales: Vec<SalesPoint>,
    pub monthly_sales: Vec<SalesPoint>,
    pub quarterly_sales: Vec<SalesPoint>,
}

/// Customer identity attached to an order summary. `Guest` when the owning
/// user record cannot be resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<UserId>,
    pub name: String,
    pub email: String,
}

impl CustomerInfo {
    /// Placeholder for orders whose user record is unknown.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            id: None,
            name: "Guest".to_owned(),
            email: String::new(),
        }
    }
}

/// Order as rendered in the dashboard's recent-orders table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: OrderId,
    pub customer: CustomerInfo,
    pub total: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items_count: u32,
    pub items: Vec<OrderItem>,
}

/// Product as rendered in the dashboard's recent-products table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub category: String,
    pub category_slug: String,
    pub featured: bool,
    pub updated_at: DateTime<Utc>,
}

/// Per-category derived statistics as rendered on the dashboard.
///
/// `id` is absent for synthetic entries surfaced from orphaned product
/// slugs; volume is still reported so dashboard totals never drop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    pub slug: String,
    pub product_count: u32,
    pub average_price: f64,
    pub low_stock_count: u32,
}

/// Complete admin dashboard payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub summary: DashboardSummary,
    pub analytics: DashboardAnalytics,
    pub recent_orders: Vec<OrderSummary>,
    pub recent_products: Vec<ProductSummary>,
    pub category_summaries: Vec<CategorySummary>,
}

/// Filter metadata for the storefront sidebar: active categories with
/// product counts plus the sorted distinct brand list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilters {
    pub categories: Vec<Category>,
    pub brands: Vec<String>,
}
