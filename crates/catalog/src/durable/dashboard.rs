//! Dashboard assembly for the durable store.
//!
//! Headline metrics and revenue series come straight from SQL aggregates;
//! bucket labels are rendered in Rust with the same helpers the in-process
//! bucketer uses, so both backends produce identical series shapes.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use toolkart_core::{
    CategorySummary, CustomerInfo, DashboardAnalytics, DashboardSnapshot, DashboardSummary,
    Granularity, OrderStatus, ProductId, ProductSummary, SalesPoint,
};
use toolkart_core::slug::humanize;

use super::{CategoryRepository, OrderRepository, as_count, as_count32, as_count64, as_db_int};
use crate::LOW_STOCK_THRESHOLD;
use crate::analytics::{month_label, quarter_label, round2, week_label};
use crate::error::StoreError;

#[derive(Debug, sqlx::FromRow)]
struct ProductSummaryRow {
    id: String,
    name: String,
    price: f64,
    stock: i32,
    category: String,
    category_slug: String,
    featured: bool,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrphanGroupRow {
    category_slug: String,
    product_count: i64,
    average_price: f64,
    low_stock_count: i64,
}

/// Assembles the admin dashboard payload from the durable store.
pub struct DashboardRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DashboardRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Build the complete dashboard snapshot as of `now`.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn snapshot(&self, now: DateTime<Utc>) -> Result<DashboardSnapshot, StoreError> {
        let summary = self.summary(now).await?;
        let analytics = DashboardAnalytics {
            weekly_sales: self.sales_series(Granularity::Weekly, 8).await?,
            monthly_sales: self.sales_series(Granularity::Monthly, 6).await?,
            quarterly_sales: self.sales_series(Granularity::Quarterly, 4).await?,
        };
        let recent_orders = self.recent_orders().await?;
        let recent_products = self.recent_products().await?;
        let category_summaries = self.category_summaries().await?;

        Ok(DashboardSnapshot {
            summary,
            analytics,
            recent_orders,
            recent_products,
            category_summaries,
        })
    }

    async fn summary(&self, now: DateTime<Utc>) -> Result<DashboardSummary, StoreError> {
        let start_today = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map_or(now, |t| t.and_utc());
        let end_today = start_today + Duration::days(1);

        let (total_sales, total_orders, orders_today, pending_orders): (f64, i64, i64, i64) =
            sqlx::query_as(
                "SELECT COALESCE(SUM(total), 0) AS total_sales,
                        COUNT(*) AS total_orders,
                        COUNT(*) FILTER (WHERE created_at >= $1 AND created_at < $2)
                            AS orders_today,
                        COUNT(*) FILTER (WHERE status = $3) AS pending_orders
                 FROM store_order",
            )
            .bind(start_today)
            .bind(end_today)
            .bind(OrderStatus::Pending.as_str())
            .fetch_one(self.pool)
            .await?;

        let (stock_alerts,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product WHERE stock < $1")
                .bind(as_db_int(LOW_STOCK_THRESHOLD))
                .fetch_one(self.pool)
                .await?;

        #[allow(clippy::cast_precision_loss)] // order counts stay tiny
        let average_order_value = if total_orders == 0 {
            0.0
        } else {
            total_sales / total_orders as f64
        };

        Ok(DashboardSummary {
            total_sales,
            total_orders: as_count64(total_orders),
            average_order_value,
            orders_today: as_count64(orders_today),
            pending_orders: as_count64(pending_orders),
            stock_alerts: as_count64(stock_alerts),
        })
    }

    /// Revenue series at one granularity: the most recent `limit` buckets,
    /// ascending. The `DESC LIMIT` + reverse keeps the scan bounded.
    async fn sales_series(
        &self,
        granularity: Granularity,
        limit: u32,
    ) -> Result<Vec<SalesPoint>, StoreError> {
        let (year_expr, period_expr) = match granularity {
            Granularity::Weekly => ("EXTRACT(ISOYEAR FROM created_at)", "EXTRACT(WEEK FROM created_at)"),
            Granularity::Monthly => ("EXTRACT(YEAR FROM created_at)", "EXTRACT(MONTH FROM created_at)"),
            Granularity::Quarterly => {
                ("EXTRACT(YEAR FROM created_at)", "EXTRACT(QUARTER FROM created_at)")
            }
        };
        let sql = format!(
            "SELECT ({year_expr})::INT AS year, ({period_expr})::INT AS period,
                    COALESCE(SUM(total), 0) AS value
             FROM store_order
             GROUP BY 1, 2
             ORDER BY 1 DESC, 2 DESC
             LIMIT $1"
        );
        let mut rows: Vec<(i32, i32, f64)> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;
        rows.reverse();

        Ok(rows
            .into_iter()
            .map(|(year, period, value)| {
                let period = u32::try_from(period).unwrap_or(0);
                let label = match granularity {
                    Granularity::Weekly => week_label(year, period),
                    Granularity::Monthly => month_label(year, period),
                    Granularity::Quarterly => quarter_label(year, period),
                };
                SalesPoint {
                    label,
                    value: round2(value),
                }
            })
            .collect())
    }

    /// Latest 20 orders. There is no durable user directory (auth lives
    /// outside this crate), so customers render as guests carrying their
    /// user id.
    async fn recent_orders(&self) -> Result<Vec<toolkart_core::OrderSummary>, StoreError> {
        let orders = OrderRepository::new(self.pool).recent(20).await?;
        Ok(orders
            .into_iter()
            .map(|order| toolkart_core::OrderSummary {
                id: order.id.clone(),
                customer: CustomerInfo {
                    id: Some(order.user_id.clone()),
                    ..CustomerInfo::guest()
                },
                total: order.total,
                status: order.status,
                created_at: order.created_at,
                items_count: order.items_count(),
                items: order.items,
            })
            .collect())
    }

    async fn recent_products(&self) -> Result<Vec<ProductSummary>, StoreError> {
        let rows: Vec<ProductSummaryRow> = sqlx::query_as(
            "SELECT id, name, price, stock, category, category_slug, featured, updated_at
             FROM product
             ORDER BY updated_at DESC
             LIMIT 12",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| ProductSummary {
                id: ProductId::new(row.id),
                name: row.name,
                price: row.price,
                stock: as_count(row.stock),
                category: row.category,
                category_slug: row.category_slug,
                featured: row.featured,
                updated_at: row.updated_at,
            })
            .collect())
    }

    /// Real categories with statistics plus synthetic entries for orphaned
    /// product slugs, so no product volume disappears from the dashboard.
    async fn category_summaries(&self) -> Result<Vec<CategorySummary>, StoreError> {
        let mut summaries: Vec<CategorySummary> = CategoryRepository::new(self.pool)
            .list()
            .await?
            .into_iter()
            .map(|c| CategorySummary {
                id: Some(c.id),
                name: c.name,
                slug: c.slug,
                product_count: c.product_count,
                average_price: c.average_price,
                low_stock_count: c.low_stock_count,
            })
            .collect();

        let orphans: Vec<OrphanGroupRow> = sqlx::query_as(
            "SELECT p.category_slug,
                    COUNT(*) AS product_count,
                    COALESCE(AVG(p.price), 0) AS average_price,
                    COUNT(*) FILTER (WHERE p.stock < $1) AS low_stock_count
             FROM product p
             LEFT JOIN category c ON c.slug = p.category_slug
             WHERE c.id IS NULL AND p.category_slug <> ''
             GROUP BY p.category_slug
             ORDER BY p.category_slug",
        )
        .bind(as_db_int(LOW_STOCK_THRESHOLD))
        .fetch_all(self.pool)
        .await?;

        summaries.extend(orphans.into_iter().map(|row| CategorySummary {
            id: None,
            name: humanize(&row.category_slug),
            slug: row.category_slug,
            product_count: as_count32(row.product_count),
            average_price: row.average_price,
            low_stock_count: as_count32(row.low_stock_count),
        }));
        Ok(summaries)
    }
}
