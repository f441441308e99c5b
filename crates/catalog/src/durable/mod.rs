//! Postgres driver for the durable store.
//!
//! # Tables
//!
//! - `category` - categories; slug and lowercased name are unique
//! - `product` - products, joined to categories by `category_slug`
//! - `store_order` - orders with line items as JSONB
//!
//! Category statistics are derived at read time with a `GROUP BY` over
//! products; nothing stores them. Migrations live in
//! `crates/catalog/migrations/` and run with [`run_migrations`].
//!
//! Queries use the runtime sqlx API (not the compile-time macros) so the
//! crate builds without a reachable database.

pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;

use sqlx::PgPool;

pub use categories::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;

/// Apply all pending schema migrations.
///
/// # Errors
///
/// Returns the underlying migration failure.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Fresh primary key for an inserted row.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Clamp an unsigned count into the `INTEGER` range for binding.
pub(crate) fn as_db_int(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Widen a database integer back into an unsigned count.
pub(crate) fn as_count(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Narrow a `BIGINT` aggregate into an unsigned count.
pub(crate) fn as_count32(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

/// Widen a `BIGINT` aggregate back into an unsigned count.
pub(crate) fn as_count64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}
