//! The persistence facade: one public surface, two backends.
//!
//! Every operation consults the [`DurabilityGate`] and branches three ways:
//!
//! - `Ready` - dispatch to the durable Postgres repositories
//! - `Down` - fail with [`StoreError::Unavailable`]; a configured store
//!   that is unreachable must never silently write into memory
//! - `NotConfigured` - dispatch to the seeded [`DemoStore`], the intended
//!   steady state for demo deployments
//!
//! Durable failures of connection class additionally flip the gate back to
//! disconnected so the next request becomes a reconnect opportunity.

use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;

use toolkart_core::{
    CatalogFilters, Category, CategoryDraft, CategoryId, CategoryPatch, DashboardSnapshot, Order,
    OrderDraft, OrderId, PageRequest, Product, ProductDraft, ProductFilter, ProductId,
    ProductPage, ProductPatch, UserId,
};

use crate::config::CatalogConfig;
use crate::demo::DemoStore;
use crate::durable::{CategoryRepository, DashboardRepository, OrderRepository, ProductRepository};
use crate::error::{StoreError, is_connection_error};
use crate::gate::{Durability, DurabilityGate};

/// Facade over the durable and demo backends.
pub struct CatalogService {
    gate: DurabilityGate,
    demo: RwLock<DemoStore>,
}

impl CatalogService {
    /// Build a service from configuration; the demo store is seeded either
    /// way so a durable outage (or absence) always has a live fallback
    /// decision behind it.
    #[must_use]
    pub fn new(config: &CatalogConfig) -> Self {
        Self::with_gate(DurabilityGate::new(config))
    }

    /// Build a service over a pre-constructed gate (used by tests).
    #[must_use]
    pub fn with_gate(gate: DurabilityGate) -> Self {
        Self {
            gate,
            demo: RwLock::new(DemoStore::seeded()),
        }
    }

    /// Resolve the backend for this call. `Some(pool)` means durable,
    /// `None` means demo; a configured-but-down store is an error.
    async fn backend(&self) -> Result<Option<PgPool>, StoreError> {
        match self.gate.ensure_available().await {
            Durability::Ready(pool) => Ok(Some(pool)),
            Durability::Down => Err(StoreError::Unavailable),
            Durability::NotConfigured => Ok(None),
        }
    }

    /// Post-process a durable result: log unexpected failures and flip the
    /// gate when the connection itself is gone.
    async fn relay<T>(&self, result: Result<T, StoreError>) -> Result<T, StoreError> {
        if let Err(StoreError::Unexpected(err)) = &result {
            tracing::error!(%err, "durable store operation failed");
            if is_connection_error(err) {
                self.gate.mark_disconnected().await;
            }
        }
        result
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// All categories with current derived statistics, sorted by name.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the configured durable store is down.
    pub async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = CategoryRepository::new(&pool).list().await;
                self.relay(result).await
            }
            None => Ok(self.demo.read().await.list_categories()),
        }
    }

    /// Resolve-or-create a category by slug.
    ///
    /// # Errors
    ///
    /// `Validation`, `Conflict`, or `Unavailable`.
    pub async fn create_category(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = CategoryRepository::new(&pool).create(draft).await;
                self.relay(result).await
            }
            None => self.demo.write().await.add_category(draft),
        }
    }

    /// Partially update a category.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Conflict`, or `Unavailable`.
    pub async fn update_category(
        &self,
        id: &CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = CategoryRepository::new(&pool).update(id, patch).await;
                self.relay(result).await
            }
            None => self.demo.write().await.update_category(id, patch),
        }
    }

    /// Delete a category. Durable mode refuses while products reference it;
    /// demo mode detaches them onto the synthetic `General` category.
    ///
    /// # Errors
    ///
    /// `NotFound`, `HasDependents` (durable), or `Unavailable`.
    pub async fn delete_category(&self, id: &CategoryId) -> Result<(), StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = CategoryRepository::new(&pool).delete(id).await;
                self.relay(result).await
            }
            None => self.demo.write().await.remove_category(id),
        }
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Filtered, sorted, paginated product listing.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the configured durable store is down.
    pub async fn list_products(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<ProductPage, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = ProductRepository::new(&pool).list(filter, page).await;
                self.relay(result).await
            }
            None => Ok(self.demo.read().await.list_products(filter, page)),
        }
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Unavailable`.
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = ProductRepository::new(&pool).get(id).await;
                self.relay(result).await
            }
            None => self
                .demo
                .read()
                .await
                .get_product(id)
                .ok_or(StoreError::NotFound("product")),
        }
    }

    /// Create a product. Durable mode requires the category to exist; demo
    /// mode auto-creates one from the display name when nothing resolves.
    ///
    /// # Errors
    ///
    /// `Validation` or `Unavailable`.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = ProductRepository::new(&pool).create(draft).await;
                self.relay(result).await
            }
            None => self.demo.write().await.add_product(draft),
        }
    }

    /// Partially update a product.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Unavailable`.
    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = ProductRepository::new(&pool).update(id, patch).await;
                self.relay(result).await
            }
            None => self.demo.write().await.update_product(id, patch),
        }
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Unavailable`.
    pub async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = ProductRepository::new(&pool).delete(id).await;
                self.relay(result).await
            }
            None => self.demo.write().await.remove_product(id),
        }
    }

    /// Products flagged as featured.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the configured durable store is down.
    pub async fn list_featured(&self, limit: u32) -> Result<Vec<Product>, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = ProductRepository::new(&pool).featured(limit).await;
                self.relay(result).await
            }
            None => Ok(self.demo.read().await.featured_products(limit as usize)),
        }
    }

    /// Sidebar filter metadata: active categories plus distinct brands.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the configured durable store is down.
    pub async fn catalog_filters(&self) -> Result<CatalogFilters, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = self.durable_filters(&pool).await;
                self.relay(result).await
            }
            None => Ok(self.demo.read().await.catalog_filters()),
        }
    }

    async fn durable_filters(&self, pool: &PgPool) -> Result<CatalogFilters, StoreError> {
        let categories = CategoryRepository::new(pool)
            .list()
            .await?
            .into_iter()
            .filter(|c| c.is_active)
            .collect();
        let brands = ProductRepository::new(pool).brands().await?;
        Ok(CatalogFilters { categories, brands })
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order for `user_id` from a checkout draft.
    ///
    /// # Errors
    ///
    /// `Validation` or `Unavailable`.
    pub async fn create_order(
        &self,
        user_id: &UserId,
        draft: &OrderDraft,
    ) -> Result<Order, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = OrderRepository::new(&pool).create(user_id, draft).await;
                self.relay(result).await
            }
            None => self.demo.write().await.add_order(user_id, draft),
        }
    }

    /// Orders owned by `user_id`, newest first.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the configured durable store is down.
    pub async fn list_orders(&self, user_id: &UserId) -> Result<Vec<Order>, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = OrderRepository::new(&pool).list_for_user(user_id).await;
                self.relay(result).await
            }
            None => Ok(self.demo.read().await.orders_for_user(user_id)),
        }
    }

    /// One order scoped to its owner. Someone else's order is `NotFound`,
    /// never a permission error.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Unavailable`.
    pub async fn get_order(&self, user_id: &UserId, id: &OrderId) -> Result<Order, StoreError> {
        match self.backend().await? {
            Some(pool) => {
                let result = OrderRepository::new(&pool).get(user_id, id).await;
                self.relay(result).await
            }
            None => self
                .demo
                .read()
                .await
                .get_order(user_id, id)
                .ok_or(StoreError::NotFound("order")),
        }
    }

    // =========================================================================
    // Dashboard
    // =========================================================================

    /// The complete admin dashboard payload.
    ///
    /// # Errors
    ///
    /// `Unavailable` when the configured durable store is down.
    pub async fn dashboard_snapshot(&self) -> Result<DashboardSnapshot, StoreError> {
        let now = Utc::now();
        match self.backend().await? {
            Some(pool) => {
                let result = DashboardRepository::new(&pool).snapshot(now).await;
                self.relay(result).await
            }
            None => Ok(self.demo.read().await.dashboard_snapshot(now)),
        }
    }
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Arc;
    use std::time::Duration;

    use secrecy::SecretString;

    use crate::gate::Connect;

    /// Connector that always fails, simulating a configured-but-down store.
    struct DownConnect;

    impl Connect for DownConnect {
        fn connect(
            &self,
            _url: &SecretString,
            _timeout: Duration,
        ) -> Pin<Box<dyn Future<Output = Result<PgPool, sqlx::Error>> + Send + '_>> {
            Box::pin(async { Err(sqlx::Error::PoolTimedOut) })
        }
    }

    fn demo_service() -> CatalogService {
        CatalogService::with_gate(DurabilityGate::with_connector(
            None,
            Duration::from_secs(5),
            Arc::new(DownConnect),
        ))
    }

    fn down_service() -> CatalogService {
        CatalogService::with_gate(DurabilityGate::with_connector(
            Some(SecretString::from("postgres://localhost/toolkart")),
            Duration::from_secs(5),
            Arc::new(DownConnect),
        ))
    }

    #[tokio::test]
    async fn test_demo_mode_serves_reads_and_writes() {
        let service = demo_service();
        let categories = service.list_categories().await.expect("list");
        assert_eq!(categories.len(), 3);

        let created = service
            .create_category(&CategoryDraft::named("Fasteners"))
            .await
            .expect("create");
        assert_eq!(created.slug, "fasteners");

        let page = service
            .list_products(&ProductFilter::default(), &PageRequest::default())
            .await
            .expect("list products");
        assert_eq!(page.pagination.total, 6);
    }

    #[tokio::test]
    async fn test_down_store_rejects_instead_of_misdirecting() {
        let service = down_service();

        let err = service
            .create_category(&CategoryDraft::named("Fasteners"))
            .await
            .expect_err("write must not land in memory");
        assert!(matches!(err, StoreError::Unavailable));

        let err = service.list_categories().await.expect_err("read");
        assert!(matches!(err, StoreError::Unavailable));

        // The demo store stayed untouched behind the gate.
        assert_eq!(service.demo.read().await.list_categories().len(), 3);
    }

    #[tokio::test]
    async fn test_demo_order_flow() {
        use toolkart_core::OrderItemDraft;

        let service = demo_service();
        let user = UserId::new("demo-user-2");
        let order = service
            .create_order(
                &user,
                &OrderDraft {
                    items: vec![OrderItemDraft {
                        price: Some(25.0),
                        quantity: Some(1.0),
                        ..OrderItemDraft::default()
                    }],
                    ..OrderDraft::default()
                },
            )
            .await
            .expect("create order");

        let fetched = service.get_order(&user, &order.id).await.expect("get");
        assert_eq!(fetched.id, order.id);

        let err = service
            .get_order(&UserId::new("demo-user-1"), &order.id)
            .await
            .expect_err("cross-user access");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_demo_dashboard_snapshot() {
        let service = demo_service();
        let snapshot = service.dashboard_snapshot().await.expect("snapshot");
        assert_eq!(snapshot.summary.total_orders, 1);
        assert_eq!(snapshot.category_summaries.len(), 3);
        assert!(!snapshot.analytics.weekly_sales.is_empty());
    }
}
