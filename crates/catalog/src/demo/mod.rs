//! In-process demo store: the ephemeral fallback backend.
//!
//! A complete, referentially-aware substitute for the durable store, seeded
//! from fixtures and owned for the process lifetime. All operations are
//! synchronous and non-suspending, so mutation is atomic with respect to
//! other in-process operations; the facade wraps the store in a lock only
//! because it is shared across async tasks.
//!
//! Derived category statistics are maintained on the write path: product
//! mutations end with [`DemoStore::recompute_stats`], a full
//! O(categories x products) pass, while category writes refresh just their
//! own record. Fine at demo scale; not meant for more than a few thousand
//! rows.

mod fixtures;

use chrono::{DateTime, Duration, Utc};

use toolkart_core::slug::{humanize, slugify};
use toolkart_core::{
    CatalogFilters, Category, CategoryDraft, CategoryId, CategoryPatch, CategorySummary,
    CustomerInfo, DashboardAnalytics, DashboardSnapshot, DashboardSummary, Granularity, Order,
    OrderDraft, OrderId, OrderSummary, PageRequest, Pagination, Product, ProductDraft,
    ProductFilter, ProductId, ProductPage, ProductPatch, ProductSummary, SortOrder, User, UserId,
};

use crate::LOW_STOCK_THRESHOLD;
use crate::analytics::bucket_orders;
use crate::error::StoreError;

/// Name and slug of the sentinel category that adopts products when their
/// category is removed.
const GENERAL_NAME: &str = "General";
const GENERAL_SLUG: &str = "general";

/// The in-process collection set. Exclusively owns its records; every
/// operation returns owned copies so callers can never alias store state.
pub struct DemoStore {
    categories: Vec<Category>,
    products: Vec<Product>,
    users: Vec<User>,
    orders: Vec<Order>,
    category_seq: u32,
    product_seq: u32,
    order_seq: u32,
}

impl Default for DemoStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl DemoStore {
    /// An empty store with no fixtures. Mostly useful in tests.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            categories: Vec::new(),
            products: Vec::new(),
            users: Vec::new(),
            orders: Vec::new(),
            category_seq: 0,
            product_seq: 0,
            order_seq: 0,
        }
    }

    /// A store seeded with the ToolKart demo fixtures.
    #[must_use]
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        fixtures::populate(&mut store);
        store.recompute_stats();
        store
    }

    fn next_category_id(&mut self) -> CategoryId {
        self.category_seq += 1;
        CategoryId::new(format!("demo-category-{}", self.category_seq))
    }

    fn next_product_id(&mut self) -> ProductId {
        self.product_seq += 1;
        ProductId::new(format!("demo-product-{}", self.product_seq))
    }

    fn next_order_id(&mut self) -> OrderId {
        self.order_seq += 1;
        OrderId::new(format!("demo-order-{}", self.order_seq))
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// Categories sorted by name, with statistics current as of the last
    /// mutation.
    #[must_use]
    pub fn list_categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    /// Resolve or create a category by slug. An existing slug returns the
    /// existing record unchanged; this idempotency is deliberate so seeding
    /// and retried creates never error.
    ///
    /// # Errors
    ///
    /// `Validation` when neither name nor slug yields an identifier.
    pub fn add_category(&mut self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let (name, slug) = draft.identity()?;

        if let Some(existing) = self.categories.iter().find(|c| c.slug == slug) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let id = self.next_category_id();
        // Orphan products already carrying this slug count toward the new
        // record immediately.
        let (product_count, average_price, low_stock_count) =
            category_stats(&self.products, &slug);
        let category = Category {
            id,
            name,
            slug,
            description: draft.description.trim().to_owned(),
            icon: draft.icon.trim().to_owned(),
            image: draft.image.trim().to_owned(),
            is_active: draft.is_active.unwrap_or(true),
            product_count,
            average_price,
            low_stock_count,
            created_at: now,
            updated_at: now,
        };
        self.categories.push(category.clone());
        Ok(category)
    }

    /// Partially update a category. Blank strings are "no change".
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Conflict` when a slug change collides
    /// with another category.
    pub fn update_category(
        &mut self,
        id: &CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, StoreError> {
        if let Some(new_slug) = patch.slug_change()
            && self
                .categories
                .iter()
                .any(|c| c.slug == new_slug && c.id != *id)
        {
            return Err(StoreError::Conflict("category slug already in use".to_owned()));
        }

        let products = &self.products;
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == *id)
            .ok_or(StoreError::NotFound("category"))?;
        patch.apply_to(category);
        category.updated_at = Utc::now();

        // A slug change re-scopes the derived statistics; products never move.
        let (product_count, average_price, low_stock_count) =
            category_stats(products, &category.slug);
        category.product_count = product_count;
        category.average_price = average_price;
        category.low_stock_count = low_stock_count;
        Ok(category.clone())
    }

    /// Remove a category, detaching (never deleting) its products onto the
    /// sentinel `General` category so `category_slug` stays resolvable.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn remove_category(&mut self, id: &CategoryId) -> Result<(), StoreError> {
        let idx = self
            .categories
            .iter()
            .position(|c| c.id == *id)
            .ok_or(StoreError::NotFound("category"))?;
        let removed = self.categories.remove(idx);

        let has_dependents = self.products.iter().any(|p| {
            p.category_slug == removed.slug || p.category_id.as_ref() == Some(&removed.id)
        });
        if has_dependents {
            let general = self.ensure_general_category();
            let now = Utc::now();
            for product in &mut self.products {
                if product.category_slug == removed.slug
                    || product.category_id.as_ref() == Some(&removed.id)
                {
                    product.category_id = Some(general.0.clone());
                    product.category = general.1.clone();
                    product.category_slug = general.2.clone();
                    product.updated_at = now;
                }
            }
        }

        self.recompute_stats();
        Ok(())
    }

    fn ensure_general_category(&mut self) -> (CategoryId, String, String) {
        if let Some(existing) = self.categories.iter().find(|c| c.slug == GENERAL_SLUG) {
            return (
                existing.id.clone(),
                existing.name.clone(),
                existing.slug.clone(),
            );
        }
        let now = Utc::now();
        let id = self.next_category_id();
        self.categories.push(Category {
            id: id.clone(),
            name: GENERAL_NAME.to_owned(),
            slug: GENERAL_SLUG.to_owned(),
            description: "Uncategorized products".to_owned(),
            icon: String::new(),
            image: String::new(),
            is_active: true,
            product_count: 0,
            average_price: 0.0,
            low_stock_count: 0,
            created_at: now,
            updated_at: now,
        });
        (id, GENERAL_NAME.to_owned(), GENERAL_SLUG.to_owned())
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Fetch a product by id.
    #[must_use]
    pub fn get_product(&self, id: &ProductId) -> Option<Product> {
        self.products.iter().find(|p| p.id == *id).cloned()
    }

    /// Create a product, resolving its owning category by id, then slug,
    /// then display name, auto-creating one from the name when nothing
    /// resolves.
    ///
    /// # Errors
    ///
    /// `Validation` for missing name/price/category or negative numbers.
    pub fn add_product(&mut self, draft: &ProductDraft) -> Result<Product, StoreError> {
        draft.validate()?;

        let resolved = self
            .resolve_category(
                draft.category_id.as_ref(),
                draft.category_slug.as_deref(),
                draft.category.as_deref(),
            )
            .map(|c| (c.id.clone(), c.name.clone(), c.slug.clone()));

        let (category_id, category_name, category_slug) = match resolved {
            Some(triple) => triple,
            None => {
                let created = self.add_category(&CategoryDraft {
                    name: draft.category.clone(),
                    slug: draft.category_slug.clone(),
                    ..CategoryDraft::default()
                })?;
                (created.id, created.name, created.slug)
            }
        };

        let now = Utc::now();
        let id = self.next_product_id();
        let product = Product {
            id,
            name: draft.name.as_deref().unwrap_or_default().trim().to_owned(),
            description: draft.description.clone(),
            price: draft.price.unwrap_or(0.0),
            stock: draft.stock_units(),
            category: category_name,
            category_id: Some(category_id),
            category_slug,
            brand: draft.brand.trim().to_owned(),
            rating: draft.rating.filter(|r| r.is_finite()).unwrap_or(0.0),
            reviews_count: 0,
            images: draft.image_list(),
            featured: draft.featured,
            tags: draft.tags.clone(),
            created_at: now,
            updated_at: now,
        };
        self.products.push(product.clone());
        self.recompute_stats();
        Ok(product)
    }

    /// Partially update a product. A category reference in the patch is
    /// resolved like on create; an unresolvable slug is tolerated as an
    /// orphan rather than rejected.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn update_product(
        &mut self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError> {
        let resolved = if patch.wants_category_change() {
            self.resolve_category(
                patch.category_id.as_ref(),
                patch.category_slug.as_deref(),
                patch.category.as_deref(),
            )
            .map(|c| (c.id.clone(), c.name.clone(), c.slug.clone()))
        } else {
            None
        };

        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == *id)
            .ok_or(StoreError::NotFound("product"))?;

        if let Some((category_id, category_name, category_slug)) = resolved {
            product.category_id = Some(category_id);
            product.category = category_name;
            product.category_slug = category_slug;
        } else if patch.wants_category_change() {
            // Unresolvable reference: keep the slug, humanized for display.
            let candidate = patch
                .category_slug
                .as_deref()
                .or(patch.category.as_deref())
                .map(slugify)
                .filter(|s| !s.is_empty());
            if let Some(slug) = candidate {
                product.category = humanize(&slug);
                product.category_slug = slug;
                product.category_id = None;
            }
        }

        patch.apply_to(product);
        product.updated_at = Utc::now();
        let updated = product.clone();
        self.recompute_stats();
        Ok(updated)
    }

    /// Remove a product and refresh its former category's statistics.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn remove_product(&mut self, id: &ProductId) -> Result<(), StoreError> {
        let idx = self
            .products
            .iter()
            .position(|p| p.id == *id)
            .ok_or(StoreError::NotFound("product"))?;
        self.products.remove(idx);
        self.recompute_stats();
        Ok(())
    }

    /// Filtered, sorted, paginated product listing.
    #[must_use]
    pub fn list_products(&self, filter: &ProductFilter, page: &PageRequest) -> ProductPage {
        let slug_filter = filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(|raw| {
                self.categories
                    .iter()
                    .find(|c| c.id.as_str() == raw || c.name.eq_ignore_ascii_case(raw))
                    .map_or_else(|| slugify(raw), |c| c.slug.clone())
            });
        let brands = filter.brands();
        let search = filter.search.as_deref().unwrap_or_default().to_lowercase();

        let mut matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| {
                let matches_category = slug_filter
                    .as_deref()
                    .is_none_or(|slug| p.category_slug == slug);
                let matches_brand = brands.is_empty() || brands.iter().any(|b| *b == p.brand);
                let matches_search = search.is_empty()
                    || p.name.to_lowercase().contains(&search)
                    || p.description.to_lowercase().contains(&search);
                let matches_featured = filter.featured.is_none_or(|f| p.featured == f);
                let matches_min = filter.min_price.is_none_or(|min| p.price >= min);
                let matches_max = filter.max_price.is_none_or(|max| p.price <= max);
                let matches_rating = filter.min_rating.is_none_or(|min| p.rating >= min);
                let matches_stock = !filter.in_stock_only || p.stock > 0;

                matches_category
                    && matches_brand
                    && matches_search
                    && matches_featured
                    && matches_min
                    && matches_max
                    && matches_rating
                    && matches_stock
            })
            .collect();

        sort_products(&mut matches, page);

        let total = matches.len() as u64;
        let start = usize::try_from(page.offset()).unwrap_or(usize::MAX);
        let data: Vec<Product> = matches
            .into_iter()
            .skip(start)
            .take(page.limit() as usize)
            .cloned()
            .collect();

        ProductPage {
            data,
            pagination: Pagination::for_total(total, page),
        }
    }

    /// Products flagged as featured.
    #[must_use]
    pub fn featured_products(&self, limit: usize) -> Vec<Product> {
        self.products
            .iter()
            .filter(|p| p.featured)
            .take(limit)
            .cloned()
            .collect()
    }

    /// Sidebar filter metadata: active categories plus distinct brands.
    #[must_use]
    pub fn catalog_filters(&self) -> CatalogFilters {
        let categories = self
            .list_categories()
            .into_iter()
            .filter(|c| c.is_active)
            .collect();
        let mut brands: Vec<String> = self
            .products
            .iter()
            .map(|p| p.brand.clone())
            .filter(|b| !b.is_empty())
            .collect();
        brands.sort();
        brands.dedup();
        CatalogFilters { categories, brands }
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Create an order for `user_id` from a normalized draft.
    ///
    /// # Errors
    ///
    /// `Validation` when the draft has no items.
    pub fn add_order(&mut self, user_id: &UserId, draft: &OrderDraft) -> Result<Order, StoreError> {
        let id = self.next_order_id();
        let order = draft.normalize(id, user_id.clone(), Utc::now())?;
        self.orders.push(order.clone());
        Ok(order)
    }

    /// Orders owned by `user_id`, newest first.
    #[must_use]
    pub fn orders_for_user(&self, user_id: &UserId) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| o.user_id == *user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }

    /// Fetch one order scoped to its owner. A wrong owner sees nothing, the
    /// same as a missing order.
    #[must_use]
    pub fn get_order(&self, user_id: &UserId, id: &OrderId) -> Option<Order> {
        self.orders
            .iter()
            .find(|o| o.id == *id && o.user_id == *user_id)
            .cloned()
    }

    /// Look up a user record (seeded fixture users only).
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.users.iter().find(|u| u.id == *id).cloned()
    }

    // =========================================================================
    // Aggregates
    // =========================================================================

    /// Overwrite every category's derived statistics with a fold over the
    /// current product set. Invoked after every mutation.
    pub fn recompute_stats(&mut self) {
        let products = &self.products;
        for category in &mut self.categories {
            let (product_count, average_price, low_stock_count) =
                category_stats(products, &category.slug);
            category.product_count = product_count;
            category.average_price = average_price;
            category.low_stock_count = low_stock_count;
        }
    }

    /// Assemble the full admin dashboard from in-memory collections.
    #[must_use]
    pub fn dashboard_snapshot(&self, now: DateTime<Utc>) -> DashboardSnapshot {
        let total_sales: f64 = self.orders.iter().map(|o| o.total).sum();
        let total_orders = self.orders.len() as u64;
        let average_order_value = if total_orders == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)] // order counts stay tiny
            let count = total_orders as f64;
            total_sales / count
        };

        let start_today = now.date_naive().and_hms_opt(0, 0, 0).map_or(now, |t| t.and_utc());
        let end_today = start_today + Duration::days(1);
        let orders_today = self
            .orders
            .iter()
            .filter(|o| o.created_at >= start_today && o.created_at < end_today)
            .count() as u64;
        let pending_orders = self
            .orders
            .iter()
            .filter(|o| o.status == toolkart_core::OrderStatus::Pending)
            .count() as u64;
        let stock_alerts = self
            .products
            .iter()
            .filter(|p| p.stock < LOW_STOCK_THRESHOLD)
            .count() as u64;

        let mut recent_orders: Vec<&Order> = self.orders.iter().collect();
        recent_orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let recent_orders: Vec<OrderSummary> = recent_orders
            .into_iter()
            .take(20)
            .map(|order| OrderSummary {
                id: order.id.clone(),
                customer: self.user(&order.user_id).map_or_else(CustomerInfo::guest, |u| {
                    CustomerInfo {
                        id: Some(u.id),
                        name: u.name,
                        email: u.email,
                    }
                }),
                total: order.total,
                status: order.status,
                created_at: order.created_at,
                items_count: order.items_count(),
                items: order.items.clone(),
            })
            .collect();

        let mut recent_products: Vec<&Product> = self.products.iter().collect();
        recent_products.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        let recent_products: Vec<ProductSummary> = recent_products
            .into_iter()
            .take(12)
            .map(|p| ProductSummary {
                id: p.id.clone(),
                name: p.name.clone(),
                price: p.price,
                stock: p.stock,
                category: p.category.clone(),
                category_slug: p.category_slug.clone(),
                featured: p.featured,
                updated_at: p.updated_at,
            })
            .collect();

        let mut category_summaries: Vec<CategorySummary> = self
            .list_categories()
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
        self.append_orphan_summaries(&mut category_summaries);

        DashboardSnapshot {
            summary: DashboardSummary {
                total_sales,
                total_orders,
                average_order_value,
                orders_today,
                pending_orders,
                stock_alerts,
            },
            analytics: DashboardAnalytics {
                weekly_sales: bucket_orders(&self.orders, Granularity::Weekly, 8),
                monthly_sales: bucket_orders(&self.orders, Granularity::Monthly, 6),
                quarterly_sales: bucket_orders(&self.orders, Granularity::Quarterly, 4),
            },
            recent_orders,
            recent_products,
            category_summaries,
        }
    }

    /// Products whose slug matches no category still count somewhere, so
    /// dashboard totals never silently drop volume.
    fn append_orphan_summaries(&self, summaries: &mut Vec<CategorySummary>) {
        for product in &self.products {
            let slug = &product.category_slug;
            if slug.is_empty() || summaries.iter().any(|s| s.slug == *slug) {
                continue;
            }
            let orphans: Vec<&Product> = self
                .products
                .iter()
                .filter(|p| p.category_slug == *slug)
                .collect();
            let count = orphans.len() as u32;
            summaries.push(CategorySummary {
                id: None,
                name: humanize(slug),
                slug: slug.clone(),
                product_count: count,
                average_price: orphans.iter().map(|p| p.price).sum::<f64>() / f64::from(count),
                low_stock_count: orphans
                    .iter()
                    .filter(|p| p.stock < LOW_STOCK_THRESHOLD)
                    .count() as u32,
            });
        }
    }

    fn resolve_category(
        &self,
        id: Option<&CategoryId>,
        slug: Option<&str>,
        name: Option<&str>,
    ) -> Option<&Category> {
        if let Some(id) = id
            && let Some(category) = self.categories.iter().find(|c| c.id == *id)
        {
            return Some(category);
        }
        if let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) {
            let canonical = slugify(slug);
            if let Some(category) = self.categories.iter().find(|c| c.slug == canonical) {
                return Some(category);
            }
        }
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            return self
                .categories
                .iter()
                .find(|c| c.name.eq_ignore_ascii_case(name));
        }
        None
    }
}

/// Fold of the product set for one category slug: count, mean price, and
/// low-stock count.
fn category_stats(products: &[Product], slug: &str) -> (u32, f64, u32) {
    let mut count: u32 = 0;
    let mut price_sum = 0.0_f64;
    let mut low_stock: u32 = 0;
    for product in products.iter().filter(|p| p.category_slug == slug) {
        count += 1;
        price_sum += product.price;
        if product.stock < LOW_STOCK_THRESHOLD {
            low_stock += 1;
        }
    }
    let average = if count == 0 {
        0.0
    } else {
        price_sum / f64::from(count)
    };
    (count, average, low_stock)
}

fn sort_products(products: &mut [&Product], page: &PageRequest) {
    products.sort_by(|a, b| {
        let ordering = match page.sort.as_str() {
            "price" => a.price.total_cmp(&b.price),
            "name" => a.name.cmp(&b.name),
            "rating" => a.rating.total_cmp(&b.rating),
            "stock" => a.stock.cmp(&b.stock),
            "updatedAt" => a.updated_at.cmp(&b.updated_at),
            _ => a.created_at.cmp(&b.created_at),
        };
        match page.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use toolkart_core::OrderItemDraft;

    fn power_tools_store() -> DemoStore {
        let mut store = DemoStore::empty();
        store
            .add_category(&CategoryDraft::named("Power Tools"))
            .unwrap();
        store
            .add_product(&ProductDraft {
                name: Some("Drill".to_owned()),
                price: Some(90.0),
                stock: Some(5.0),
                category_slug: Some("power-tools".to_owned()),
                ..ProductDraft::default()
            })
            .unwrap();
        store
            .add_product(&ProductDraft {
                name: Some("Saw".to_owned()),
                price: Some(350.0),
                stock: Some(2.0),
                category_slug: Some("power-tools".to_owned()),
                ..ProductDraft::default()
            })
            .unwrap();
        store
    }

    #[test]
    fn test_seeded_statistics_are_consistent() {
        let store = DemoStore::seeded();
        for category in store.list_categories() {
            let matching: Vec<&Product> = store
                .products
                .iter()
                .filter(|p| p.category_slug == category.slug)
                .collect();
            assert_eq!(category.product_count as usize, matching.len());
            if matching.is_empty() {
                assert!(category.average_price.abs() < f64::EPSILON);
            } else {
                let mean =
                    matching.iter().map(|p| p.price).sum::<f64>() / matching.len() as f64;
                assert!((category.average_price - mean).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_power_tools_scenario() {
        let store = power_tools_store();
        let categories = store.list_categories();
        let power_tools = categories.iter().find(|c| c.slug == "power-tools").unwrap();
        assert_eq!(power_tools.product_count, 2);
        assert!((power_tools.average_price - 220.0).abs() < 1e-9);
        assert_eq!(power_tools.low_stock_count, 2);
    }

    #[test]
    fn test_add_category_idempotent_on_slug() {
        let mut store = DemoStore::empty();
        let first = store.add_category(&CategoryDraft::named("Power Tools")).unwrap();
        let second = store
            .add_category(&CategoryDraft::named("POWER tools!"))
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(store.categories.len(), 1);
        // The existing record is returned unchanged.
        assert_eq!(second.name, "Power Tools");
    }

    #[test]
    fn test_add_product_resolves_by_priority() {
        let mut store = DemoStore::empty();
        let tools = store.add_category(&CategoryDraft::named("Power Tools")).unwrap();
        store.add_category(&CategoryDraft::named("Hand Tools")).unwrap();

        // id beats slug and name
        let product = store
            .add_product(&ProductDraft {
                name: Some("Drill".to_owned()),
                price: Some(10.0),
                category_id: Some(tools.id.clone()),
                category_slug: Some("hand-tools".to_owned()),
                category: Some("Hand Tools".to_owned()),
                ..ProductDraft::default()
            })
            .unwrap();
        assert_eq!(product.category_slug, "power-tools");
        assert_eq!(product.category_id, Some(tools.id));
    }

    #[test]
    fn test_add_product_autocreates_category() {
        let mut store = DemoStore::empty();
        let product = store
            .add_product(&ProductDraft {
                name: Some("Laser Level".to_owned()),
                price: Some(59.0),
                category: Some("Measuring".to_owned()),
                ..ProductDraft::default()
            })
            .unwrap();
        assert_eq!(product.category_slug, "measuring");
        let categories = store.list_categories();
        let created = categories.iter().find(|c| c.slug == "measuring").unwrap();
        assert_eq!(created.product_count, 1);
    }

    #[test]
    fn test_update_product_moves_stats_between_categories() {
        let mut store = power_tools_store();
        store.add_category(&CategoryDraft::named("Hand Tools")).unwrap();
        let drill = store
            .products
            .iter()
            .find(|p| p.name == "Drill")
            .map(|p| p.id.clone())
            .unwrap();

        store
            .update_product(
                &drill,
                &ProductPatch {
                    category_slug: Some("hand-tools".to_owned()),
                    ..ProductPatch::default()
                },
            )
            .unwrap();

        let categories = store.list_categories();
        let power = categories.iter().find(|c| c.slug == "power-tools").unwrap();
        let hand = categories.iter().find(|c| c.slug == "hand-tools").unwrap();
        assert_eq!(power.product_count, 1);
        assert!((power.average_price - 350.0).abs() < 1e-9);
        assert_eq!(hand.product_count, 1);
        assert!((hand.average_price - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_product_blank_strings_are_no_change() {
        let mut store = power_tools_store();
        let drill = store.products.first().map(|p| p.id.clone()).unwrap();
        let updated = store
            .update_product(
                &drill,
                &ProductPatch {
                    name: Some(String::new()),
                    brand: Some("  ".to_owned()),
                    price: Some(95.0),
                    ..ProductPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.name, "Drill");
        assert!((updated.price - 95.0).abs() < 1e-9);
    }

    #[test]
    fn test_update_product_orphan_slug_tolerated() {
        let mut store = power_tools_store();
        let drill = store.products.first().map(|p| p.id.clone()).unwrap();
        let updated = store
            .update_product(
                &drill,
                &ProductPatch {
                    category_slug: Some("mystery-gear".to_owned()),
                    ..ProductPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.category_slug, "mystery-gear");
        assert_eq!(updated.category, "Mystery Gear");
        assert_eq!(updated.category_id, None);

        // Orphans still surface on the dashboard.
        let snapshot = store.dashboard_snapshot(Utc::now());
        let orphan = snapshot
            .category_summaries
            .iter()
            .find(|s| s.slug == "mystery-gear")
            .unwrap();
        assert_eq!(orphan.id, None);
        assert_eq!(orphan.product_count, 1);
    }

    #[test]
    fn test_add_category_adopts_existing_orphans() {
        let mut store = power_tools_store();
        let drill = store.products.first().map(|p| p.id.clone()).unwrap();
        store
            .update_product(
                &drill,
                &ProductPatch {
                    category_slug: Some("mystery-gear".to_owned()),
                    ..ProductPatch::default()
                },
            )
            .unwrap();

        // The returned record already carries the orphan's statistics.
        let created = store
            .add_category(&CategoryDraft::named("Mystery Gear"))
            .unwrap();
        assert_eq!(created.product_count, 1);
        assert!((created.average_price - 90.0).abs() < 1e-9);
        assert_eq!(created.low_stock_count, 1);
    }

    #[test]
    fn test_update_category_returns_stats_for_new_slug() {
        let mut store = power_tools_store();
        let id = store.categories.first().map(|c| c.id.clone()).unwrap();
        // Re-slugging onto a slug no product carries zeroes the statistics
        // in the returned record.
        let updated = store
            .update_category(
                &id,
                &CategoryPatch {
                    slug: Some("overstock".to_owned()),
                    ..CategoryPatch::default()
                },
            )
            .unwrap();
        assert_eq!(updated.slug, "overstock");
        assert_eq!(updated.product_count, 0);
        assert!(updated.average_price.abs() < f64::EPSILON);
    }

    #[test]
    fn test_remove_category_reassigns_to_general() {
        let mut store = power_tools_store();
        let id = store
            .categories
            .iter()
            .find(|c| c.slug == "power-tools")
            .map(|c| c.id.clone())
            .unwrap();
        store.remove_category(&id).unwrap();

        assert_eq!(store.products.len(), 2, "products are detached, not deleted");
        for product in &store.products {
            assert_eq!(product.category_slug, GENERAL_SLUG);
            assert_eq!(product.category, GENERAL_NAME);
        }
        let categories = store.list_categories();
        let general = categories.iter().find(|c| c.slug == GENERAL_SLUG).unwrap();
        assert_eq!(general.product_count, 2);
    }

    #[test]
    fn test_remove_product_refreshes_stats() {
        let mut store = power_tools_store();
        let saw = store
            .products
            .iter()
            .find(|p| p.name == "Saw")
            .map(|p| p.id.clone())
            .unwrap();
        store.remove_product(&saw).unwrap();

        let categories = store.list_categories();
        let power = categories.iter().find(|c| c.slug == "power-tools").unwrap();
        assert_eq!(power.product_count, 1);
        assert!((power.average_price - 90.0).abs() < 1e-9);
        assert_eq!(power.low_stock_count, 1);
    }

    #[test]
    fn test_update_category_slug_conflict() {
        let mut store = DemoStore::empty();
        store.add_category(&CategoryDraft::named("Power Tools")).unwrap();
        let hand = store.add_category(&CategoryDraft::named("Hand Tools")).unwrap();
        let err = store
            .update_category(
                &hand.id,
                &CategoryPatch {
                    slug: Some("power-tools".to_owned()),
                    ..CategoryPatch::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[test]
    fn test_list_products_filters() {
        let store = DemoStore::seeded();

        let by_category = store.list_products(
            &ProductFilter {
                category: Some("Power Tools".to_owned()),
                ..ProductFilter::default()
            },
            &PageRequest::default(),
        );
        assert_eq!(by_category.pagination.total, 3);

        let by_brand = store.list_products(
            &ProductFilter {
                brand: Some("Bosch,3M".to_owned()),
                ..ProductFilter::default()
            },
            &PageRequest::default(),
        );
        assert_eq!(by_brand.pagination.total, 3);

        let by_search = store.list_products(
            &ProductFilter {
                search: Some("grinder".to_owned()),
                ..ProductFilter::default()
            },
            &PageRequest::default(),
        );
        assert_eq!(by_search.pagination.total, 1);

        let priced = store.list_products(
            &ProductFilter {
                min_price: Some(20.0),
                max_price: Some(100.0),
                ..ProductFilter::default()
            },
            &PageRequest::default(),
        );
        assert_eq!(priced.pagination.total, 3);
    }

    #[test]
    fn test_list_products_pagination_and_sort() {
        let store = DemoStore::seeded();
        let page = store.list_products(
            &ProductFilter::default(),
            &PageRequest {
                page: 1,
                limit: 2,
                sort: "price".to_owned(),
                order: SortOrder::Asc,
            },
        );
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.pagination.total, 6);
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.data.first().map(|p| p.name.as_str()), Some("Safety Goggles"));
    }

    #[test]
    fn test_orders_scoped_to_user() {
        let mut store = DemoStore::seeded();
        let owner = UserId::new("demo-user-2");
        let order = store
            .add_order(
                &owner,
                &OrderDraft {
                    items: vec![OrderItemDraft {
                        price: Some(10.0),
                        quantity: Some(1.0),
                        ..OrderItemDraft::default()
                    }],
                    ..OrderDraft::default()
                },
            )
            .unwrap();

        assert!(store.get_order(&owner, &order.id).is_some());
        assert!(store.get_order(&UserId::new("demo-user-1"), &order.id).is_none());
        assert_eq!(store.orders_for_user(&owner).len(), 1);
    }

    #[test]
    fn test_catalog_filters() {
        let filters = DemoStore::seeded().catalog_filters();
        assert_eq!(filters.categories.len(), 3);
        assert_eq!(
            filters.brands,
            vec!["3M", "Bosch", "DeWalt", "Makita", "Milwaukee"]
        );
    }

    #[test]
    fn test_dashboard_summary_counts() {
        let store = DemoStore::seeded();
        let snapshot = store.dashboard_snapshot(Utc::now());
        assert_eq!(snapshot.summary.total_orders, 1);
        assert!((snapshot.summary.total_sales - 163.48).abs() < 1e-9);
        assert_eq!(snapshot.summary.orders_today, 1);
        assert_eq!(snapshot.summary.pending_orders, 0);
        // Contractor Saw (stock 7) is the only low-stock fixture.
        assert_eq!(snapshot.summary.stock_alerts, 1);
        assert_eq!(snapshot.recent_orders.len(), 1);
        assert_eq!(
            snapshot.recent_orders.first().map(|o| o.customer.name.as_str()),
            Some("Ava Martinez")
        );
        assert_eq!(snapshot.recent_products.len(), 6);
        assert_eq!(snapshot.category_summaries.len(), 3);
    }
}
