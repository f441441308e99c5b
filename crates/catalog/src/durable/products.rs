//! Product repository for the durable store.
//!
//! The list operation builds its filter clause dynamically with
//! [`sqlx::QueryBuilder`]; the same clause feeds a `COUNT(*)` twin query for
//! pagination metadata.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use toolkart_core::slug::{humanize, slugify};
use toolkart_core::{
    CategoryId, PageRequest, Pagination, Product, ProductDraft, ProductFilter, ProductId,
    ProductPage, ProductPatch, SortOrder,
};

use super::{as_count, as_db_int, new_id};
use crate::error::StoreError;

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, category, category_id, \
     category_slug, brand, rating, reviews_count, images, featured, tags, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    description: String,
    price: f64,
    stock: i32,
    category: String,
    category_id: Option<String>,
    category_slug: String,
    brand: String,
    rating: f64,
    reviews_count: i32,
    images: Vec<String>,
    featured: bool,
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: as_count(row.stock),
            category: row.category,
            category_id: row.category_id.map(CategoryId::new),
            category_slug: row.category_slug,
            brand: row.brand,
            rating: row.rating,
            reviews_count: as_count(row.reviews_count),
            images: row.images,
            featured: row.featured,
            tags: row.tags,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A resolved owning-category reference.
struct CategoryRef {
    id: String,
    name: String,
    slug: String,
}

/// Repository for product operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// One product by id.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for an unknown id.
    pub async fn get(&self, id: &ProductId) -> Result<Product, StoreError> {
        self.find(id).await?.ok_or(StoreError::NotFound("product"))
    }

    async fn find(&self, id: &ProductId) -> Result<Option<Product>, StoreError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }

    /// Create a product. The owning category is resolved by id, then slug,
    /// then case-insensitive display name; an unresolvable reference is
    /// rejected rather than auto-created.
    ///
    /// # Errors
    ///
    /// `Validation` for a malformed draft or an unknown category.
    pub async fn create(&self, draft: &ProductDraft) -> Result<Product, StoreError> {
        draft.validate()?;

        let category = self
            .resolve_category(
                draft.category_id.as_ref(),
                draft.category_slug.as_deref(),
                draft.category.as_deref(),
            )
            .await?
            .ok_or_else(|| StoreError::Validation("category not found".to_owned()))?;

        let id = ProductId::new(new_id());
        let sql = format!(
            "INSERT INTO product
                 (id, name, description, price, stock, category, category_id, category_slug,
                  brand, rating, images, featured, tags)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(id.as_str())
            .bind(draft.name.as_deref().unwrap_or_default().trim())
            .bind(&draft.description)
            .bind(draft.price.unwrap_or(0.0))
            .bind(as_db_int(draft.stock_units()))
            .bind(&category.name)
            .bind(&category.id)
            .bind(&category.slug)
            .bind(draft.brand.trim())
            .bind(draft.rating.filter(|r| r.is_finite()).unwrap_or(0.0))
            .bind(draft.image_list())
            .bind(draft.featured)
            .bind(&draft.tags)
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// Partially update a product. A category reference is re-resolved like
    /// on create; an unresolvable slug is kept as an orphan rather than
    /// rejected.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, StoreError> {
        let mut product = self.get(id).await?;

        if patch.wants_category_change() {
            let resolved = self
                .resolve_category(
                    patch.category_id.as_ref(),
                    patch.category_slug.as_deref(),
                    patch.category.as_deref(),
                )
                .await?;
            if let Some(category) = resolved {
                product.category_id = Some(CategoryId::new(category.id));
                product.category = category.name;
                product.category_slug = category.slug;
            } else {
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
        }
        patch.apply_to(&mut product);

        let sql = format!(
            "UPDATE product
             SET name = $2, description = $3, price = $4, stock = $5, category = $6,
                 category_id = $7, category_slug = $8, brand = $9, rating = $10,
                 images = $11, featured = $12, updated_at = now()
             WHERE id = $1
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(id.as_str())
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(as_db_int(product.stock))
            .bind(&product.category)
            .bind(product.category_id.as_ref().map(CategoryId::as_str))
            .bind(&product.category_slug)
            .bind(&product.brand)
            .bind(product.rating)
            .bind(&product.images)
            .bind(product.featured)
            .fetch_one(self.pool)
            .await?;
        Ok(row.into())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub async fn delete(&self, id: &ProductId) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }

    /// Filtered, sorted, paginated product listing.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn list(
        &self,
        filter: &ProductFilter,
        page: &PageRequest,
    ) -> Result<ProductPage, StoreError> {
        let slug_filter = match filter
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
        {
            Some(raw) => Some(self.category_filter_slug(raw).await?),
            None => None,
        };

        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM product");
        apply_filters(&mut count_query, filter, slug_filter.as_deref());
        let (total,): (i64,) = count_query.build_query_as().fetch_one(self.pool).await?;

        let mut data_query =
            QueryBuilder::<Postgres>::new(format!("SELECT {PRODUCT_COLUMNS} FROM product"));
        apply_filters(&mut data_query, filter, slug_filter.as_deref());
        data_query.push(" ORDER BY ");
        data_query.push(sort_column(&page.sort));
        data_query.push(match page.order {
            SortOrder::Asc => " ASC",
            SortOrder::Desc => " DESC",
        });
        data_query.push(" LIMIT ");
        data_query.push_bind(i64::from(page.limit()));
        data_query.push(" OFFSET ");
        data_query.push_bind(i64::try_from(page.offset()).unwrap_or(i64::MAX));

        let rows: Vec<ProductRow> = data_query.build_query_as().fetch_all(self.pool).await?;

        Ok(ProductPage {
            data: rows.into_iter().map(Into::into).collect(),
            pagination: Pagination::for_total(u64::try_from(total).unwrap_or(0), page),
        })
    }

    /// Products flagged as featured, newest first.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn featured(&self, limit: u32) -> Result<Vec<Product>, StoreError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE featured ORDER BY created_at DESC LIMIT $1"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Distinct non-empty brands, sorted.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn brands(&self) -> Result<Vec<String>, StoreError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT brand FROM product WHERE brand <> '' ORDER BY brand",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows.into_iter().map(|(brand,)| brand).collect())
    }

    /// The canonical slug a lenient category filter value refers to. Unknown
    /// values are slugified as-is so they simply match nothing (or orphans).
    async fn category_filter_slug(&self, raw: &str) -> Result<String, StoreError> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT slug FROM category WHERE id = $1 OR lower(name) = lower($1) LIMIT 1",
        )
        .bind(raw)
        .fetch_optional(self.pool)
        .await?;
        Ok(row.map_or_else(|| slugify(raw), |(slug,)| slug))
    }

    async fn resolve_category(
        &self,
        id: Option<&CategoryId>,
        slug: Option<&str>,
        name: Option<&str>,
    ) -> Result<Option<CategoryRef>, StoreError> {
        if let Some(id) = id
            && let Some(found) = self.category_ref("id = $1", id.as_str()).await?
        {
            return Ok(Some(found));
        }
        if let Some(slug) = slug.map(str::trim).filter(|s| !s.is_empty()) {
            let canonical = slugify(slug);
            if let Some(found) = self.category_ref("slug = $1", &canonical).await? {
                return Ok(Some(found));
            }
        }
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            return self.category_ref("lower(name) = lower($1)", name).await;
        }
        Ok(None)
    }

    async fn category_ref(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<CategoryRef>, StoreError> {
        let sql = format!("SELECT id, name, slug FROM category WHERE {predicate}");
        let row: Option<(String, String, String)> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(|(id, name, slug)| CategoryRef { id, name, slug }))
    }
}

fn apply_filters(
    query: &mut QueryBuilder<'_, Postgres>,
    filter: &ProductFilter,
    category_slug: Option<&str>,
) {
    query.push(" WHERE TRUE");
    if let Some(slug) = category_slug {
        query.push(" AND category_slug = ");
        query.push_bind(slug.to_owned());
    }
    let brands = filter.brands();
    if !brands.is_empty() {
        query.push(" AND brand = ANY(");
        query.push_bind(brands);
        query.push(")");
    }
    if let Some(search) = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        let pattern = format!("%{search}%");
        query.push(" AND (name ILIKE ");
        query.push_bind(pattern.clone());
        query.push(" OR description ILIKE ");
        query.push_bind(pattern);
        query.push(")");
    }
    if let Some(featured) = filter.featured {
        query.push(" AND featured = ");
        query.push_bind(featured);
    }
    if let Some(min) = filter.min_price {
        query.push(" AND price >= ");
        query.push_bind(min);
    }
    if let Some(max) = filter.max_price {
        query.push(" AND price <= ");
        query.push_bind(max);
    }
    if let Some(min) = filter.min_rating {
        query.push(" AND rating >= ");
        query.push_bind(min);
    }
    if filter.in_stock_only {
        query.push(" AND stock > 0");
    }
}

/// Whitelisted sort columns; anything unrecognized falls back to creation
/// time so caller input never reaches the SQL text.
fn sort_column(sort: &str) -> &'static str {
    match sort {
        "price" => "price",
        "name" => "name",
        "rating" => "rating",
        "stock" => "stock",
        "updatedAt" => "updated_at",
        _ => "created_at",
    }
}
