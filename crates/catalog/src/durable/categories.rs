//! Category repository for the durable store.
//!
//! Statistics are derived per read: every category row is joined against a
//! `GROUP BY category_slug` aggregate over products, so `product_count`,
//! `average_price`, and `low_stock_count` are always consistent with the
//! product table at query time.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use toolkart_core::{Category, CategoryDraft, CategoryId, CategoryPatch};

use super::{as_count32, as_db_int, new_id};
use crate::LOW_STOCK_THRESHOLD;
use crate::error::StoreError;

const CATEGORY_WITH_STATS: &str = r"
SELECT c.id, c.name, c.slug, c.description, c.icon, c.image, c.is_active,
       COALESCE(s.product_count, 0) AS product_count,
       COALESCE(s.average_price, 0) AS average_price,
       COALESCE(s.low_stock_count, 0) AS low_stock_count,
       c.created_at, c.updated_at
FROM category c
LEFT JOIN (
    SELECT category_slug,
           COUNT(*) AS product_count,
           AVG(price) AS average_price,
           COUNT(*) FILTER (WHERE stock < $1) AS low_stock_count
    FROM product
    GROUP BY category_slug
) s ON s.category_slug = c.slug
";

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: String,
    name: String,
    slug: String,
    description: String,
    icon: String,
    image: String,
    is_active: bool,
    product_count: i64,
    average_price: f64,
    low_stock_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            slug: row.slug,
            description: row.description,
            icon: row.icon,
            image: row.image,
            is_active: row.is_active,
            product_count: as_count32(row.product_count),
            average_price: row.average_price,
            low_stock_count: as_count32(row.low_stock_count),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for category operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All categories with current statistics, sorted by name.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn list(&self) -> Result<Vec<Category>, StoreError> {
        let sql = format!("{CATEGORY_WITH_STATS} ORDER BY c.name");
        let rows: Vec<CategoryRow> = sqlx::query_as(&sql)
            .bind(as_db_int(LOW_STOCK_THRESHOLD))
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One category with statistics.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] for an unknown id.
    pub async fn get(&self, id: &CategoryId) -> Result<Category, StoreError> {
        self.fetch_where("c.id = $2", id.as_str())
            .await?
            .ok_or(StoreError::NotFound("category"))
    }

    /// One category by slug, if present.
    ///
    /// # Errors
    ///
    /// Propagates query failures as [`StoreError`].
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        self.fetch_where("c.slug = $2", slug).await
    }

    /// Resolve-or-create by slug: an existing slug returns the existing
    /// record unchanged.
    ///
    /// # Errors
    ///
    /// `Validation` when the draft yields no identifier, `Conflict` when the
    /// display name collides with another category.
    pub async fn create(&self, draft: &CategoryDraft) -> Result<Category, StoreError> {
        let (name, slug) = draft.identity()?;

        if let Some(existing) = self.find_by_slug(&slug).await? {
            return Ok(existing);
        }

        let inserted = sqlx::query(
            "INSERT INTO category (id, name, slug, description, icon, image, is_active)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(new_id())
        .bind(&name)
        .bind(&slug)
        .bind(draft.description.trim())
        .bind(draft.icon.trim())
        .bind(draft.image.trim())
        .bind(draft.is_active.unwrap_or(true))
        .execute(self.pool)
        .await;

        match inserted {
            Ok(_) => {}
            // A concurrent insert winning the slug race is the same as
            // "already existed"; the re-read below picks it up.
            Err(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation()
                    && db_err.constraint() == Some("category_slug_key") => {}
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                return Err(StoreError::Conflict(
                    "category name already in use".to_owned(),
                ));
            }
            Err(err) => return Err(err.into()),
        }

        self.find_by_slug(&slug)
            .await?
            .ok_or(StoreError::NotFound("category"))
    }

    /// Partially update a category. Blank strings are "no change".
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `Conflict` when the new slug or name
    /// collides with another category.
    pub async fn update(
        &self,
        id: &CategoryId,
        patch: &CategoryPatch,
    ) -> Result<Category, StoreError> {
        let mut category = self.get(id).await?;
        patch.apply_to(&mut category);

        let updated = sqlx::query(
            "UPDATE category
             SET name = $2, slug = $3, description = $4, icon = $5, image = $6,
                 is_active = $7, updated_at = now()
             WHERE id = $1",
        )
        .bind(id.as_str())
        .bind(&category.name)
        .bind(&category.slug)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(&category.image)
        .bind(category.is_active)
        .execute(self.pool)
        .await;

        match updated {
            Ok(_) => self.get(id).await,
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                StoreError::Conflict("category slug or name already in use".to_owned()),
            ),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a category. Refused while products still reference it.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown id, `HasDependents` when products still
    /// belong to the category.
    pub async fn delete(&self, id: &CategoryId) -> Result<(), StoreError> {
        let slug: Option<(String,)> = sqlx::query_as("SELECT slug FROM category WHERE id = $1")
            .bind(id.as_str())
            .fetch_optional(self.pool)
            .await?;
        let (slug,) = slug.ok_or(StoreError::NotFound("category"))?;

        let (dependents,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM product WHERE category_id = $1 OR category_slug = $2",
        )
        .bind(id.as_str())
        .bind(&slug)
        .fetch_one(self.pool)
        .await?;

        if dependents > 0 {
            return Err(StoreError::HasDependents(format!(
                "category still has {dependents} products"
            )));
        }

        sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id.as_str())
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn fetch_where(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Category>, StoreError> {
        let sql = format!("{CATEGORY_WITH_STATS} WHERE {predicate}");
        let row: Option<CategoryRow> = sqlx::query_as(&sql)
            .bind(as_db_int(LOW_STOCK_THRESHOLD))
            .bind(value)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Into::into))
    }
}
