//! Product records, drafts, patches, and catalog query types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DraftError;
use super::category::non_blank;
use super::id::{CategoryId, ProductId};

/// Canonical product shape returned by both backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: u32,
    /// Display name of the owning category.
    pub category: String,
    /// Owning-category reference; absent for orphaned products.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Join key to the owning category. May be orphaned; readers humanize it.
    pub category_slug: String,
    pub brand: String,
    pub rating: f64,
    pub reviews_count: u32,
    /// Ordered; the first image is the primary one.
    pub images: Vec<String>,
    pub featured: bool,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    pub price: Option<f64>,
    /// Category display name; one of the three category references must be set.
    pub category: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_slug: Option<String>,
    #[serde(default)]
    pub brand: String,
    pub stock: Option<f64>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub images: Vec<String>,
    /// Single-image convenience alias; prepended to `images` when present.
    pub image: Option<String>,
    pub rating: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductDraft {
    /// Validate required fields and numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns the first applicable [`DraftError`]: missing name, missing or
    /// negative price, negative stock, or no category reference at all.
    pub fn validate(&self) -> Result<(), DraftError> {
        if non_blank(self.name.as_deref()).is_none() {
            return Err(DraftError::MissingName);
        }
        match self.price {
            Some(price) if price.is_finite() && price >= 0.0 => {}
            _ => return Err(DraftError::InvalidPrice),
        }
        if let Some(stock) = self.stock
            && !(stock.is_finite() && stock >= 0.0)
        {
            return Err(DraftError::InvalidStock);
        }
        if self.category_id.is_none()
            && non_blank(self.category.as_deref()).is_none()
            && non_blank(self.category_slug.as_deref()).is_none()
        {
            return Err(DraftError::MissingCategory);
        }
        Ok(())
    }

    /// Full image list with the `image` alias folded in at the front.
    #[must_use]
    pub fn image_list(&self) -> Vec<String> {
        let mut list: Vec<String> = self
            .images
            .iter()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .collect();
        if let Some(primary) = non_blank(self.image.as_deref()) {
            list.insert(0, primary);
        }
        list
    }

    /// Stock clamped to a non-negative integer (0 when absent).
    #[must_use]
    pub fn stock_units(&self) -> u32 {
        to_units(self.stock)
    }
}

/// Partial update for a product.
///
/// Same rule as [`super::CategoryPatch`]: `None` and blank strings mean
/// "no change". Category references are resolved by the owning store, not
/// applied blindly.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<f64>,
    pub brand: Option<String>,
    pub featured: Option<bool>,
    pub rating: Option<f64>,
    pub category: Option<String>,
    pub category_id: Option<CategoryId>,
    pub category_slug: Option<String>,
    pub images: Option<Vec<String>>,
    pub image: Option<String>,
}

impl ProductPatch {
    /// Whether the patch carries any category reference to resolve.
    #[must_use]
    pub fn wants_category_change(&self) -> bool {
        self.category_id.is_some()
            || non_blank(self.category.as_deref()).is_some()
            || non_blank(self.category_slug.as_deref()).is_some()
    }

    /// Replacement image list, if the patch supplies one.
    #[must_use]
    pub fn image_list(&self) -> Option<Vec<String>> {
        let mut list: Vec<String> = self
            .images
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .collect();
        if let Some(primary) = non_blank(self.image.as_deref()) {
            list.insert(0, primary);
        }
        if list.is_empty() { None } else { Some(list) }
    }

    /// Apply the non-category fields of this patch in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = non_blank(self.name.as_deref()) {
            product.name = name;
        }
        if let Some(description) = non_blank(self.description.as_deref()) {
            product.description = description;
        }
        if let Some(price) = self.price.filter(|p| p.is_finite() && *p >= 0.0) {
            product.price = price;
        }
        if let Some(stock) = self.stock.filter(|s| s.is_finite() && *s >= 0.0) {
            product.stock = to_units(Some(stock));
        }
        if let Some(brand) = non_blank(self.brand.as_deref()) {
            product.brand = brand;
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
        if let Some(rating) = self.rating.filter(|r| r.is_finite()) {
            product.rating = rating;
        }
        if let Some(images) = self.image_list() {
            product.images = images;
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped first
fn to_units(value: Option<f64>) -> u32 {
    value
        .filter(|v| v.is_finite())
        .map_or(0, |v| v.max(0.0).round() as u32)
}

/// Catalog filter accepted by the product list operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Category id, slug, or display name; resolved leniently.
    pub category: Option<String>,
    /// Single brand or comma-separated multi-value.
    pub brand: Option<String>,
    /// Case-insensitive substring match on name and description.
    pub search: Option<String>,
    pub featured: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub in_stock_only: bool,
}

impl ProductFilter {
    /// Parsed multi-value brand filter; empty when no brand filter applies.
    #[must_use]
    pub fn brands(&self) -> Vec<String> {
        self.brand
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

/// Sort direction for product listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Page selector for product listings. Page is 1-based; limit is clamped
/// to 1..=100 with a default of 12.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub limit: u32,
    /// Sort field name; unknown fields fall back to creation time.
    #[serde(default)]
    pub sort: String,
    #[serde(default)]
    pub order: SortOrder,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 12,
            sort: String::new(),
            order: SortOrder::Desc,
        }
    }
}

impl PageRequest {
    /// Page clamped to at least 1.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.max(1)
    }

    /// Limit clamped to 1..=100, defaulting to 12.
    #[must_use]
    pub fn limit(&self) -> u32 {
        if self.limit == 0 { 12 } else { self.limit.clamp(1, 100) }
    }

    /// Zero-based offset of the first row on this page.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }
}

/// One page of products plus pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPage {
    pub data: Vec<Product>,
    pub pagination: Pagination,
}

/// Pagination metadata for list responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub pages: u32,
}

impl Pagination {
    /// Compute page metadata; an empty result still reports one page.
    #[must_use]
    pub fn for_total(total: u64, request: &PageRequest) -> Self {
        let limit = u64::from(request.limit());
        #[allow(clippy::cast_possible_truncation)] // pages bounded by total/limit
        let pages = (total.div_ceil(limit).max(1)) as u32;
        Self {
            total,
            page: request.page(),
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let mut draft = ProductDraft {
            name: Some("Cordless Drill".to_owned()),
            price: Some(89.99),
            category: Some("Power Tools".to_owned()),
            ..ProductDraft::default()
        };
        assert!(draft.validate().is_ok());

        draft.price = Some(-1.0);
        assert_eq!(draft.validate(), Err(DraftError::InvalidPrice));

        draft.price = Some(89.99);
        draft.category = None;
        assert_eq!(draft.validate(), Err(DraftError::MissingCategory));

        draft.category_slug = Some("power-tools".to_owned());
        assert!(draft.validate().is_ok());

        draft.name = Some("   ".to_owned());
        assert_eq!(draft.validate(), Err(DraftError::MissingName));
    }

    #[test]
    fn test_image_alias_is_primary() {
        let draft = ProductDraft {
            images: vec!["b.jpg".to_owned(), " ".to_owned()],
            image: Some("a.jpg".to_owned()),
            ..ProductDraft::default()
        };
        assert_eq!(draft.image_list(), vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_brand_multi_value() {
        let filter = ProductFilter {
            brand: Some("DeWalt, Makita,,Bosch ".to_owned()),
            ..ProductFilter::default()
        };
        assert_eq!(filter.brands(), vec!["DeWalt", "Makita", "Bosch"]);
        assert!(ProductFilter::default().brands().is_empty());
    }

    #[test]
    fn test_page_request_clamping() {
        let request = PageRequest {
            page: 0,
            limit: 500,
            ..PageRequest::default()
        };
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 100);
        assert_eq!(request.offset(), 0);
        assert_eq!(PageRequest::default().limit(), 12);
    }

    #[test]
    fn test_pagination_never_zero_pages() {
        let pagination = Pagination::for_total(0, &PageRequest::default());
        assert_eq!(pagination.pages, 1);
        let pagination = Pagination::for_total(25, &PageRequest::default());
        assert_eq!(pagination.pages, 3);
    }
}
