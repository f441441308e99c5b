//! Category records and their draft/patch inputs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::DraftError;
use super::id::CategoryId;
use crate::slug::{humanize, slugify};

/// Canonical category shape returned by both backends.
///
/// `product_count`, `average_price`, and `low_stock_count` are derived: they
/// must always equal a fold over the current product set filtered by
/// `category_slug`, and are never accepted from callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Unique canonical identifier within a backend; the join key to products.
    pub slug: String,
    pub description: String,
    pub icon: String,
    pub image: String,
    pub is_active: bool,
    pub product_count: u32,
    pub average_price: f64,
    pub low_stock_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a category.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub image: String,
    pub is_active: Option<bool>,
}

impl CategoryDraft {
    /// Shorthand for the common name-only draft.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Resolve the display name and canonical slug for this draft.
    ///
    /// The name falls back to a humanized slug; the slug is derived from
    /// whichever of slug/name is present.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::MissingIdentifier`] when neither input yields a
    /// non-empty slug.
    pub fn identity(&self) -> Result<(String, String), DraftError> {
        let trimmed_name = self.name.as_deref().map(str::trim).unwrap_or_default();
        let name = if trimmed_name.is_empty() {
            humanize(&slugify(self.slug.as_deref().unwrap_or_default()))
        } else {
            trimmed_name.to_owned()
        };

        let slug = slugify(self.slug.as_deref().unwrap_or(""));
        let slug = if slug.is_empty() { slugify(&name) } else { slug };

        if slug.is_empty() {
            return Err(DraftError::MissingIdentifier);
        }
        Ok((name, slug))
    }
}

/// Partial update for a category.
///
/// `None` fields are left untouched. Empty or whitespace-only strings are
/// also treated as "no change", never as "clear this field"; callers that
/// want to clear a text field must go through a dedicated operation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

impl CategoryPatch {
    /// The canonical form of the requested slug change, if any.
    #[must_use]
    pub fn slug_change(&self) -> Option<String> {
        self.slug
            .as_deref()
            .map(slugify)
            .filter(|slug| !slug.is_empty())
    }

    /// Apply this patch to a category in place. Does not touch derived
    /// statistics or timestamps; the owning store is responsible for those.
    pub fn apply_to(&self, category: &mut Category) {
        if let Some(name) = non_blank(self.name.as_deref()) {
            category.name = name;
        }
        if let Some(slug) = self.slug_change() {
            category.slug = slug;
        }
        if let Some(description) = non_blank(self.description.as_deref()) {
            category.description = description;
        }
        if let Some(icon) = non_blank(self.icon.as_deref()) {
            category.icon = icon;
        }
        if let Some(image) = non_blank(self.image.as_deref()) {
            category.image = image;
        }
        if let Some(is_active) = self.is_active {
            category.is_active = is_active;
        }
    }
}

/// Returns a trimmed owned copy of `value` unless it is absent or blank.
pub(crate) fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}
