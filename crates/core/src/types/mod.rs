//! Core types for ToolKart.
//!
//! This module provides the canonical entity shapes shared by both storage
//! backends, plus the draft/patch input types the persistence facade accepts.

pub mod category;
pub mod dashboard;
pub mod id;
pub mod order;
pub mod product;
pub mod user;

pub use category::{Category, CategoryDraft, CategoryPatch};
pub use dashboard::{
    CatalogFilters, CategorySummary, CustomerInfo, DashboardAnalytics, DashboardSnapshot,
    DashboardSummary, Granularity, OrderSummary, ProductSummary, SalesPoint,
};
pub use id::*;
pub use order::{Order, OrderDraft, OrderItem, OrderItemDraft, OrderStatus};
pub use product::{
    PageRequest, Pagination, Product, ProductDraft, ProductFilter, ProductPage, ProductPatch,
    SortOrder,
};
pub use user::{Role, User};

use thiserror::Error;

/// Validation failures for draft inputs, shared by both backends.
///
/// These are always caller-fixable; the persistence facade maps them to its
/// `Validation` error variant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    /// Neither a usable name nor a usable slug was supplied.
    #[error("name or slug is required")]
    MissingIdentifier,

    /// Product name is missing or blank.
    #[error("name is required")]
    MissingName,

    /// Price is absent, non-finite, or negative.
    #[error("price must be zero or greater")]
    InvalidPrice,

    /// Stock is negative or non-finite.
    #[error("stock must be zero or greater")]
    InvalidStock,

    /// No category reference (id, slug, or name) was supplied for a product.
    #[error("category is required")]
    MissingCategory,

    /// An order was submitted without items.
    #[error("order items are required")]
    EmptyOrder,
}
