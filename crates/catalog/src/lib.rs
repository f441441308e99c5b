//! ToolKart Catalog - Dual-backend persistence core.
//!
//! Catalog, category, and order data stays servable even when Postgres is
//! unreachable: every operation on [`service::CatalogService`] consults the
//! [`gate::DurabilityGate`] and is dispatched either to the durable Postgres
//! driver or to the seeded in-process [`demo::DemoStore`].
//!
//! Three operating modes, decided per call:
//!
//! - **durable** - `DATABASE_URL` is configured and the gate is connected
//! - **temporarily unavailable** - `DATABASE_URL` is configured but the store
//!   is unreachable; operations fail with `StoreError::Unavailable` instead
//!   of silently writing into memory
//! - **demo** - no `DATABASE_URL`; the in-process store is the intended
//!   steady state, not a degraded one
//!
//! # Modules
//!
//! - [`config`] - Environment-driven configuration
//! - [`error`] - The `StoreError` taxonomy all operations return
//! - [`gate`] - Connection state machine with single-flight connects
//! - [`demo`] - Seeded in-process fallback store
//! - [`durable`] - Postgres driver
//! - [`analytics`] - Weekly/monthly/quarterly revenue bucketing
//! - [`service`] - The public facade dispatching between backends

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod analytics;
pub mod config;
pub mod demo;
pub mod durable;
pub mod error;
pub mod gate;
pub mod service;

/// Stock level below which a product counts toward low-stock statistics.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

pub use config::CatalogConfig;
pub use error::StoreError;
pub use gate::{Durability, DurabilityGate};
pub use service::CatalogService;
