//! ToolKart Core - Shared types library.
//!
//! This crate provides common types used across all ToolKart components:
//! - `catalog` - Dual-backend persistence core (Postgres + in-process demo store)
//! - `integration-tests` - End-to-end tests against the demo backend
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no async. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Entity records, type-safe IDs, drafts and patches, dashboard shapes
//! - [`slug`] - Canonical slug derivation and humanization

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod slug;
pub mod types;

pub use types::*;
