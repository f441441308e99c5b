//! Integration tests for the ToolKart catalog core.
//!
//! Everything in `tests/` runs fully in-process: the facade is exercised
//! against the seeded demo backend, and gate behavior is driven through a
//! fake connector, so no live `PostgreSQL` is needed.
//!
//! Tests that require a reachable database (the durable driver itself) run
//! against a database created from `crates/catalog/migrations/` and are
//! marked `#[ignore]`; run them with:
//!
//! ```bash
//! DATABASE_URL=postgres://localhost/toolkart_test cargo test -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
