//! User identity as consumed by the catalog core.
//!
//! The core never authenticates users; it only uses [`super::UserId`] for
//! order ownership and exposes name/email when rendering order summaries.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// User role. The catalog core never branches on this; it is carried for
/// the admin surface that consumes dashboard output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    Customer,
}

/// Opaque user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}
