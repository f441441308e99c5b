//! The error taxonomy every catalog operation returns.
//!
//! The durability gate never surfaces connection failures as errors; it
//! collapses them to availability. Everything else propagates as a typed
//! [`StoreError`] for the transport layer to map onto responses.

use thiserror::Error;

use toolkart_core::DraftError;

/// Typed failure for catalog operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Malformed or missing caller input. Never retried.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The named entity does not exist (or is not visible to the caller).
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Unique constraint violation, e.g. a duplicate category slug.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Delete blocked because dependent records still reference the entity.
    #[error("{0}")]
    HasDependents(String),

    /// A durable store is configured but unreachable right now. Distinct
    /// from running demo-only by design.
    #[error("durable store temporarily unavailable")]
    Unavailable,

    /// Anything else. Logged with detail at the facade; opaque to callers.
    #[error("unexpected storage failure")]
    Unexpected(#[source] sqlx::Error),
}

impl From<DraftError> for StoreError {
    fn from(err: DraftError) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Self::NotFound("record"),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict("record already exists".to_owned())
            }
            _ => Self::Unexpected(err),
        }
    }
}

/// Whether a sqlx error indicates the connection itself is gone, as opposed
/// to a statement-level failure. The facade flips the durability gate back
/// to disconnected on these so the next request retries the connect.
#[must_use]
pub fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}
