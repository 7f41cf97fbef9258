use thiserror::Error;

/// Errors surfaced by invoice operations.
///
/// Malformed input (bad numbers, missing optional fields) is never an error;
/// those fall back to defaults silently.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BillingError {
    /// A user-facing precondition was not met; the operation was aborted.
    #[error("{0}")]
    Precondition(String),

    /// The renderer received inputs that violate the aggregation contract.
    #[error("render error: {0}")]
    Render(String),

    /// Local storage could not be written.
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote store request failed.
    #[cfg(feature = "sync")]
    #[error(transparent)]
    Remote(#[from] crate::sync::SyncError),
}
