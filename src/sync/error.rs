use thiserror::Error;

/// Failure talking to the remote row store.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SyncError {
    /// URL or API key missing; the remote store is disabled.
    #[error("remote store is not configured")]
    NotConfigured,

    /// The request never produced a response.
    #[error("network error: {0}")]
    Network(String),

    /// The store answered with a non-success status.
    #[error("{message}")]
    Http { status: u16, message: String },

    /// The response body was not what the operation expects.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Environment configuration could not be read.
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}
