use thiserror::Error;

/// Application-wide error types for panoflag.
///
/// These are whole-run failures. A single panorama that cannot be resolved is
/// not an `AppError`; see [`crate::models::LookupFailure`].
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (non-success status, bad body).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Request timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// CSV export failed.
    #[error("CSV error: {0}")]
    CsvError(String),

    /// Filesystem operation failed.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid run configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The result sink could not accept the results.
    #[error("Sink error: {0}")]
    SinkError(String),
}

impl AppError {
    /// Returns true if this error is transient.
    ///
    /// Nothing in a run is retried automatically; this only feeds the
    /// diagnostics printed when a run aborts.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}
