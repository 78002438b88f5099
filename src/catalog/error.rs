use thiserror::Error;

/// Failure to produce the canonical track list. A single page failing fails
/// the whole load.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("could not reach the track backend: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("track backend returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not the expected list of records.
    #[error("malformed track data: {0}")]
    Decode(#[from] serde_json::Error),

    /// Error reported by the backend itself, e.g. an unknown column.
    #[error("{message}")]
    Backend { message: String },
}
