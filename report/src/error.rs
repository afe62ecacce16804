//! Report errors

use thiserror::Error;

/// Errors from rendering or persisting results
#[derive(Debug, Error)]
pub enum ReportError {
    /// Writing or reading a result file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
