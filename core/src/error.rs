//! Error types for streambench-core
//!
//! Two families live here:
//!
//! - [`ErrorKind`]: the per-request failure category recorded in outcomes and
//!   counted in the error histogram. Failures are never raised out of a run.
//! - [`BenchError`]: harness-level failures (bad configuration, a dispatch
//!   invariant broken) that abort the run itself.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Request failure classification
// ============================================================================

/// Category of a failed request
///
/// Variants are ordered so that histograms keyed by `ErrorKind` iterate in a
/// stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The per-request deadline elapsed before the stream finished
    Timeout,
    /// The endpoint rejected the request for rate limiting
    RateLimit,
    /// Credentials were missing or rejected
    AuthError,
    /// The connection could not be established or was dropped
    NetworkError,
    /// Unknown model or path
    NotFound,
    /// The endpoint rejected the request parameters
    InvalidParams,
    /// Any other failure reported by the endpoint
    ApiError,
}

impl ErrorKind {
    /// Every kind, in histogram order
    pub const ALL: [ErrorKind; 7] = [
        ErrorKind::Timeout,
        ErrorKind::RateLimit,
        ErrorKind::AuthError,
        ErrorKind::NetworkError,
        ErrorKind::NotFound,
        ErrorKind::InvalidParams,
        ErrorKind::ApiError,
    ];

    /// Stable snake_case label used in reports
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Timeout => "timeout",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::AuthError => "auth_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidParams => "invalid_params",
            ErrorKind::ApiError => "api_error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown error kind '{s}'"))
    }
}

/// Message fragments checked in order; the first matching rule wins.
///
/// Earlier rules take precedence, so a message mentioning both a timeout and a
/// connection problem classifies as a timeout.
const CLASSIFICATION_RULES: &[(ErrorKind, &[&str])] = &[
    (ErrorKind::Timeout, &["timed out", "timeout"]),
    (
        ErrorKind::RateLimit,
        &["rate_limit", "rate limit", "too many requests", "429"],
    ),
    (ErrorKind::AuthError, &["auth", "key", "unauthorized", "forbidden"]),
    (ErrorKind::NetworkError, &["connect", "network", "connection"]),
    (ErrorKind::NotFound, &["not found", "404"]),
    (ErrorKind::InvalidParams, &["invalid", "parameter"]),
];

/// Classify a free-form failure message
///
/// Used when the failure carries no structured status. Matching is
/// case-insensitive; anything unmatched is an [`ErrorKind::ApiError`].
pub fn classify_message(message: &str) -> ErrorKind {
    let lowered = message.to_lowercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(_, needles)| needles.iter().any(|needle| lowered.contains(needle)))
        .map(|(kind, _)| *kind)
        .unwrap_or(ErrorKind::ApiError)
}

/// Classify an HTTP status code, falling back to the body text
pub fn classify_status(status: u16, message: &str) -> ErrorKind {
    match status {
        408 | 504 => ErrorKind::Timeout,
        429 => ErrorKind::RateLimit,
        401 | 403 => ErrorKind::AuthError,
        404 => ErrorKind::NotFound,
        400 | 422 => ErrorKind::InvalidParams,
        _ => classify_message(message),
    }
}

// ============================================================================
// Harness errors
// ============================================================================

/// What part of the harness failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchErrorCategory {
    /// Invalid or incomplete configuration
    Config,
    /// Worker/collector coordination broke down
    Orchestration,
    /// The adaptive probe or sweep could not continue
    Probe,
}

impl fmt::Display for BenchErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BenchErrorCategory::Config => f.write_str("configuration error"),
            BenchErrorCategory::Orchestration => f.write_str("orchestration error"),
            BenchErrorCategory::Probe => f.write_str("probe error"),
        }
    }
}

/// Error that aborts a benchmark run
#[derive(Debug, Clone, thiserror::Error)]
#[error("{category}: {message}")]
pub struct BenchError {
    /// Failure category
    pub category: BenchErrorCategory,
    /// Human-readable detail
    pub message: String,
}

impl BenchError {
    /// Invalid configuration
    pub fn config(message: impl Into<String>) -> Self {
        Self {
            category: BenchErrorCategory::Config,
            message: message.into(),
        }
    }

    /// A builder was finished without a required component
    pub fn missing_config(field: &str) -> Self {
        Self::config(format!("missing required component: {field}"))
    }

    /// Dispatch invariant violated
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self {
            category: BenchErrorCategory::Orchestration,
            message: message.into(),
        }
    }

    /// Probe could not proceed
    pub fn probe(message: impl Into<String>) -> Self {
        Self {
            category: BenchErrorCategory::Probe,
            message: message.into(),
        }
    }
}

impl From<crate::config::ConfigError> for BenchError {
    fn from(err: crate::config::ConfigError) -> Self {
        BenchError::config(err.to_string())
    }
}

/// Result alias for harness operations
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_message_rules() {
        assert_eq!(classify_message("Request timed out"), ErrorKind::Timeout);
        assert_eq!(classify_message("read TIMEOUT"), ErrorKind::Timeout);
        assert_eq!(
            classify_message("rate_limit_exceeded for model"),
            ErrorKind::RateLimit
        );
        assert_eq!(classify_message("Too Many Requests"), ErrorKind::RateLimit);
        assert_eq!(classify_message("Invalid API key"), ErrorKind::AuthError);
        assert_eq!(classify_message("Unauthorized"), ErrorKind::AuthError);
        assert_eq!(
            classify_message("failed to connect to host"),
            ErrorKind::NetworkError
        );
        assert_eq!(classify_message("model not found"), ErrorKind::NotFound);
        assert_eq!(
            classify_message("unsupported parameter: foo"),
            ErrorKind::InvalidParams
        );
        assert_eq!(classify_message("internal server error"), ErrorKind::ApiError);
        assert_eq!(classify_message(""), ErrorKind::ApiError);
    }

    #[test]
    fn test_classify_message_precedence() {
        // timeout beats network, auth beats invalid
        assert_eq!(
            classify_message("connection timed out"),
            ErrorKind::Timeout
        );
        assert_eq!(classify_message("invalid api key"), ErrorKind::AuthError);
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(429, ""), ErrorKind::RateLimit);
        assert_eq!(classify_status(401, ""), ErrorKind::AuthError);
        assert_eq!(classify_status(403, ""), ErrorKind::AuthError);
        assert_eq!(classify_status(404, ""), ErrorKind::NotFound);
        assert_eq!(classify_status(400, ""), ErrorKind::InvalidParams);
        assert_eq!(classify_status(504, ""), ErrorKind::Timeout);
        assert_eq!(classify_status(500, "boom"), ErrorKind::ApiError);
        assert_eq!(
            classify_status(503, "upstream connection reset"),
            ErrorKind::NetworkError
        );
    }

    #[test]
    fn test_error_kind_labels_roundtrip() {
        for kind in ErrorKind::ALL {
            assert_eq!(kind.as_str().parse::<ErrorKind>().unwrap(), kind);
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
        assert!("bogus".parse::<ErrorKind>().is_err());
    }

    #[test]
    fn test_bench_error_display() {
        let err = BenchError::missing_config("issuer");
        assert_eq!(err.category, BenchErrorCategory::Config);
        assert!(err.to_string().contains("issuer"));

        let err = BenchError::orchestration("collector dropped");
        assert!(err.to_string().starts_with("orchestration error"));
    }
}
