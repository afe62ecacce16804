//! Core traits for request issuers and prompt samplers
//!
//! These traits are defined in core to avoid circular dependencies.
//! Implementations live in their respective crates (vendors/, samplers/).

use crate::error::{classify_message, classify_status, ErrorKind};
use crate::request::GenerationRequest;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;
use std::time::Duration;

// ============================================================================
// Request Issuer Trait
// ============================================================================

/// Boxed stream of chunks returned by [`RequestIssuer::open_stream`]
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamChunk, IssuerError>> + Send>>;

/// Opens streaming generation requests against an inference endpoint
///
/// Implementations own transport and authentication. Authentication is
/// resolved when the issuer is constructed, before any request is sent.
#[async_trait]
pub trait RequestIssuer: Send + Sync {
    /// Issuer identifier (e.g., "openai")
    fn issuer_name(&self) -> &str;

    /// Send the request and return its chunk stream
    async fn open_stream(&self, request: &GenerationRequest) -> Result<ChunkStream, IssuerError>;
}

/// One increment of a streaming response
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    /// Visible content
    pub content: Option<String>,

    /// Reasoning content emitted by reasoning models
    pub reasoning_content: Option<String>,

    /// Finish marker; present on the final chunk
    pub finish_reason: Option<String>,
}

impl StreamChunk {
    /// Chunk carrying visible content
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    /// Chunk carrying reasoning content
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning_content: Some(text.into()),
            ..Default::default()
        }
    }

    /// Metadata-only chunk with a finish marker
    pub fn finish(reason: impl Into<String>) -> Self {
        Self {
            finish_reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Attach a finish marker
    pub fn with_finish_reason(mut self, reason: impl Into<String>) -> Self {
        self.finish_reason = Some(reason.into());
        self
    }

    /// Whether the chunk carries non-empty content of either kind
    pub fn has_content(&self) -> bool {
        let non_empty = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.is_empty());
        non_empty(&self.content) || non_empty(&self.reasoning_content)
    }

    /// Whether this chunk ends the stream
    pub fn is_final(&self) -> bool {
        self.finish_reason.is_some()
    }
}

/// Issuer-side errors
#[derive(Debug, thiserror::Error)]
pub enum IssuerError {
    /// HTTP/network error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Endpoint answered with a non-success status
    #[error("API returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or reason
        message: String,
    },

    /// Credentials could not be applied
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The stream broke or carried an error payload
    #[error("Streaming error: {0}")]
    Streaming(String),

    /// Transport-level timeout reported by the issuer itself
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Issuer misconfiguration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl IssuerError {
    /// Convert to ErrorKind for outcome classification
    ///
    /// Structured variants map directly; free-form text goes through the
    /// message rule table.
    pub fn to_error_kind(&self) -> ErrorKind {
        match self {
            IssuerError::Http(err) => {
                if err.is_timeout() {
                    ErrorKind::Timeout
                } else if err.is_connect() {
                    ErrorKind::NetworkError
                } else if let Some(status) = err.status() {
                    classify_status(status.as_u16(), &error_chain(err))
                } else {
                    classify_message(&error_chain(err))
                }
            }
            IssuerError::Status { status, message } => classify_status(*status, message),
            IssuerError::Auth(_) => ErrorKind::AuthError,
            IssuerError::Timeout(_) => ErrorKind::Timeout,
            IssuerError::Streaming(message) | IssuerError::Config(message) => {
                classify_message(message)
            }
        }
    }
}

/// Error text including every source in the chain
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        source = inner.source();
    }
    text
}

// ============================================================================
// Sampler Trait
// ============================================================================

/// Supplies the prompt text for each request
pub trait Sampler: Send + Sync {
    /// Sampler name for identification
    fn name(&self) -> &str;

    /// Pick the prompt for the next request
    fn sample(&self) -> String;
}

/// Sampler construction errors
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// The corpus has no prompts
    #[error("Prompt corpus is empty")]
    EmptyCorpus,

    /// Invalid sampler configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error (e.g., reading a prompt file)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
