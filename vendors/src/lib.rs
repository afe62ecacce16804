//! Request issuers for streaming inference endpoints
//!
//! This crate provides the [`RequestIssuer`](streambench_core::RequestIssuer)
//! implementation for OpenAI-compatible chat completion servers, plus the
//! Server-Sent Events parsing it relies on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod openai;
pub mod streaming;

pub use config::{normalize_base_url, ConfigValidationError, IssuerConfig};
pub use openai::OpenAiIssuer;
pub use streaming::{parse_chunk, sse_chunk_stream, Decoded, SseEvent, SseParser};
