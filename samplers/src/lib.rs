//! Prompt corpora and samplers
//!
//! This crate provides the [`Sampler`](streambench_core::Sampler)
//! implementation used by the CLI:
//!
//! - Bundled short prompts
//! - Bundled long-context (context, question) pairs
//! - Prompt files with one prompt per line

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod corpus;
pub mod sampler;

pub use corpus::{ContextPair, LONG_CONTEXT_PAIRS, SHORT_PROMPTS};
pub use sampler::PromptSampler;
