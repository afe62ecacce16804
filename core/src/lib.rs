//! streambench-core: measurement engine for streaming inference load tests
//!
//! This crate holds everything between "here is an issuer" and "here is a
//! result":
//!
//! - Run configuration and the request/outcome data model
//! - Core traits (RequestIssuer, Sampler)
//! - Stream consumption with first-token timing
//! - The bounded worker pool (Dispatcher) and its outcome collector
//! - Statistics aggregation into BenchmarkResult
//! - The adaptive concurrency probe and the fixed sweep

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod channel;
pub mod config;
pub mod error;
pub mod metrics;
pub mod orchestrator;
pub mod probe;
pub mod request;
pub mod response;
pub mod stream;
pub mod traits;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_support;

pub use channel::ChannelConfig;
pub use config::*;
pub use error::*;
pub use metrics::*;
pub use orchestrator::{DispatchRun, Dispatcher, DispatcherBuilder};
pub use probe::{
    AdaptiveProbe, AdaptiveProbeState, DispatchLevelRunner, LevelRunner, ProbeOutcome,
    ProbeReport, ProbeState, Sweep,
};
pub use request::*;
pub use response::*;
pub use stream::{StreamConsumer, StreamMeasurement};
pub use traits::*;
pub use worker::{Worker, WorkerBuilder, WorkerStats};
