//! Dispatcher: bounded worker pool for one fixed-concurrency run
//!
//! The Dispatcher coordinates a single benchmark run:
//! - Spawning `concurrency` worker tasks that claim work items FCFS
//! - Bounding in-flight requests with a shared semaphore
//! - Funnelling every outcome through one channel into a collector task
//! - Verifying that each work item produced exactly one outcome
//!
//! # Example
//!
//! ```ignore
//! use streambench_core::{BenchmarkConfig, DispatcherBuilder};
//!
//! let dispatcher = DispatcherBuilder::new()
//!     .config(BenchmarkConfig::new(100, 10))
//!     .issuer(issuer)
//!     .sampler(sampler)
//!     .build()?;
//!
//! let result = dispatcher.run_and_summarize().await?;
//! ```

mod aggregator;
mod builder;
mod collector;
mod executor;

pub use aggregator::{aggregate_worker_stats, AggregatedStats};
pub use builder::DispatcherBuilder;
pub use collector::OutcomeCollector;
pub use executor::{DispatchRun, Dispatcher};

#[cfg(test)]
mod tests;
