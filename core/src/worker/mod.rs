//! Worker module for executing streaming requests
//!
//! A Worker is one tokio task in the dispatcher's fixed pool. Its loop is
//! **claim -> sample -> issue -> consume -> report -> repeat**:
//!
//! 1. Claim the next work item from the shared atomic counter
//! 2. Draw a prompt from the Sampler
//! 3. Open the stream via the RequestIssuer and drain it with the
//!    StreamConsumer, all under the per-request timeout
//! 4. Send exactly one RequestOutcome to the collector
//! 5. Repeat until every work item has been claimed
//!
//! Failures never escape the loop; they become outcomes. A worker only
//! returns an error when the collector has gone away.
//!
//! # Example
//!
//! ```ignore
//! use streambench_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(0)
//!     .issuer(issuer)
//!     .sampler(sampler)
//!     .outcome_tx(tx)
//!     .semaphore(semaphore)
//!     .config(config)
//!     .work_counter(counter)
//!     .build()?;
//!
//! let stats = worker.run().await?;
//! println!("Completed: {}", stats.completed);
//! ```

mod builder;
mod executor;
mod stats;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use stats::WorkerStats;
