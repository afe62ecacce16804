//! Builder pattern for Worker construction

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::response::RequestOutcome;
use crate::traits::{RequestIssuer, Sampler};

use super::executor::Worker;

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};

/// Builder for creating Worker instances
///
/// Every component is required; `build` names the first one missing.
pub struct WorkerBuilder {
    id: usize,
    issuer: Option<Arc<dyn RequestIssuer>>,
    sampler: Option<Arc<dyn Sampler>>,
    outcome_tx: Option<mpsc::Sender<RequestOutcome>>,
    semaphore: Option<Arc<Semaphore>>,
    config: Option<Arc<BenchmarkConfig>>,
    work_counter: Option<Arc<AtomicUsize>>,
}

impl WorkerBuilder {
    /// Create a new builder with the given worker ID
    pub fn new(id: usize) -> Self {
        Self {
            id,
            issuer: None,
            sampler: None,
            outcome_tx: None,
            semaphore: None,
            config: None,
            work_counter: None,
        }
    }

    /// Set the request issuer
    pub fn issuer(mut self, issuer: Arc<dyn RequestIssuer>) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Set the sampler
    pub fn sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the outcome channel sender
    pub fn outcome_tx(mut self, tx: mpsc::Sender<RequestOutcome>) -> Self {
        self.outcome_tx = Some(tx);
        self
    }

    /// Set the concurrency semaphore
    pub fn semaphore(mut self, semaphore: Arc<Semaphore>) -> Self {
        self.semaphore = Some(semaphore);
        self
    }

    /// Set the run configuration
    pub fn config(mut self, config: Arc<BenchmarkConfig>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the shared work item counter
    pub fn work_counter(mut self, counter: Arc<AtomicUsize>) -> Self {
        self.work_counter = Some(counter);
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if any required field is missing.
    pub fn build(self) -> BenchResult<Worker> {
        let issuer = self.issuer.ok_or(BenchError::missing_config("issuer"))?;
        let sampler = self.sampler.ok_or(BenchError::missing_config("sampler"))?;
        let outcome_tx = self
            .outcome_tx
            .ok_or(BenchError::missing_config("outcome_tx"))?;
        let semaphore = self
            .semaphore
            .ok_or(BenchError::missing_config("semaphore"))?;
        let config = self.config.ok_or(BenchError::missing_config("config"))?;
        let work_counter = self
            .work_counter
            .ok_or(BenchError::missing_config("work_counter"))?;

        Ok(Worker::new(
            self.id,
            issuer,
            sampler,
            outcome_tx,
            semaphore,
            config,
            work_counter,
        ))
    }
}
