//! Dispatcher execution logic

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;

use crate::channel::ChannelConfig;
use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::metrics::BenchmarkResult;
use crate::response::RequestOutcome;
use crate::traits::{RequestIssuer, Sampler};
use crate::worker::{WorkerBuilder, WorkerStats};

use super::aggregator::{aggregate_worker_stats, AggregatedStats};
use super::collector::OutcomeCollector;

/// Everything one dispatch run produced
#[derive(Debug, Clone)]
pub struct DispatchRun {
    /// One outcome per work item, in arrival order
    pub outcomes: Vec<RequestOutcome>,

    /// Wall-clock duration from first spawn to last worker exit
    pub elapsed: Duration,

    /// Per-worker counters merged
    pub worker_stats: AggregatedStats,
}

impl DispatchRun {
    /// Reduce the outcomes into a [`BenchmarkResult`]
    pub fn summarize(&self, config: &BenchmarkConfig) -> BenchmarkResult {
        BenchmarkResult::from_outcomes(config, &self.outcomes, self.elapsed)
    }
}

/// Dispatcher runs one fixed-concurrency benchmark
///
/// Reusable: each call to [`Dispatcher::run`] creates a fresh semaphore,
/// work counter and outcome channel.
pub struct Dispatcher {
    /// Run configuration
    pub(crate) config: BenchmarkConfig,

    /// Request issuer (shared across workers)
    pub(crate) issuer: Arc<dyn RequestIssuer>,

    /// Sampler (shared across workers)
    pub(crate) sampler: Arc<dyn Sampler>,

    /// Outcome channel sizing
    pub(crate) channel_config: ChannelConfig,
}

impl Dispatcher {
    /// Create a new dispatcher
    ///
    /// Use `DispatcherBuilder` for validated construction.
    pub fn new(
        config: BenchmarkConfig,
        issuer: Arc<dyn RequestIssuer>,
        sampler: Arc<dyn Sampler>,
        channel_config: ChannelConfig,
    ) -> Self {
        Self {
            config,
            issuer,
            sampler,
            channel_config,
        }
    }

    /// Get the run configuration
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run every work item and return the outcomes
    ///
    /// Returns only after each work item has produced exactly one outcome.
    ///
    /// # Errors
    /// Fails if a worker could not deliver an outcome, which would leave
    /// the run incomplete.
    pub async fn run(&self) -> BenchResult<DispatchRun> {
        let request_count = self.config.request_count;
        let concurrency = self.config.concurrency;

        tracing::info!(
            request_count,
            concurrency,
            model = %self.config.model,
            timeout_secs = self.config.request_timeout.as_secs_f64(),
            issuer = self.issuer.issuer_name(),
            "Starting benchmark run"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency));
        let work_counter = Arc::new(AtomicUsize::new(0));
        let shared_config = Arc::new(self.config.clone());
        let (outcome_tx, outcome_rx) = mpsc::channel(self.channel_config.outcome_buffer());
        let collector = OutcomeCollector::spawn(outcome_rx, request_count);

        let start = Instant::now();
        let mut handles = Vec::with_capacity(concurrency);
        for worker_id in 0..concurrency {
            let worker = WorkerBuilder::new(worker_id)
                .issuer(Arc::clone(&self.issuer))
                .sampler(Arc::clone(&self.sampler))
                .outcome_tx(outcome_tx.clone())
                .semaphore(Arc::clone(&semaphore))
                .config(Arc::clone(&shared_config))
                .work_counter(Arc::clone(&work_counter))
                .build()?;

            handles.push(tokio::spawn(worker.run()));
        }
        drop(outcome_tx);

        let mut results: Vec<WorkerStats> = Vec::with_capacity(handles.len());
        let mut worker_failures = 0;
        for (idx, handle) in handles.into_iter().enumerate() {
            match handle.await {
                Ok(Ok(stats)) => results.push(stats),
                Ok(Err(e)) => {
                    worker_failures += 1;
                    tracing::error!(worker_id = idx, error = %e, "Worker returned error");
                }
                Err(e) => {
                    worker_failures += 1;
                    tracing::error!(worker_id = idx, error = %e, "Worker task panicked");
                }
            }
        }
        let elapsed = start.elapsed();

        let outcomes = collector
            .await
            .map_err(|e| BenchError::orchestration(format!("collector task failed: {e}")))?
            .into_outcomes();

        if worker_failures > 0 || outcomes.len() != request_count {
            return Err(BenchError::orchestration(format!(
                "expected {} outcomes, collected {} ({} workers failed)",
                request_count,
                outcomes.len(),
                worker_failures
            )));
        }

        let worker_stats = aggregate_worker_stats(&results);
        tracing::info!(
            elapsed_secs = elapsed.as_secs_f64(),
            successes = worker_stats.total_completed,
            failures = worker_stats.total_errors,
            output_tokens = worker_stats.total_output_tokens,
            "Benchmark run completed"
        );

        Ok(DispatchRun {
            outcomes,
            elapsed,
            worker_stats,
        })
    }

    /// Run and reduce the outcomes into a [`BenchmarkResult`]
    pub async fn run_and_summarize(&self) -> BenchResult<BenchmarkResult> {
        let run = self.run().await?;
        Ok(run.summarize(&self.config))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("issuer", &self.issuer.issuer_name())
            .field("sampler", &self.sampler.name())
            .finish()
    }
}
