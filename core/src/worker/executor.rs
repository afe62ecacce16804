//! Worker execution loop

use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult, ErrorKind};
use crate::request::{GenerationRequest, WorkItem};
use crate::response::RequestOutcome;
use crate::stream::StreamConsumer;
use crate::traits::{RequestIssuer, Sampler};

use super::stats::WorkerStats;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::time::Instant;

/// Worker executes requests in a loop: claim -> issue -> consume -> report
///
/// Workers are tokio tasks managed by the Dispatcher. They share the issuer,
/// sampler, semaphore and work counter via Arc, and send outcomes through an
/// mpsc channel.
pub struct Worker {
    /// Unique worker identifier
    id: usize,

    /// Request issuer (shared across workers)
    issuer: Arc<dyn RequestIssuer>,

    /// Prompt sampler (shared across workers)
    sampler: Arc<dyn Sampler>,

    /// Channel sender for outcomes
    outcome_tx: mpsc::Sender<RequestOutcome>,

    /// Concurrency limiter (shared semaphore)
    semaphore: Arc<Semaphore>,

    /// Run configuration
    config: Arc<BenchmarkConfig>,

    /// Next unclaimed work item index
    work_counter: Arc<AtomicUsize>,

    consumer: StreamConsumer,
}

impl Worker {
    /// Create a new worker
    pub fn new(
        id: usize,
        issuer: Arc<dyn RequestIssuer>,
        sampler: Arc<dyn Sampler>,
        outcome_tx: mpsc::Sender<RequestOutcome>,
        semaphore: Arc<Semaphore>,
        config: Arc<BenchmarkConfig>,
        work_counter: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            id,
            issuer,
            sampler,
            outcome_tx,
            semaphore,
            config,
            work_counter,
            consumer: StreamConsumer::new(),
        }
    }

    /// Run the worker loop until no work item is left to claim
    ///
    /// # Errors
    /// Fails if the semaphore is closed or the collector dropped its receiver;
    /// either would lose an outcome.
    pub async fn run(self) -> BenchResult<WorkerStats> {
        let mut stats = WorkerStats::new();
        stats.start();

        tracing::debug!(worker_id = self.id, "Worker started");

        while let Some(item) = self.try_claim() {
            let outcome = self.execute_one(item).await?;

            if outcome.is_success() {
                stats.record_success(outcome.token_count);
            } else {
                stats.record_error();
            }

            if self.outcome_tx.send(outcome).await.is_err() {
                return Err(BenchError::orchestration(format!(
                    "outcome channel closed before worker {} reported {}",
                    self.id, item
                )));
            }
        }

        stats.stop();
        tracing::debug!(
            worker_id = self.id,
            completed = stats.completed,
            errors = stats.errors,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        Ok(stats)
    }

    /// Issue and consume one request under the per-request timeout
    ///
    /// The timeout covers opening the stream and draining it. Any failure,
    /// including a timeout, discards partial measurements.
    async fn execute_one(&self, item: WorkItem) -> BenchResult<RequestOutcome> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BenchError::orchestration("concurrency semaphore closed"))?;

        let request = GenerationRequest::new(
            item,
            self.config.model.as_str(),
            self.sampler.sample(),
            self.config.max_output_tokens,
        );

        let start = Instant::now();
        let attempt = async {
            match self.issuer.open_stream(&request).await {
                Ok(stream) => self.consumer.consume(stream).await,
                Err(e) => Err(e),
            }
        };
        let result = tokio::time::timeout(self.config.request_timeout, attempt).await;
        let elapsed = start.elapsed();

        let outcome = match result {
            Ok(Ok(measurement)) => {
                let ttft = measurement.ttft_since(start);
                tracing::debug!(
                    worker_id = self.id,
                    work_item = item.index(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    ttft_ms = ?ttft.map(|d| d.as_millis()),
                    tokens = measurement.content_units,
                    "Request completed"
                );
                RequestOutcome::success(item, elapsed, ttft, measurement.content_units)
            }
            Ok(Err(e)) => {
                let kind = e.to_error_kind();
                tracing::warn!(
                    worker_id = self.id,
                    work_item = item.index(),
                    kind = %kind,
                    error = %e,
                    "Request failed"
                );
                RequestOutcome::failure(item, kind, elapsed, e.to_string())
            }
            Err(_) => {
                let message = format!(
                    "request timed out after {:.1}s",
                    self.config.request_timeout.as_secs_f64()
                );
                tracing::warn!(
                    worker_id = self.id,
                    work_item = item.index(),
                    kind = %ErrorKind::Timeout,
                    "Request timed out"
                );
                RequestOutcome::failure(item, ErrorKind::Timeout, elapsed, message)
            }
        };

        Ok(outcome)
    }

    /// Claim the next work item from the shared counter
    ///
    /// Every index below the request count is handed out exactly once.
    fn try_claim(&self) -> Option<WorkItem> {
        let claimed = self.work_counter.fetch_add(1, Ordering::SeqCst);
        (claimed < self.config.request_count).then_some(WorkItem(claimed))
    }

    /// Get the worker ID
    pub fn id(&self) -> usize {
        self.id
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("id", &self.id)
            .field("issuer", &self.issuer.issuer_name())
            .field("sampler", &self.sampler.name())
            .field("concurrency", &self.config.concurrency)
            .field("request_count", &self.config.request_count)
            .finish()
    }
}
