//! Single-owner sink for request outcomes

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::response::RequestOutcome;

/// Accumulates outcomes received from workers
///
/// Exactly one collector exists per run; it is the only owner of outcomes
/// after they leave a worker.
#[derive(Debug, Default)]
pub struct OutcomeCollector {
    outcomes: Vec<RequestOutcome>,
    successes: usize,
}

impl OutcomeCollector {
    /// Create a collector expecting `expected` outcomes
    pub fn new(expected: usize) -> Self {
        Self {
            outcomes: Vec::with_capacity(expected),
            successes: 0,
        }
    }

    /// Record one outcome
    pub fn record(&mut self, outcome: RequestOutcome) {
        if outcome.is_success() {
            self.successes += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Outcomes recorded so far
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Successful outcomes recorded so far
    pub fn successes(&self) -> usize {
        self.successes
    }

    /// Take the recorded outcomes
    pub fn into_outcomes(self) -> Vec<RequestOutcome> {
        self.outcomes
    }

    /// Spawn the collector task; it finishes once every sender is dropped
    pub fn spawn(
        mut rx: mpsc::Receiver<RequestOutcome>,
        expected: usize,
    ) -> JoinHandle<OutcomeCollector> {
        tokio::spawn(async move {
            let mut collector = OutcomeCollector::new(expected);
            while let Some(outcome) = rx.recv().await {
                collector.record(outcome);
            }
            tracing::debug!(
                received = collector.len(),
                successes = collector.successes(),
                "Collector drained"
            );
            collector
        })
    }
}
