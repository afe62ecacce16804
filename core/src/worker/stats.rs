//! Worker statistics tracking

use tokio::time::Instant;

/// Counters tracked by each worker
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Number of successfully completed requests
    pub completed: usize,

    /// Number of failed requests
    pub errors: usize,

    /// Content units received on successful requests
    pub output_tokens: u64,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Record a successful request
    pub fn record_success(&mut self, output_tokens: u64) {
        self.completed += 1;
        self.output_tokens += output_tokens;
    }

    /// Record a failed request
    pub fn record_error(&mut self) {
        self.errors += 1;
    }

    /// Merge stats from another worker
    pub fn merge(&mut self, other: &WorkerStats) {
        self.completed += other.completed;
        self.errors += other.errors;
        self.output_tokens += other.output_tokens;
    }
}
