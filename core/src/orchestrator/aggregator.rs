//! Counter aggregation across workers

use crate::worker::WorkerStats;

/// Worker counters merged for the end-of-run log line
#[derive(Debug, Clone, Default)]
pub struct AggregatedStats {
    /// Number of workers that reported
    pub total_workers: usize,

    /// Total successful requests
    pub total_completed: usize,

    /// Total failed requests
    pub total_errors: usize,

    /// Total content units on successful requests
    pub total_output_tokens: u64,
}

/// Aggregate statistics from multiple workers
pub fn aggregate_worker_stats(stats: &[WorkerStats]) -> AggregatedStats {
    let mut merged = WorkerStats::new();
    for worker in stats {
        merged.merge(worker);
    }

    AggregatedStats {
        total_workers: stats.len(),
        total_completed: merged.completed,
        total_errors: merged.errors,
        total_output_tokens: merged.output_tokens,
    }
}
