//! Result fixtures

use std::time::Duration;

use streambench_core::{BenchmarkConfig, BenchmarkResult, ErrorKind, RequestOutcome, WorkItem};

/// A level where `successes` of `total` requests took `latency_secs` each
///
/// Wall-clock time is what `concurrency` parallel workers would need.
pub(crate) fn level(concurrency: usize, total: usize, successes: usize, latency_secs: f64) -> BenchmarkResult {
    let config = BenchmarkConfig::new(total, concurrency).with_max_output_tokens(100);
    let latency = Duration::from_secs_f64(latency_secs);
    let outcomes: Vec<RequestOutcome> = (0..total)
        .map(|i| {
            if i < successes {
                RequestOutcome::success(WorkItem(i), latency, Some(Duration::from_millis(50)), 10)
            } else {
                RequestOutcome::failure(WorkItem(i), ErrorKind::Timeout, latency, "timed out")
            }
        })
        .collect();
    let wall = Duration::from_secs_f64(total as f64 * latency_secs / concurrency as f64);
    BenchmarkResult::from_outcomes(&config, &outcomes, wall)
}

/// `n` sequential successes of `latency_secs` with a 100ms first token
pub(crate) fn sample_result(n: usize, latency_secs: f64) -> BenchmarkResult {
    let config = BenchmarkConfig::new(n, 1);
    let latency = Duration::from_secs_f64(latency_secs);
    let outcomes: Vec<RequestOutcome> = (0..n)
        .map(|i| RequestOutcome::success(WorkItem(i), latency, Some(Duration::from_millis(100)), 20))
        .collect();
    BenchmarkResult::from_outcomes(&config, &outcomes, latency * n as u32)
}

/// Two timeouts and nothing else
pub(crate) fn failed_result() -> BenchmarkResult {
    let config = BenchmarkConfig::new(2, 2);
    let outcomes: Vec<RequestOutcome> = (0..2)
        .map(|i| {
            RequestOutcome::failure(
                WorkItem(i),
                ErrorKind::Timeout,
                Duration::from_secs(30),
                "timed out after 30s",
            )
        })
        .collect();
    BenchmarkResult::from_outcomes(&config, &outcomes, Duration::from_secs(30))
}
