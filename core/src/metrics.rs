//! Statistics aggregation and percentile calculation
//!
//! [`BenchmarkResult::from_outcomes`] reduces the outcomes of one dispatch run
//! into counts, rates, percentile sets and an error histogram. The reduction
//! is a pure function of its inputs: aggregating the same outcomes twice
//! yields identical results.

use crate::config::BenchmarkConfig;
use crate::error::ErrorKind;
use crate::response::RequestOutcome;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Average and tail percentiles over one metric
///
/// Every field is `None` when there were no samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PercentileSet {
    /// Arithmetic mean
    pub average: Option<f64>,
    /// Median
    pub p50: Option<f64>,
    /// 95th percentile
    pub p95: Option<f64>,
    /// 99th percentile
    pub p99: Option<f64>,
}

impl PercentileSet {
    /// Set with no samples
    pub fn empty() -> Self {
        Self::default()
    }

    /// Percentiles where larger values are worse (latency, TTFT)
    pub fn from_values(values: &[f64]) -> Self {
        Self::build(values, [50.0, 95.0, 99.0])
    }

    /// Percentiles where smaller values are worse (throughput)
    ///
    /// Reported `pX` is the (100 - X)th percentile, so `p99` is always the
    /// slow tail.
    pub fn from_values_inverted(values: &[f64]) -> Self {
        Self::build(values, [50.0, 5.0, 1.0])
    }

    fn build(values: &[f64], ranks: [f64; 3]) -> Self {
        if values.is_empty() {
            return Self::empty();
        }

        let mut sorted: Vec<f64> = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));
        let average = sorted.iter().sum::<f64>() / sorted.len() as f64;

        Self {
            average: Some(average),
            p50: percentile(&sorted, ranks[0]),
            p95: percentile(&sorted, ranks[1]),
            p99: percentile(&sorted, ranks[2]),
        }
    }

    /// Whether the set was built from zero samples
    pub fn is_empty(&self) -> bool {
        self.average.is_none()
    }
}

/// Percentile of sorted values using linear interpolation between closest ranks
///
/// `p` is in percent (0..=100); rank is `p / 100 * (n - 1)`.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    match sorted.len() {
        0 => None,
        1 => Some(sorted[0]),
        len => {
            let idx = (p / 100.0).clamp(0.0, 1.0) * (len - 1) as f64;
            let lower = idx.floor() as usize;
            let upper = idx.ceil() as usize;
            let frac = idx - lower as f64;
            Some(sorted[lower] + (sorted[upper] - sorted[lower]) * frac)
        }
    }
}

/// Failure histogram with sample messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorStatistics {
    /// Failures per kind
    pub count: BTreeMap<ErrorKind, u64>,

    /// Up to [`ErrorStatistics::MAX_SAMPLES_PER_KIND`] distinct messages per
    /// kind, in first-seen order
    pub samples: BTreeMap<ErrorKind, Vec<String>>,
}

impl ErrorStatistics {
    /// Sample messages kept per kind
    pub const MAX_SAMPLES_PER_KIND: usize = 3;

    /// Record one failure
    pub fn record(&mut self, kind: ErrorKind, message: Option<&str>) {
        *self.count.entry(kind).or_insert(0) += 1;

        let samples = self.samples.entry(kind).or_default();
        if let Some(message) = message {
            if samples.len() < Self::MAX_SAMPLES_PER_KIND && !samples.iter().any(|s| s == message)
            {
                samples.push(message.to_string());
            }
        }
    }

    /// Total failures
    pub fn total(&self) -> u64 {
        self.count.values().sum()
    }

    /// Whether no failure was recorded
    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }

    /// Merge another histogram into this one
    pub fn merge(&mut self, other: &ErrorStatistics) {
        for (kind, n) in &other.count {
            *self.count.entry(*kind).or_insert(0) += n;
        }
        for (kind, messages) in &other.samples {
            let samples = self.samples.entry(*kind).or_default();
            for message in messages {
                if samples.len() < Self::MAX_SAMPLES_PER_KIND && !samples.contains(message) {
                    samples.push(message.clone());
                }
            }
        }
    }
}

/// Aggregate over the outcomes of one fixed-concurrency run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkResult {
    /// Outcomes aggregated
    pub total_requests: usize,
    /// Successful outcomes
    pub successful_requests: usize,
    /// Failed outcomes
    pub failed_requests: usize,
    /// Concurrency of the run
    pub concurrency: usize,
    /// Per-request timeout in seconds
    pub request_timeout: f64,
    /// Output token cap
    pub max_output_tokens: u32,
    /// Whether the long-context corpus was used
    pub use_long_context: bool,
    /// Model identifier
    pub model: String,
    /// Wall-clock duration of the run in seconds
    pub total_time: f64,
    /// Successful requests per second of wall-clock time
    pub requests_per_second: f64,
    /// Content units across successful requests
    pub total_output_tokens: u64,
    /// Failure histogram
    pub error_statistics: ErrorStatistics,
    /// End-to-end latency in seconds (successful requests)
    pub latency: PercentileSet,
    /// Content units per second (successful requests, inverted tails)
    pub tokens_per_second: PercentileSet,
    /// Time to first token in seconds (successful requests that produced content)
    pub time_to_first_token: PercentileSet,
}

impl BenchmarkResult {
    /// Reduce outcomes into a result
    pub fn from_outcomes(
        config: &BenchmarkConfig,
        outcomes: &[RequestOutcome],
        total_time: Duration,
    ) -> Self {
        let mut error_statistics = ErrorStatistics::default();
        let mut latencies = Vec::with_capacity(outcomes.len());
        let mut throughputs = Vec::with_capacity(outcomes.len());
        let mut ttfts = Vec::with_capacity(outcomes.len());
        let mut total_output_tokens = 0u64;

        for outcome in outcomes {
            match outcome.error_kind() {
                Some(kind) => error_statistics.record(kind, outcome.error_message.as_deref()),
                None => {
                    latencies.push(outcome.latency_secs());
                    if let Some(tps) = outcome.tokens_per_second() {
                        throughputs.push(tps);
                    }
                    if let Some(ttft) = outcome.ttft_secs() {
                        ttfts.push(ttft);
                    }
                    total_output_tokens += outcome.token_count;
                }
            }
        }

        let successful_requests = latencies.len();
        let total_secs = total_time.as_secs_f64();
        let requests_per_second = if total_secs > 0.0 {
            successful_requests as f64 / total_secs
        } else {
            0.0
        };

        Self {
            total_requests: outcomes.len(),
            successful_requests,
            failed_requests: outcomes.len() - successful_requests,
            concurrency: config.concurrency,
            request_timeout: config.request_timeout.as_secs_f64(),
            max_output_tokens: config.max_output_tokens,
            use_long_context: config.use_long_context,
            model: config.model.clone(),
            total_time: total_secs,
            requests_per_second,
            total_output_tokens,
            error_statistics,
            latency: PercentileSet::from_values(&latencies),
            tokens_per_second: PercentileSet::from_values_inverted(&throughputs),
            time_to_first_token: PercentileSet::from_values(&ttfts),
        }
    }

    /// Fraction of requests that succeeded (0.0 for an empty run)
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.successful_requests as f64 / self.total_requests as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::WorkItem;

    fn success(i: usize, elapsed_ms: u64, ttft_ms: Option<u64>, tokens: u64) -> RequestOutcome {
        RequestOutcome::success(
            WorkItem(i),
            Duration::from_millis(elapsed_ms),
            ttft_ms.map(Duration::from_millis),
            tokens,
        )
    }

    fn failure(i: usize, kind: ErrorKind, message: &str) -> RequestOutcome {
        RequestOutcome::failure(WorkItem(i), kind, Duration::from_millis(10), message)
    }

    fn assert_close(actual: Option<f64>, expected: f64) {
        let actual = actual.expect("value present");
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_percentile_linear_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_close(percentile(&sorted, 50.0), 3.0);
        assert_close(percentile(&sorted, 95.0), 4.8);
        assert_close(percentile(&sorted, 99.0), 4.96);
        assert_close(percentile(&sorted, 0.0), 1.0);
        assert_close(percentile(&sorted, 100.0), 5.0);
        assert_close(percentile(&[7.0], 99.0), 7.0);
        assert_eq!(percentile(&[], 50.0), None);
    }

    #[test]
    fn test_empty_percentile_set_is_all_null() {
        let set = PercentileSet::from_values(&[]);
        assert!(set.is_empty());
        assert_eq!(set, PercentileSet::empty());
        let json = serde_json::to_value(set).unwrap();
        assert!(json["average"].is_null());
        assert!(json["p50"].is_null());
        assert!(json["p95"].is_null());
        assert!(json["p99"].is_null());
    }

    #[test]
    fn test_percentile_set_unsorted_input() {
        let set = PercentileSet::from_values(&[5.0, 1.0, 4.0, 2.0, 3.0]);
        assert_close(set.average, 3.0);
        assert_close(set.p50, 3.0);
        assert_close(set.p95, 4.8);
    }

    #[test]
    fn test_inverted_percentiles_take_the_slow_tail() {
        let values: Vec<f64> = (1..=101).map(|v| v as f64).collect();
        let set = PercentileSet::from_values_inverted(&values);
        assert_close(set.p50, 51.0);
        assert_close(set.p95, 6.0);
        assert_close(set.p99, 2.0);
    }

    #[test]
    fn test_percentiles_are_monotonic() {
        let values: Vec<f64> = (0..37).map(|v| ((v * 7919) % 101) as f64 / 3.0).collect();
        let latency = PercentileSet::from_values(&values);
        assert!(latency.p50 <= latency.p95);
        assert!(latency.p95 <= latency.p99);

        let tps = PercentileSet::from_values_inverted(&values);
        assert!(tps.p99 <= tps.p95);
        assert!(tps.p95 <= tps.p50);
    }

    #[test]
    fn test_error_statistics_caps_distinct_samples() {
        let mut stats = ErrorStatistics::default();
        stats.record(ErrorKind::Timeout, Some("a"));
        stats.record(ErrorKind::Timeout, Some("a"));
        stats.record(ErrorKind::Timeout, Some("b"));
        stats.record(ErrorKind::Timeout, Some("c"));
        stats.record(ErrorKind::Timeout, Some("d"));
        stats.record(ErrorKind::RateLimit, None);

        assert_eq!(stats.count[&ErrorKind::Timeout], 5);
        assert_eq!(stats.count[&ErrorKind::RateLimit], 1);
        assert_eq!(stats.samples[&ErrorKind::Timeout], vec!["a", "b", "c"]);
        assert!(stats.samples[&ErrorKind::RateLimit].is_empty());
        assert_eq!(stats.total(), 6);
    }

    #[test]
    fn test_error_statistics_merge() {
        let mut a = ErrorStatistics::default();
        a.record(ErrorKind::ApiError, Some("x"));
        let mut b = ErrorStatistics::default();
        b.record(ErrorKind::ApiError, Some("y"));
        b.record(ErrorKind::NotFound, Some("z"));
        a.merge(&b);
        assert_eq!(a.count[&ErrorKind::ApiError], 2);
        assert_eq!(a.samples[&ErrorKind::ApiError], vec!["x", "y"]);
        assert_eq!(a.total(), 3);
    }

    #[test]
    fn test_error_statistics_json_keys() {
        let mut stats = ErrorStatistics::default();
        stats.record(ErrorKind::AuthError, Some("bad key"));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["count"]["auth_error"], 1);
        assert_eq!(json["samples"]["auth_error"][0], "bad key");
    }

    #[test]
    fn test_from_outcomes_counts_and_rates() {
        let config = BenchmarkConfig::new(4, 2);
        let outcomes = vec![
            success(0, 100, Some(20), 10),
            success(1, 200, None, 0),
            failure(2, ErrorKind::Timeout, "timed out"),
            success(3, 300, Some(40), 30),
        ];
        let result = BenchmarkResult::from_outcomes(&config, &outcomes, Duration::from_secs(2));

        assert_eq!(result.total_requests, 4);
        assert_eq!(result.successful_requests, 3);
        assert_eq!(result.failed_requests, 1);
        assert_eq!(result.concurrency, 2);
        assert!((result.requests_per_second - 1.5).abs() < 1e-9);
        assert_eq!(result.total_output_tokens, 40);
        assert!((result.success_rate() - 0.75).abs() < 1e-9);

        // latency from successes only
        assert_close(result.latency.average, 0.2);
        // ttft excludes the outcome without first content
        assert_close(result.time_to_first_token.average, 0.03);
        assert_eq!(result.error_statistics.count[&ErrorKind::Timeout], 1);
    }

    #[test]
    fn test_from_outcomes_all_failed_has_null_percentiles() {
        let config = BenchmarkConfig::new(2, 2);
        let outcomes = vec![
            failure(0, ErrorKind::NetworkError, "connection refused"),
            failure(1, ErrorKind::NetworkError, "connection refused"),
        ];
        let result = BenchmarkResult::from_outcomes(&config, &outcomes, Duration::from_secs(1));
        assert_eq!(result.successful_requests, 0);
        assert_eq!(result.requests_per_second, 0.0);
        assert!(result.latency.is_empty());
        assert!(result.tokens_per_second.is_empty());
        assert!(result.time_to_first_token.is_empty());
        assert_eq!(
            result.error_statistics.samples[&ErrorKind::NetworkError],
            vec!["connection refused"]
        );
    }

    #[test]
    fn test_from_outcomes_is_idempotent() {
        let config = BenchmarkConfig::new(3, 3);
        let outcomes = vec![
            success(0, 123, Some(11), 7),
            success(1, 456, Some(22), 9),
            failure(2, ErrorKind::RateLimit, "429"),
        ];
        let first = BenchmarkResult::from_outcomes(&config, &outcomes, Duration::from_millis(700));
        let second = BenchmarkResult::from_outcomes(&config, &outcomes, Duration::from_millis(700));
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_result_json_field_names() {
        let config = BenchmarkConfig::new(1, 1);
        let outcomes = vec![success(0, 100, Some(10), 2)];
        let result = BenchmarkResult::from_outcomes(&config, &outcomes, Duration::from_secs(1));
        let json = serde_json::to_value(&result).unwrap();
        for field in [
            "total_requests",
            "successful_requests",
            "failed_requests",
            "concurrency",
            "request_timeout",
            "max_output_tokens",
            "use_long_context",
            "model",
            "total_time",
            "requests_per_second",
            "total_output_tokens",
            "error_statistics",
            "latency",
            "tokens_per_second",
            "time_to_first_token",
        ] {
            assert!(json.get(field).is_some(), "missing field {field}");
        }
        assert!(json["error_statistics"]["count"].is_object());
    }
}
