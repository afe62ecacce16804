//! Cross-level summary for sweeps and adaptive probes

use std::fmt::{self, Write as _};

use serde::{Deserialize, Serialize};
use streambench_core::{BenchmarkResult, ProbeOutcome};

use crate::render::fmt_opt;

/// Success rate (percent) below which the last level is flagged
pub const HEALTHY_SUCCESS_PERCENT: f64 = 95.0;

/// One level of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    /// Concurrency of the level
    pub concurrency: usize,
    /// Successful requests per second
    pub requests_per_second: f64,
    /// Average latency in seconds
    pub average_latency: Option<f64>,
    /// p99 latency in seconds
    pub p99_latency: Option<f64>,
    /// Average tokens per second
    pub average_tps: Option<f64>,
    /// Average time to first token in seconds
    pub average_ttft: Option<f64>,
    /// Success rate in percent
    pub success_percent: f64,
}

impl SummaryRow {
    /// Row for one result
    pub fn from_result(result: &BenchmarkResult) -> Self {
        Self {
            concurrency: result.concurrency,
            requests_per_second: result.requests_per_second,
            average_latency: result.latency.average,
            p99_latency: result.latency.p99,
            average_tps: result.tokens_per_second.average,
            average_ttft: result.time_to_first_token.average,
            success_percent: result.success_rate() * 100.0,
        }
    }
}

/// Advice derived from where the best level sits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recommendation {
    /// Best throughput at the highest level tested
    TryHigherConcurrency,
    /// Best throughput at the lowest level tested
    TryLowerConcurrency,
    /// Best throughput somewhere in between
    OptimalNear {
        /// Concurrency of the best level
        concurrency: usize,
    },
    /// The last level fell below the healthy success rate
    CheckResources {
        /// Its success rate in percent
        success_percent: f64,
    },
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Recommendation::TryHigherConcurrency => write!(
                f,
                "The system has not reached its limit yet; try higher concurrency"
            ),
            Recommendation::TryLowerConcurrency => write!(
                f,
                "Try lower concurrency; the current load may be too high"
            ),
            Recommendation::OptimalNear { concurrency } => {
                write!(f, "Best concurrency is around {concurrency}")
            }
            Recommendation::CheckResources { success_percent } => write!(
                f,
                "Success rate is low at high concurrency ({success_percent:.1}%); check server resources or lower concurrency"
            ),
        }
    }
}

/// Reduction over every level of a sweep or probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepSummary {
    /// Model under test
    pub model: String,
    /// Whether long-context prompts were used
    pub use_long_context: bool,
    /// One row per level, in run order
    pub rows: Vec<SummaryRow>,
    /// Output tokens across all levels
    pub total_output_tokens: u64,
    /// Wall-clock seconds across all levels
    pub total_time: f64,
    /// `total_output_tokens / total_time`; `None` if no time elapsed
    pub overall_token_rate: Option<f64>,
    /// Index of the highest-RPS row
    pub best_rps_index: usize,
    /// Index of the lowest-average-latency row; `None` if no level succeeded
    pub lowest_latency_index: Option<usize>,
    /// Advice, in display order
    pub recommendations: Vec<Recommendation>,
}

impl SweepSummary {
    /// Summarize `results`; `None` when there are none
    pub fn from_results(results: &[BenchmarkResult]) -> Option<Self> {
        let first = results.first()?;
        let rows: Vec<SummaryRow> = results.iter().map(SummaryRow::from_result).collect();

        let total_output_tokens = results.iter().map(|r| r.total_output_tokens).sum();
        let total_time: f64 = results.iter().map(|r| r.total_time).sum();
        let overall_token_rate =
            (total_time > 0.0).then(|| total_output_tokens as f64 / total_time);

        // first maximum wins on ties
        let best_rps_index = rows
            .iter()
            .enumerate()
            .fold(0, |best, (idx, row)| {
                if row.requests_per_second > rows[best].requests_per_second {
                    idx
                } else {
                    best
                }
            });

        let lowest_latency_index = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| row.average_latency.map(|lat| (idx, lat)))
            .fold(None, |best: Option<(usize, f64)>, (idx, lat)| match best {
                Some((_, best_lat)) if best_lat <= lat => best,
                _ => Some((idx, lat)),
            })
            .map(|(idx, _)| idx);

        let recommendations = recommend(&rows, best_rps_index);

        Some(Self {
            model: first.model.clone(),
            use_long_context: first.use_long_context,
            rows,
            total_output_tokens,
            total_time,
            overall_token_rate,
            best_rps_index,
            lowest_latency_index,
            recommendations,
        })
    }

    /// Highest-RPS row
    pub fn best_rps(&self) -> &SummaryRow {
        &self.rows[self.best_rps_index]
    }

    /// Lowest-latency row
    pub fn lowest_latency(&self) -> Option<&SummaryRow> {
        self.lowest_latency_index.map(|idx| &self.rows[idx])
    }

    /// Human-readable report
    pub fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Summary:");
        let _ = writeln!(out, "  Model: {}", self.model);
        let _ = writeln!(
            out,
            "  Long context: {}",
            if self.use_long_context { "yes" } else { "no" }
        );
        let _ = writeln!(out, "  Total output tokens: {}", self.total_output_tokens);
        let _ = writeln!(out, "  Total time: {:.2} s", self.total_time);
        let _ = writeln!(
            out,
            "  Overall token rate: {} tokens/s",
            fmt_opt(self.overall_token_rate, 2)
        );

        let _ = writeln!(
            out,
            "\n{:>11} {:>9} {:>12} {:>12} {:>10} {:>10} {:>9}",
            "concurrency", "rps", "avg lat(s)", "p99 lat(s)", "avg tps", "ttft(s)", "success"
        );
        for row in &self.rows {
            let _ = writeln!(
                out,
                "{:>11} {:>9.2} {:>12} {:>12} {:>10} {:>10} {:>8.1}%",
                row.concurrency,
                row.requests_per_second,
                fmt_opt(row.average_latency, 3),
                fmt_opt(row.p99_latency, 3),
                fmt_opt(row.average_tps, 2),
                fmt_opt(row.average_ttft, 3),
                row.success_percent,
            );
        }

        let best = self.best_rps();
        let _ = writeln!(out, "\nBest configurations:");
        let _ = writeln!(
            out,
            "  Highest RPS: concurrency {} ({:.2} req/s)",
            best.concurrency, best.requests_per_second
        );
        match self.lowest_latency() {
            Some(row) => {
                let _ = writeln!(
                    out,
                    "  Lowest latency: concurrency {} ({} s)",
                    row.concurrency,
                    fmt_opt(row.average_latency, 3)
                );
            }
            None => {
                let _ = writeln!(out, "  Lowest latency: N/A");
            }
        }

        let _ = writeln!(out, "\nRecommendations:");
        for rec in &self.recommendations {
            let _ = writeln!(out, "  - {rec}");
        }

        out
    }
}

fn recommend(rows: &[SummaryRow], best_rps_index: usize) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if best_rps_index + 1 == rows.len() {
        recommendations.push(Recommendation::TryHigherConcurrency);
    } else if best_rps_index == 0 {
        recommendations.push(Recommendation::TryLowerConcurrency);
    } else {
        recommendations.push(Recommendation::OptimalNear {
            concurrency: rows[best_rps_index].concurrency,
        });
    }

    if let Some(last) = rows.last() {
        if last.success_percent < HEALTHY_SUCCESS_PERCENT {
            recommendations.push(Recommendation::CheckResources {
                success_percent: last.success_percent,
            });
        }
    }

    recommendations
}

/// One-line description of how an adaptive probe ended
pub fn render_probe_outcome(outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Degraded {
            discovered_ceiling: Some(limit),
            failed_concurrency,
            success_rate,
        } => format!(
            "Practical concurrency limit: {limit} (success rate fell to {:.1}% at {failed_concurrency})",
            success_rate * 100.0
        ),
        ProbeOutcome::Degraded {
            discovered_ceiling: None,
            failed_concurrency,
            success_rate,
        } => format!(
            "No concurrency level met the success-rate floor (first level {failed_concurrency} at {:.1}%)",
            success_rate * 100.0
        ),
        ProbeOutcome::Capped { ceiling } => {
            format!("Reached the configured ceiling of {ceiling} without degrading")
        }
    }
}
