//! Line and JSON rendering of single results

use std::fmt::{self, Write as _};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use streambench_core::{BenchmarkResult, PercentileSet};

use crate::error::ReportError;

/// What the CLI prints for each result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable block
    #[default]
    Line,
    /// Pretty JSON
    Json,
    /// JSON followed by the human-readable block
    Both,
}

impl OutputFormat {
    /// Identifier string
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Line => "line",
            OutputFormat::Json => "json",
            OutputFormat::Both => "both",
        }
    }

    /// Whether JSON is printed
    pub fn includes_json(&self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Both)
    }

    /// Whether the line block is printed
    pub fn includes_line(&self) -> bool {
        matches!(self, OutputFormat::Line | OutputFormat::Both)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(OutputFormat::Line),
            "json" => Ok(OutputFormat::Json),
            "both" => Ok(OutputFormat::Both),
            _ => Err(format!("Unknown output format: {s} (expected line, json or both)")),
        }
    }
}

/// `value` with `precision` decimals, or `N/A`
pub fn fmt_opt(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{v:.precision$}"),
        None => "N/A".to_string(),
    }
}

fn write_percentiles(out: &mut String, title: &str, label: &str, set: &PercentileSet, precision: usize) {
    let _ = writeln!(out, "\n{title}:");
    let _ = writeln!(out, "  Average {label}: {}", fmt_opt(set.average, precision));
    let _ = writeln!(out, "  {label} P50: {}", fmt_opt(set.p50, precision));
    let _ = writeln!(out, "  {label} P95: {}", fmt_opt(set.p95, precision));
    let _ = writeln!(out, "  {label} P99: {}", fmt_opt(set.p99, precision));
}

/// Human-readable block for one result
pub fn render_line(result: &BenchmarkResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Run:");
    let _ = writeln!(out, "  Total requests: {}", result.total_requests);
    let _ = writeln!(out, "  Successful requests: {}", result.successful_requests);
    let _ = writeln!(out, "  Failed requests: {}", result.failed_requests);
    let _ = writeln!(out, "  Concurrency: {}", result.concurrency);
    let _ = writeln!(out, "  Request timeout: {} s", result.request_timeout);
    let _ = writeln!(out, "  Max output tokens: {}", result.max_output_tokens);
    let _ = writeln!(
        out,
        "  Long context: {}",
        if result.use_long_context { "yes" } else { "no" }
    );
    let _ = writeln!(out, "  Total time: {:.2} s", result.total_time);
    let _ = writeln!(out, "  Requests per second: {:.2}", result.requests_per_second);
    let _ = writeln!(out, "  Total output tokens: {}", result.total_output_tokens);
    let _ = writeln!(out, "  Model: {}", result.model);

    write_percentiles(&mut out, "Latency (s)", "latency", &result.latency, 3);
    write_percentiles(
        &mut out,
        "Token rate (tokens/s)",
        "TPS",
        &result.tokens_per_second,
        2,
    );
    write_percentiles(
        &mut out,
        "Time to first token (s)",
        "TTFT",
        &result.time_to_first_token,
        3,
    );

    let errors = &result.error_statistics;
    if !errors.is_empty() {
        let _ = writeln!(out, "\nErrors:");
        for (kind, count) in &errors.count {
            let _ = writeln!(out, "  {kind}: {count}");
        }
        let _ = writeln!(out, "\nError samples:");
        for (kind, samples) in &errors.samples {
            let _ = writeln!(out, "  {kind}:");
            for sample in samples {
                let _ = writeln!(out, "    {sample}");
            }
        }
    }

    out
}

/// Pretty JSON for any serializable report value
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render one result in `format`
pub fn render(result: &BenchmarkResult, format: OutputFormat) -> Result<String, ReportError> {
    let mut out = String::new();
    if format.includes_json() {
        out.push_str(&render_json(result)?);
        out.push('\n');
    }
    if format.includes_line() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&render_line(result));
    }
    Ok(out)
}
