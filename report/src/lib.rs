//! Rendering and persistence of benchmark results
//!
//! This crate provides:
//!
//! - Line and JSON rendering of one result
//! - The cross-level summary with recommendations
//! - JSON result files

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod json;
pub mod render;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_util;

pub use error::ReportError;
pub use json::{read_results, write_json, write_results};
pub use render::{fmt_opt, render, render_json, render_line, OutputFormat};
pub use summary::{render_probe_outcome, Recommendation, SummaryRow, SweepSummary};
