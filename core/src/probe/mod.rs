//! Multi-level runs: adaptive concurrency probe and fixed sweep
//!
//! Both drive a [`LevelRunner`] one level at a time and retain every level's
//! [`crate::BenchmarkResult`]. The probe climbs concurrency until the success
//! rate drops below a floor or the ceiling is reached; the sweep walks a
//! fixed list of levels.

mod adaptive;
mod runner;
mod sweep;

pub use adaptive::{AdaptiveProbe, AdaptiveProbeState, ProbeOutcome, ProbeReport, ProbeState};
pub use runner::{DispatchLevelRunner, LevelRunner};
pub use sweep::Sweep;
