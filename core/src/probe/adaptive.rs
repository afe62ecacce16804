//! Adaptive concurrency probe

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{AdaptiveConfig, BenchmarkConfig, StepSchedule};
use crate::error::{BenchError, BenchResult};
use crate::metrics::BenchmarkResult;

use super::runner::LevelRunner;

/// Probe lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeState {
    /// Running levels and climbing
    Probing,
    /// A level fell below the success-rate floor
    Degraded,
    /// A level at the ceiling passed
    Capped,
    /// Summary emitted
    Done,
}

/// Mutable probe state, changed only between levels
#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveProbeState {
    /// Lifecycle state
    pub state: ProbeState,
    /// Concurrency of the next (or last) level
    pub concurrency: usize,
    /// Increment applied after a passing level
    pub step: usize,
    /// Success-rate floor
    pub floor_success_rate: f64,
    /// Highest concurrency allowed
    pub ceiling_concurrency: usize,
    /// Highest level that met the floor
    pub last_passing: Option<usize>,
    /// Success rate of the most recent level
    pub last_success_rate: Option<f64>,
}

impl AdaptiveProbeState {
    /// Initial state for `config`
    pub fn new(config: &AdaptiveConfig) -> Self {
        Self {
            state: ProbeState::Probing,
            concurrency: config.initial_concurrency,
            step: config.step_schedule.step_for(config.initial_concurrency),
            floor_success_rate: config.floor_success_rate,
            ceiling_concurrency: config.ceiling_concurrency,
            last_passing: None,
            last_success_rate: None,
        }
    }

    /// Apply the success rate of the level just run at `self.concurrency`
    ///
    /// A passing level below the ceiling advances to
    /// `min(concurrency + step, ceiling)`; a passing level at the ceiling caps
    /// the probe; a failing level degrades it.
    pub fn observe(&mut self, success_rate: f64, schedule: &StepSchedule) -> ProbeState {
        if self.state != ProbeState::Probing {
            return self.state;
        }
        self.last_success_rate = Some(success_rate);

        if success_rate < self.floor_success_rate {
            self.state = ProbeState::Degraded;
            return self.state;
        }

        self.last_passing = Some(self.concurrency);
        if self.concurrency >= self.ceiling_concurrency {
            self.state = ProbeState::Capped;
            return self.state;
        }

        self.concurrency = (self.concurrency + self.step).min(self.ceiling_concurrency);
        self.step = schedule.step_for(self.concurrency);
        self.state
    }

    /// Move a stopped probe to `Done` and describe how it ended
    pub fn finish(&mut self) -> BenchResult<ProbeOutcome> {
        let outcome = match self.state {
            ProbeState::Degraded => ProbeOutcome::Degraded {
                discovered_ceiling: self.last_passing,
                failed_concurrency: self.concurrency,
                success_rate: self.last_success_rate.unwrap_or(0.0),
            },
            ProbeState::Capped => ProbeOutcome::Capped {
                ceiling: self.concurrency,
            },
            ProbeState::Probing | ProbeState::Done => {
                return Err(BenchError::probe(format!(
                    "cannot finish a probe in state {:?}",
                    self.state
                )))
            }
        };
        self.state = ProbeState::Done;
        Ok(outcome)
    }
}

/// How the probe ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// The success rate fell below the floor
    Degraded {
        /// Last level that met the floor; `None` if the first level failed
        discovered_ceiling: Option<usize>,
        /// Level that fell below the floor
        failed_concurrency: usize,
        /// Its success rate
        success_rate: f64,
    },
    /// Every level up to the ceiling met the floor
    Capped {
        /// The configured ceiling
        ceiling: usize,
    },
}

impl ProbeOutcome {
    /// Highest concurrency known to meet the floor
    pub fn practical_limit(&self) -> Option<usize> {
        match self {
            ProbeOutcome::Degraded {
                discovered_ceiling, ..
            } => *discovered_ceiling,
            ProbeOutcome::Capped { ceiling } => Some(*ceiling),
        }
    }
}

/// Probe summary plus every visited level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// How the probe ended
    pub outcome: ProbeOutcome,
    /// Results in visiting order
    pub levels: Vec<BenchmarkResult>,
}

/// Climbs concurrency until the success rate falls below a floor
///
/// Each level runs `clamp(concurrency * requests_per_concurrency, 1,
/// max_requests_per_level)` requests with every other setting taken from the
/// base config.
pub struct AdaptiveProbe<R> {
    base: BenchmarkConfig,
    config: AdaptiveConfig,
    runner: R,
}

impl<R: LevelRunner> AdaptiveProbe<R> {
    /// Create a probe
    ///
    /// # Errors
    /// Fails if either configuration is invalid.
    pub fn new(base: BenchmarkConfig, config: AdaptiveConfig, runner: R) -> BenchResult<Self> {
        base.validate()?;
        config.validate()?;
        Ok(Self {
            base,
            config,
            runner,
        })
    }

    /// Probe settings
    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    /// Level runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Config for the level at `concurrency`
    pub fn level_config(&self, concurrency: usize) -> BenchmarkConfig {
        self.base
            .clone()
            .with_concurrency(concurrency)
            .with_request_count(self.config.requests_for(concurrency))
    }

    /// Run levels until the probe degrades or caps
    pub async fn run(&self) -> BenchResult<ProbeReport> {
        let mut state = AdaptiveProbeState::new(&self.config);
        let mut levels = Vec::new();

        info!(
            floor = self.config.floor_success_rate,
            start = self.config.initial_concurrency,
            ceiling = self.config.ceiling_concurrency,
            "Starting adaptive probe"
        );

        while state.state == ProbeState::Probing {
            let level = self.level_config(state.concurrency);
            let result = self.runner.run_level(&level).await?;
            let success_rate = result.success_rate();

            info!(
                concurrency = level.concurrency,
                requests = level.request_count,
                success_rate,
                rps = result.requests_per_second,
                "Probe level finished"
            );
            levels.push(result);

            let next = state.observe(success_rate, &self.config.step_schedule);
            if next == ProbeState::Probing && !self.config.cooldown.is_zero() {
                tokio::time::sleep(self.config.cooldown).await;
            }
        }

        let outcome = state.finish()?;
        match &outcome {
            ProbeOutcome::Degraded {
                discovered_ceiling,
                failed_concurrency,
                success_rate,
            } => info!(
                discovered_ceiling = ?discovered_ceiling,
                failed_concurrency,
                success_rate,
                levels = levels.len(),
                "Adaptive probe degraded"
            ),
            ProbeOutcome::Capped { ceiling } => info!(
                ceiling,
                levels = levels.len(),
                "Adaptive probe reached the ceiling"
            ),
        }

        Ok(ProbeReport { outcome, levels })
    }
}
