//! Run configuration types
//!
//! [`BenchmarkConfig`] describes a single fixed-concurrency run. The adaptive
//! probe and the sweep derive per-level configs from a base config plus their
//! own settings ([`AdaptiveConfig`], [`SweepConfig`]).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default model identifier sent with every request
pub const DEFAULT_MODEL: &str = "deepseek-r1";

/// Configuration for one fixed-concurrency run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Total number of requests to issue; zero yields an empty run
    pub request_count: usize,

    /// Maximum number of requests in flight at once
    pub concurrency: usize,

    /// Deadline covering stream open and full consumption of one request
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Generation cap sent as `max_tokens`
    pub max_output_tokens: u32,

    /// Draw prompts from the long-context corpus
    #[serde(default)]
    pub use_long_context: bool,

    /// Model identifier
    pub model: String,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            request_count: 100,
            concurrency: 10,
            request_timeout: Duration::from_secs(60),
            max_output_tokens: 50,
            use_long_context: false,
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl BenchmarkConfig {
    /// Create a config for `request_count` requests at `concurrency`
    pub fn new(request_count: usize, concurrency: usize) -> Self {
        Self {
            request_count,
            concurrency,
            ..Default::default()
        }
    }

    /// Set the request count
    pub fn with_request_count(mut self, request_count: usize) -> Self {
        self.request_count = request_count;
        self
    }

    /// Set the concurrency
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the per-request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the output token cap
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = tokens;
        self
    }

    /// Select the long-context corpus
    pub fn with_long_context(mut self, enabled: bool) -> Self {
        self.use_long_context = enabled;
        self
    }

    /// Set the model identifier
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "concurrency must be at least 1".into(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "request timeout must be positive".into(),
            ));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::InvalidOutputTokens(
                "max output tokens must be at least 1".into(),
            ));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel("model must not be empty".into()));
        }
        Ok(())
    }
}

// ============================================================================
// Adaptive probe
// ============================================================================

/// One band of the step schedule: from `min_concurrency` upward, grow by `step`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepBand {
    /// Lowest concurrency this band applies to
    pub min_concurrency: usize,
    /// Concurrency increment inside this band
    pub step: usize,
}

/// Concurrency increments for the adaptive probe
///
/// Starts at `initial_step`; each band switches to a larger step once the
/// current concurrency reaches its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepSchedule {
    /// Step used below the first band
    pub initial_step: usize,
    /// Bands ordered by ascending `min_concurrency`
    #[serde(default)]
    pub bands: Vec<StepBand>,
}

impl Default for StepSchedule {
    fn default() -> Self {
        Self {
            initial_step: 5,
            bands: vec![
                StepBand {
                    min_concurrency: 50,
                    step: 10,
                },
                StepBand {
                    min_concurrency: 100,
                    step: 25,
                },
                StepBand {
                    min_concurrency: 200,
                    step: 50,
                },
            ],
        }
    }
}

impl StepSchedule {
    /// A schedule that always grows by `step`
    pub fn fixed(step: usize) -> Self {
        Self {
            initial_step: step,
            bands: Vec::new(),
        }
    }

    /// Start at `step`, dropping bands whose step would be smaller
    pub fn with_initial_step(mut self, step: usize) -> Self {
        self.initial_step = step;
        self.bands.retain(|band| band.step >= step);
        self
    }

    /// Add a band
    pub fn with_band(mut self, min_concurrency: usize, step: usize) -> Self {
        self.bands.push(StepBand {
            min_concurrency,
            step,
        });
        self
    }

    /// Step to apply when the current level is `concurrency`
    pub fn step_for(&self, concurrency: usize) -> usize {
        self.bands
            .iter()
            .rev()
            .find(|band| concurrency >= band.min_concurrency)
            .map(|band| band.step)
            .unwrap_or(self.initial_step)
    }

    /// Validate the schedule
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_step == 0 || self.bands.iter().any(|b| b.step == 0) {
            return Err(ConfigError::InvalidStepSchedule(
                "every step must be at least 1".into(),
            ));
        }
        if self
            .bands
            .windows(2)
            .any(|pair| pair[0].min_concurrency >= pair[1].min_concurrency)
        {
            return Err(ConfigError::InvalidStepSchedule(
                "bands must have strictly ascending thresholds".into(),
            ));
        }
        let mut previous = self.initial_step;
        for band in &self.bands {
            if band.step < previous {
                return Err(ConfigError::InvalidStepSchedule(format!(
                    "step {} at concurrency {} is smaller than the preceding step {}",
                    band.step, band.min_concurrency, previous
                )));
            }
            previous = band.step;
        }
        Ok(())
    }
}

/// Settings for the adaptive concurrency probe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// Minimum success rate (0.0..=1.0) a level must reach to keep climbing
    pub floor_success_rate: f64,

    /// Highest concurrency the probe will try
    pub ceiling_concurrency: usize,

    /// First concurrency level
    pub initial_concurrency: usize,

    /// How concurrency grows between levels
    #[serde(default)]
    pub step_schedule: StepSchedule,

    /// Requests issued per unit of concurrency at each level
    pub requests_per_concurrency: usize,

    /// Upper bound on requests issued at any one level
    pub max_requests_per_level: usize,

    /// Pause between levels
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            floor_success_rate: 0.95,
            ceiling_concurrency: 300,
            initial_concurrency: 1,
            step_schedule: StepSchedule::default(),
            requests_per_concurrency: 2,
            max_requests_per_level: 600,
            cooldown: Duration::from_secs(5),
        }
    }
}

impl AdaptiveConfig {
    /// Set the success-rate floor
    pub fn with_floor_success_rate(mut self, floor: f64) -> Self {
        self.floor_success_rate = floor;
        self
    }

    /// Set the concurrency ceiling
    pub fn with_ceiling(mut self, ceiling: usize) -> Self {
        self.ceiling_concurrency = ceiling;
        self
    }

    /// Set the starting concurrency
    pub fn with_initial_concurrency(mut self, concurrency: usize) -> Self {
        self.initial_concurrency = concurrency;
        self
    }

    /// Set the step schedule
    pub fn with_step_schedule(mut self, schedule: StepSchedule) -> Self {
        self.step_schedule = schedule;
        self
    }

    /// Set requests issued per unit of concurrency
    pub fn with_requests_per_concurrency(mut self, n: usize) -> Self {
        self.requests_per_concurrency = n;
        self
    }

    /// Set the pause between levels
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Number of requests to issue at a level of `concurrency`
    pub fn requests_for(&self, concurrency: usize) -> usize {
        concurrency
            .saturating_mul(self.requests_per_concurrency)
            .clamp(1, self.max_requests_per_level.max(1))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.floor_success_rate) {
            return Err(ConfigError::InvalidSuccessRate(format!(
                "floor must be within 0.0..=1.0, got {}",
                self.floor_success_rate
            )));
        }
        if self.initial_concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(
                "initial concurrency must be at least 1".into(),
            ));
        }
        if self.ceiling_concurrency < self.initial_concurrency {
            return Err(ConfigError::InvalidConcurrency(format!(
                "ceiling {} is below initial concurrency {}",
                self.ceiling_concurrency, self.initial_concurrency
            )));
        }
        if self.requests_per_concurrency == 0 {
            return Err(ConfigError::InvalidRequestCount(
                "requests per concurrency must be at least 1".into(),
            ));
        }
        self.step_schedule.validate()
    }
}

// ============================================================================
// Sweep
// ============================================================================

/// One fixed level of a sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepLevel {
    /// Requests to issue
    pub request_count: usize,
    /// Concurrency
    pub concurrency: usize,
    /// Output token cap
    pub max_output_tokens: u32,
}

impl SweepLevel {
    /// Create a level
    pub fn new(request_count: usize, concurrency: usize, max_output_tokens: u32) -> Self {
        Self {
            request_count,
            concurrency,
            max_output_tokens,
        }
    }
}

/// Settings for a fixed list of benchmark levels run back to back
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Levels in execution order
    pub levels: Vec<SweepLevel>,

    /// Per-request timeout applied to every level
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    /// Pause between levels
    #[serde(with = "humantime_serde")]
    pub cooldown: Duration,
}

impl Default for SweepConfig {
    fn default() -> Self {
        let levels = [(10, 1), (100, 50), (200, 100), (400, 200), (600, 300)]
            .into_iter()
            .map(|(request_count, concurrency)| SweepLevel::new(request_count, concurrency, 100))
            .collect();
        Self {
            levels,
            request_timeout: Duration::from_secs(30),
            cooldown: Duration::from_secs(5),
        }
    }
}

impl SweepConfig {
    /// Replace the level list
    pub fn with_levels(mut self, levels: Vec<SweepLevel>) -> Self {
        self.levels = levels;
        self
    }

    /// Set the pause between levels
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Config for one level, inheriting model and corpus from `base`
    pub fn level_config(&self, base: &BenchmarkConfig, level: SweepLevel) -> BenchmarkConfig {
        base.clone()
            .with_request_count(level.request_count)
            .with_concurrency(level.concurrency)
            .with_max_output_tokens(level.max_output_tokens)
            .with_request_timeout(self.request_timeout)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.levels.is_empty() {
            return Err(ConfigError::InvalidSweep("no levels configured".into()));
        }
        for level in &self.levels {
            if level.concurrency == 0 || level.request_count == 0 || level.max_output_tokens == 0 {
                return Err(ConfigError::InvalidSweep(format!(
                    "level ({}, {}) must have positive request count, concurrency and token cap",
                    level.request_count, level.concurrency
                )));
            }
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Invalid concurrency value
    #[error("Invalid concurrency: {0}")]
    InvalidConcurrency(String),

    /// Invalid request count
    #[error("Invalid request count: {0}")]
    InvalidRequestCount(String),

    /// Invalid timeout
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    /// Invalid output token cap
    #[error("Invalid output tokens: {0}")]
    InvalidOutputTokens(String),

    /// Invalid model
    #[error("Invalid model: {0}")]
    InvalidModel(String),

    /// Invalid success-rate floor
    #[error("Invalid success rate: {0}")]
    InvalidSuccessRate(String),

    /// Invalid step schedule
    #[error("Invalid step schedule: {0}")]
    InvalidStepSchedule(String),

    /// Invalid sweep definition
    #[error("Invalid sweep: {0}")]
    InvalidSweep(String),
}
