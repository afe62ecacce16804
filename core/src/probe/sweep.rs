//! Fixed list of levels run back to back

use tracing::info;

use crate::config::{BenchmarkConfig, SweepConfig};
use crate::error::BenchResult;
use crate::metrics::BenchmarkResult;

use super::runner::LevelRunner;

/// Runs every configured level in order with a cooldown in between
pub struct Sweep<R> {
    base: BenchmarkConfig,
    config: SweepConfig,
    runner: R,
}

impl<R: LevelRunner> Sweep<R> {
    /// Create a sweep; model and corpus come from `base`
    ///
    /// # Errors
    /// Fails if the sweep or any derived level config is invalid.
    pub fn new(base: BenchmarkConfig, config: SweepConfig, runner: R) -> BenchResult<Self> {
        config.validate()?;
        for level in &config.levels {
            config.level_config(&base, *level).validate()?;
        }
        Ok(Self {
            base,
            config,
            runner,
        })
    }

    /// Run all levels and return their results in order
    pub async fn run(&self) -> BenchResult<Vec<BenchmarkResult>> {
        let total = self.config.levels.len();
        let mut results = Vec::with_capacity(total);

        for (idx, level) in self.config.levels.iter().enumerate() {
            let level_config = self.config.level_config(&self.base, *level);
            info!(
                level = idx + 1,
                of = total,
                concurrency = level.concurrency,
                requests = level.request_count,
                "Starting sweep level"
            );

            results.push(self.runner.run_level(&level_config).await?);

            if idx + 1 < total && !self.config.cooldown.is_zero() {
                tokio::time::sleep(self.config.cooldown).await;
            }
        }

        Ok(results)
    }
}
