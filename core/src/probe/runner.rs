//! Running one level

use std::sync::Arc;

use async_trait::async_trait;

use crate::channel::ChannelConfig;
use crate::config::BenchmarkConfig;
use crate::error::BenchResult;
use crate::metrics::BenchmarkResult;
use crate::orchestrator::DispatcherBuilder;
use crate::traits::{RequestIssuer, Sampler};

/// Runs one fixed-concurrency level and reduces it to a result
#[async_trait]
pub trait LevelRunner: Send + Sync {
    /// Run `config` to completion
    async fn run_level(&self, config: &BenchmarkConfig) -> BenchResult<BenchmarkResult>;
}

/// [`LevelRunner`] backed by a [`crate::Dispatcher`] per level
pub struct DispatchLevelRunner {
    issuer: Arc<dyn RequestIssuer>,
    sampler: Arc<dyn Sampler>,
    channel_config: ChannelConfig,
}

impl DispatchLevelRunner {
    /// Create a runner sharing one issuer and sampler across levels
    pub fn new(issuer: Arc<dyn RequestIssuer>, sampler: Arc<dyn Sampler>) -> Self {
        Self {
            issuer,
            sampler,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the outcome channel sizing
    pub fn with_channel_config(mut self, channel_config: ChannelConfig) -> Self {
        self.channel_config = channel_config;
        self
    }
}

#[async_trait]
impl LevelRunner for DispatchLevelRunner {
    async fn run_level(&self, config: &BenchmarkConfig) -> BenchResult<BenchmarkResult> {
        let dispatcher = DispatcherBuilder::new()
            .config(config.clone())
            .issuer(Arc::clone(&self.issuer))
            .sampler(Arc::clone(&self.sampler))
            .channel_config(self.channel_config.clone())
            .build()?;
        dispatcher.run_and_summarize().await
    }
}
