//! Builder pattern for Dispatcher construction

use std::sync::Arc;

use crate::channel::ChannelConfig;
use crate::config::BenchmarkConfig;
use crate::error::{BenchError, BenchResult};
use crate::traits::{RequestIssuer, Sampler};

use super::executor::Dispatcher;

/// Builder for creating a Dispatcher with validated configuration
///
/// # Example
///
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .config(BenchmarkConfig::new(1000, 50))
///     .issuer(issuer)
///     .sampler(sampler)
///     .build()?;
/// ```
pub struct DispatcherBuilder {
    config: BenchmarkConfig,
    issuer: Option<Arc<dyn RequestIssuer>>,
    sampler: Option<Arc<dyn Sampler>>,
    channel_config: ChannelConfig,
}

impl DispatcherBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: BenchmarkConfig::default(),
            issuer: None,
            sampler: None,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the full run configuration
    pub fn config(mut self, config: BenchmarkConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the concurrency level
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.config.concurrency = concurrency;
        self
    }

    /// Set the number of requests
    pub fn request_count(mut self, request_count: usize) -> Self {
        self.config.request_count = request_count;
        self
    }

    /// Set the request issuer
    pub fn issuer(mut self, issuer: Arc<dyn RequestIssuer>) -> Self {
        self.issuer = Some(issuer);
        self
    }

    /// Set the sampler
    pub fn sampler(mut self, sampler: Arc<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the dispatcher
    ///
    /// # Errors
    ///
    /// Returns an error if issuer or sampler are not set, or if configuration
    /// validation fails.
    pub fn build(self) -> BenchResult<Dispatcher> {
        let issuer = self
            .issuer
            .ok_or_else(|| BenchError::missing_config("issuer"))?;

        let sampler = self
            .sampler
            .ok_or_else(|| BenchError::missing_config("sampler"))?;

        self.config.validate()?;

        Ok(Dispatcher::new(
            self.config,
            issuer,
            sampler,
            self.channel_config,
        ))
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}
