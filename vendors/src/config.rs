//! Issuer endpoint and HTTP client configuration

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// A required configuration field is missing
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The base URL is not http(s)
    #[error("invalid base URL: {0}")]
    InvalidUrl(String),

    /// A timeout value is out of acceptable range
    #[error("invalid timeout: {0:?}")]
    InvalidTimeout(Duration),
}

/// Append `/v1` to a base URL unless it already ends with it
pub fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with("/v1") {
        trimmed.to_string()
    } else if trimmed.ends_with('/') {
        format!("{trimmed}v1")
    } else {
        format!("{trimmed}/v1")
    }
}

/// Settings for an OpenAI-compatible issuer and its shared HTTP client
///
/// There is no overall request timeout here; every request is bounded by
/// the benchmark's per-request timeout instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuerConfig {
    /// Server URL as given by the user (normalized on use)
    pub base_url: String,

    /// TCP connect timeout
    #[serde(with = "humantime_serde", default = "default_connect_timeout")]
    pub connect_timeout: Duration,

    /// Idle connection timeout
    #[serde(with = "humantime_serde", default = "default_pool_idle_timeout")]
    pub pool_idle_timeout: Duration,

    /// Maximum idle connections kept per host
    #[serde(default = "default_pool_max_idle")]
    pub pool_max_idle_per_host: usize,

    /// TCP keepalive interval
    #[serde(with = "humantime_serde", default = "default_tcp_keepalive")]
    pub tcp_keepalive: Option<Duration>,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_connect_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_pool_idle_timeout() -> Duration {
    Duration::from_secs(90)
}

fn default_pool_max_idle() -> usize {
    32
}

fn default_tcp_keepalive() -> Option<Duration> {
    Some(Duration::from_secs(60))
}

fn default_user_agent() -> String {
    format!("streambench/{}", env!("CARGO_PKG_VERSION"))
}

impl IssuerConfig {
    /// Config for `base_url` with default client settings
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            connect_timeout: default_connect_timeout(),
            pool_idle_timeout: default_pool_idle_timeout(),
            pool_max_idle_per_host: default_pool_max_idle(),
            tcp_keepalive: default_tcp_keepalive(),
            user_agent: default_user_agent(),
        }
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the idle pool size per host
    pub fn with_pool_max_idle(mut self, max_idle: usize) -> Self {
        self.pool_max_idle_per_host = max_idle;
        self
    }

    /// Base URL ending in `/v1`
    pub fn api_base(&self) -> String {
        normalize_base_url(&self.base_url)
    }

    /// Full chat completions endpoint
    pub fn chat_completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ConfigValidationError::MissingField("base_url"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigValidationError::InvalidUrl(url.to_string()));
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigValidationError::InvalidTimeout(self.connect_timeout));
        }
        Ok(())
    }

    /// Build the pooled client shared by every worker
    ///
    /// `authorization`, when present, is attached to every request as a
    /// default header.
    pub fn build_client(
        &self,
        authorization: Option<HeaderValue>,
    ) -> Result<Client, reqwest::Error> {
        let mut headers = HeaderMap::new();
        if let Some(mut value) = authorization {
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder()
            .pool_idle_timeout(self.pool_idle_timeout)
            .pool_max_idle_per_host(self.pool_max_idle_per_host)
            .connect_timeout(self.connect_timeout)
            .user_agent(&self.user_agent)
            .default_headers(headers);

        if let Some(keepalive) = self.tcp_keepalive {
            builder = builder.tcp_keepalive(keepalive);
        }

        builder.build()
    }
}
