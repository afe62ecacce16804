//! Per-request outcome types

pub use crate::error::ErrorKind;

use crate::request::WorkItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

/// Status of one request: success or a classified failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseStatus {
    /// Stream completed
    Success,
    /// Request failed
    Error(ErrorKind),
}

impl ResponseStatus {
    /// Check if this status indicates success
    pub fn is_success(&self) -> bool {
        matches!(self, ResponseStatus::Success)
    }

    /// Error kind, if this is a failure
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            ResponseStatus::Success => None,
            ResponseStatus::Error(kind) => Some(*kind),
        }
    }

    /// Flat label: `success` or the error kind label
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseStatus::Success => "success",
            ResponseStatus::Error(kind) => kind.as_str(),
        }
    }
}

impl fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ResponseStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ResponseStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        if label == "success" {
            return Ok(ResponseStatus::Success);
        }
        label
            .parse::<ErrorKind>()
            .map(ResponseStatus::Error)
            .map_err(serde::de::Error::custom)
    }
}

/// Result of one work item
///
/// Produced exactly once per work item by the worker that claimed it and
/// never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOutcome {
    /// Work item this outcome belongs to
    pub work_item: WorkItem,

    /// Success or failure kind
    pub status: ResponseStatus,

    /// Wall-clock time from issuing the request to the end of the stream
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,

    /// Time to the first content or reasoning chunk
    #[serde(default, with = "humantime_serde", skip_serializing_if = "Option::is_none")]
    pub ttft: Option<Duration>,

    /// Chunks that carried content or reasoning content
    pub token_count: u64,

    /// Failure detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// When the outcome was recorded
    pub completed_at: DateTime<Utc>,
}

impl RequestOutcome {
    /// A completed stream
    pub fn success(
        work_item: WorkItem,
        elapsed: Duration,
        ttft: Option<Duration>,
        token_count: u64,
    ) -> Self {
        Self {
            work_item,
            status: ResponseStatus::Success,
            elapsed,
            ttft,
            token_count,
            error_message: None,
            completed_at: Utc::now(),
        }
    }

    /// A failed request; partial stream progress is not kept
    pub fn failure(
        work_item: WorkItem,
        kind: ErrorKind,
        elapsed: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            work_item,
            status: ResponseStatus::Error(kind),
            elapsed,
            ttft: None,
            token_count: 0,
            error_message: Some(message.into()),
            completed_at: Utc::now(),
        }
    }

    /// Check if the request succeeded
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Error kind, if the request failed
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.status.error_kind()
    }

    /// Elapsed time in seconds
    pub fn latency_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    /// Time to first token in seconds
    pub fn ttft_secs(&self) -> Option<f64> {
        self.ttft.map(|d| d.as_secs_f64())
    }

    /// Content units per second of elapsed time
    ///
    /// `None` for failures. A zero elapsed time yields `0.0`.
    pub fn tokens_per_second(&self) -> Option<f64> {
        if !self.is_success() {
            return None;
        }
        let secs = self.latency_secs();
        if secs > 0.0 {
            Some(self.token_count as f64 / secs)
        } else {
            Some(0.0)
        }
    }
}
