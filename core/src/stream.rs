//! Stream consumption and first-token timing

use crate::traits::{ChunkStream, IssuerError};
use futures::StreamExt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::trace;

/// What was observed while draining one response stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamMeasurement {
    /// Arrival time of the first chunk with content or reasoning content
    pub first_content_at: Option<Instant>,

    /// Chunks that carried content or reasoning content
    pub content_units: u64,

    /// Finish marker, if the stream ended with one
    pub finish_reason: Option<String>,
}

impl StreamMeasurement {
    /// Time to first content relative to `start`
    pub fn ttft_since(&self, start: Instant) -> Option<Duration> {
        self.first_content_at
            .map(|at| at.saturating_duration_since(start))
    }
}

/// Drains a [`ChunkStream`] and measures it
///
/// The consumer itself applies no deadline. Callers wrap stream opening and
/// consumption together in one `tokio::time::timeout`, so a timeout drops the
/// partially consumed measurement.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamConsumer;

impl StreamConsumer {
    /// Create a consumer
    pub fn new() -> Self {
        Self
    }

    /// Consume chunks in arrival order until a finish marker or end of stream
    ///
    /// End of stream without a finish marker is a normal completion. Any
    /// chunk error fails the whole consumption.
    pub async fn consume(&self, mut stream: ChunkStream) -> Result<StreamMeasurement, IssuerError> {
        let mut measurement = StreamMeasurement::default();

        while let Some(item) = stream.next().await {
            let chunk = item?;

            if chunk.has_content() {
                if measurement.first_content_at.is_none() {
                    measurement.first_content_at = Some(Instant::now());
                }
                measurement.content_units += 1;
            }

            if chunk.is_final() {
                trace!(
                    finish_reason = chunk.finish_reason.as_deref(),
                    content_units = measurement.content_units,
                    "stream finished"
                );
                measurement.finish_reason = chunk.finish_reason;
                break;
            }
        }

        Ok(measurement)
    }
}
