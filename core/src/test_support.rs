//! Mock issuers and samplers shared by the worker, orchestrator and probe tests

use crate::request::GenerationRequest;
use crate::traits::{ChunkStream, IssuerError, RequestIssuer, Sampler, StreamChunk};

use async_trait::async_trait;
use futures::stream;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Mock Sampler
// ============================================================================

pub(crate) struct FixedSampler {
    prompt: String,
}

impl FixedSampler {
    pub(crate) fn new(prompt: &str) -> Self {
        Self {
            prompt: prompt.to_string(),
        }
    }
}

impl Sampler for FixedSampler {
    fn name(&self) -> &str {
        "fixed"
    }

    fn sample(&self) -> String {
        self.prompt.clone()
    }
}

// ============================================================================
// Scripted Issuer
// ============================================================================

/// What the scripted issuer does for one request
#[derive(Debug, Clone)]
pub(crate) enum Script {
    /// Emit `units` content chunks, each after `chunk_delay`, then a finish chunk
    Stream { units: usize, chunk_delay: Duration },
    /// Open the stream but never yield a chunk
    Hang,
    /// Refuse to open the stream
    FailOpen { status: u16, message: String },
    /// Emit `units` content chunks then break with a transport error
    FailMidStream { units: usize, message: String },
}

impl Script {
    pub(crate) fn stream(units: usize, total: Duration) -> Self {
        let per_chunk = if units == 0 {
            total
        } else {
            total / units as u32
        };
        Script::Stream {
            units,
            chunk_delay: per_chunk,
        }
    }

    pub(crate) fn fail(status: u16, message: &str) -> Self {
        Script::FailOpen {
            status,
            message: message.to_string(),
        }
    }
}

/// Receives the request, its call index and the number of open streams
/// including this one
type ScriptFn = dyn Fn(&GenerationRequest, usize, usize) -> Script + Send + Sync;

/// Issuer whose behavior per request comes from a closure
///
/// Tracks how many streams are open at once so tests can assert the
/// concurrency bound.
pub(crate) struct ScriptedIssuer {
    script: Box<ScriptFn>,
    calls: AtomicUsize,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl ScriptedIssuer {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(&GenerationRequest, usize) -> Script + Send + Sync + 'static,
    {
        Self::with_script(Box::new(
            move |request: &GenerationRequest, index: usize, _open: usize| script(request, index),
        ))
    }

    /// Behavior depends on how many streams are open, like a server that
    /// degrades under load
    pub(crate) fn by_load<F>(script: F) -> Self
    where
        F: Fn(usize, usize) -> Script + Send + Sync + 'static,
    {
        Self::with_script(Box::new(
            move |_: &GenerationRequest, index: usize, open: usize| script(open, index),
        ))
    }

    fn with_script(script: Box<ScriptFn>) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Every request streams `units` chunks over `total`
    pub(crate) fn uniform(units: usize, total: Duration) -> Self {
        Self::new(move |_, _| Script::stream(units, total))
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

/// Counts one open request until dropped
struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn enter(in_flight: Arc<AtomicUsize>, max_in_flight: &AtomicUsize) -> Self {
        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { in_flight }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

fn chunk_stream(
    units: usize,
    chunk_delay: Duration,
    failure: Option<String>,
    guard: InFlightGuard,
) -> ChunkStream {
    Box::pin(stream::unfold(
        (0usize, guard, failure),
        move |(i, guard, failure)| async move {
            if i < units {
                tokio::time::sleep(chunk_delay).await;
                return Some((Ok(StreamChunk::content("tok")), (i + 1, guard, failure)));
            }
            if i > units {
                return None;
            }
            let item = match &failure {
                Some(message) => Err(IssuerError::Streaming(message.clone())),
                None => Ok(StreamChunk::finish("stop")),
            };
            Some((item, (i + 1, guard, failure)))
        },
    ))
}

fn hanging_stream(guard: InFlightGuard) -> ChunkStream {
    Box::pin(stream::unfold(guard, |guard| async move {
        std::future::pending::<()>().await;
        Some((Ok(StreamChunk::default()), guard))
    }))
}

#[async_trait]
impl RequestIssuer for ScriptedIssuer {
    fn issuer_name(&self) -> &str {
        "scripted"
    }

    async fn open_stream(&self, request: &GenerationRequest) -> Result<ChunkStream, IssuerError> {
        let index = self.calls.fetch_add(1, Ordering::SeqCst);
        let guard = InFlightGuard::enter(self.in_flight.clone(), &self.max_in_flight);
        let open = self.in_flight.load(Ordering::SeqCst);

        match (self.script)(request, index, open) {
            Script::Stream { units, chunk_delay } => {
                Ok(chunk_stream(units, chunk_delay, None, guard))
            }
            Script::Hang => Ok(hanging_stream(guard)),
            Script::FailOpen { status, message } => {
                drop(guard);
                Err(IssuerError::Status { status, message })
            }
            Script::FailMidStream { units, message } => Ok(chunk_stream(
                units,
                Duration::from_millis(1),
                Some(message),
                guard,
            )),
        }
    }
}
