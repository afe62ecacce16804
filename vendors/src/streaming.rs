//! Server-Sent Events parsing for chat completion streams
//!
//! Turns a response byte stream into core [`StreamChunk`]s:
//!
//! ```text
//! data: {"choices":[{"delta":{"content":"Hello"}}]}
//!
//! data: {"choices":[{"delta":{},"finish_reason":"stop"}]}
//!
//! data: [DONE]
//! ```

use std::collections::VecDeque;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde::Deserialize;
use streambench_core::{ChunkStream, IssuerError, StreamChunk};

// ============================================================================
// SSE Parser
// ============================================================================

/// Maximum buffer size (1MB) to prevent unbounded memory growth from malformed streams.
const MAX_BUFFER_SIZE: usize = 1024 * 1024;

/// Incremental Server-Sent Events parser
///
/// Buffers incoming bytes and extracts complete events. Both `\n\n` and
/// `\r\n\r\n` terminate an event.
#[derive(Debug, Default)]
pub struct SseParser {
    buffer: String,
    truncated: bool,
}

impl SseParser {
    /// Create a new SSE parser
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed bytes into the parser and return any complete events
    ///
    /// Incomplete events are buffered for the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.push_str(&String::from_utf8_lossy(bytes));
        if self.buffer.contains('\r') {
            self.buffer = self.buffer.replace("\r\n", "\n");
        }

        if self.buffer.len() > MAX_BUFFER_SIZE {
            if !self.truncated {
                tracing::warn!(
                    max_bytes = MAX_BUFFER_SIZE,
                    "SSE buffer overflow, truncating; the stream is probably malformed"
                );
                self.truncated = true;
            }
            let mut target_start = self.buffer.len() - MAX_BUFFER_SIZE / 2;
            while !self.buffer.is_char_boundary(target_start) {
                target_start += 1;
            }
            let start = self.buffer[target_start..]
                .find('\n')
                .map(|pos| target_start + pos + 1)
                .unwrap_or(target_start);
            self.buffer = self.buffer[start..].to_string();
        }

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let raw: String = self.buffer.drain(..pos + 2).collect();
            if let Some(event) = parse_event(&raw) {
                events.push(event);
            }
            self.truncated = false;
        }
        events
    }

    /// Parse whatever is left once the transport has closed
    ///
    /// Servers sometimes omit the blank line after the final event.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let rest = std::mem::take(&mut self.buffer);
        self.truncated = false;
        parse_event(&rest)
    }

    /// Check if the parser has buffered data
    pub fn has_buffered_data(&self) -> bool {
        !self.buffer.trim().is_empty()
    }
}

fn parse_event(raw: &str) -> Option<SseEvent> {
    let mut data_lines = Vec::new();
    let mut event_type = None;

    for line in raw.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim_start().to_string());
        }
        // comments (":") plus id/retry fields carry nothing we measure
    }

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim() == "[DONE]" {
        return Some(SseEvent::Done);
    }

    Some(SseEvent::Data { data, event_type })
}

/// A single Server-Sent Event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Data event, usually a JSON payload
    Data {
        /// The event data
        data: String,
        /// Optional event type
        event_type: Option<String>,
    },
    /// End of stream marker (`[DONE]`)
    Done,
}

impl SseEvent {
    /// Returns true if this is a Done event
    pub fn is_done(&self) -> bool {
        matches!(self, SseEvent::Done)
    }
}

// ============================================================================
// Chunk decoding
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<ChoicePayload>,
    #[serde(default)]
    error: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ChoicePayload {
    #[serde(default)]
    delta: Option<DeltaPayload>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct DeltaPayload {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorPayload {
    Object { message: String },
    Text(String),
}

impl ErrorPayload {
    fn into_message(self) -> String {
        match self {
            ErrorPayload::Object { message } | ErrorPayload::Text(message) => message,
        }
    }
}

/// What one `data:` event decodes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// A chunk for the consumer
    Chunk(StreamChunk),
    /// The server reported an error inside the stream
    Error(String),
    /// Not a chat completion chunk
    Skip,
}

/// Decode one event payload
///
/// Reads `choices[0].delta.content`, `choices[0].delta.reasoning_content`
/// and `choices[0].finish_reason`. Payloads that are not valid JSON are
/// skipped.
pub fn parse_chunk(data: &str) -> Decoded {
    let payload: ChunkPayload = match serde_json::from_str(data) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::debug!(error = %err, "Skipping malformed stream event");
            return Decoded::Skip;
        }
    };

    if let Some(error) = payload.error {
        return Decoded::Error(error.into_message());
    }

    let Some(choice) = payload.choices.into_iter().next() else {
        // usage-only trailers and keepalives
        return Decoded::Skip;
    };
    let delta = choice.delta.unwrap_or_default();

    Decoded::Chunk(StreamChunk {
        content: delta.content,
        reasoning_content: delta.reasoning_content,
        finish_reason: choice.finish_reason,
    })
}

// ============================================================================
// Byte stream adapter
// ============================================================================

struct SseState<S> {
    bytes: S,
    parser: SseParser,
    pending: VecDeque<SseEvent>,
    closed: bool,
}

/// Adapt a response body into a core chunk stream
///
/// Ends at `[DONE]` or when the body closes. Transport errors and in-band
/// error payloads are yielded as errors, after which the stream ends.
pub fn sse_chunk_stream<S>(bytes: S) -> ChunkStream
where
    S: Stream<Item = Result<Bytes, reqwest::Error>> + Send + Unpin + 'static,
{
    let state = SseState {
        bytes,
        parser: SseParser::new(),
        pending: VecDeque::new(),
        closed: false,
    };

    Box::pin(futures::stream::unfold(state, |mut state| async move {
        loop {
            while let Some(event) = state.pending.pop_front() {
                match event {
                    SseEvent::Done => {
                        state.pending.clear();
                        state.closed = true;
                        return None;
                    }
                    SseEvent::Data { data, .. } => match parse_chunk(&data) {
                        Decoded::Chunk(chunk) => return Some((Ok(chunk), state)),
                        Decoded::Error(message) => {
                            state.pending.clear();
                            state.closed = true;
                            return Some((Err(IssuerError::Streaming(message)), state));
                        }
                        Decoded::Skip => {}
                    },
                }
            }

            if state.closed {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(bytes)) => {
                    let events = state.parser.feed(&bytes);
                    state.pending.extend(events);
                }
                Some(Err(err)) => {
                    state.closed = true;
                    return Some((Err(IssuerError::Http(err)), state));
                }
                None => {
                    state.closed = true;
                    state.pending.extend(state.parser.finish());
                }
            }
        }
    }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn data_of(event: &SseEvent) -> &str {
        match event {
            SseEvent::Data { data, .. } => data,
            SseEvent::Done => panic!("Expected Data event"),
        }
    }

    #[test]
    fn test_sse_parser_basic() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: {\"content\": \"hello\"}\n\n");

        assert_eq!(events.len(), 1);
        assert_eq!(data_of(&events[0]), "{\"content\": \"hello\"}");
    }

    #[test]
    fn test_sse_parser_done() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data: [DONE]\n\n");

        assert_eq!(events, vec![SseEvent::Done]);
        assert!(events[0].is_done());
    }

    #[test]
    fn test_sse_parser_partial() {
        let mut parser = SseParser::new();

        assert!(parser.feed(b"data: {\"content\":").is_empty());
        assert!(parser.has_buffered_data());

        let events = parser.feed(b" \"hello\"}\n\n");
        assert_eq!(events.len(), 1);
        assert!(!parser.has_buffered_data());
    }

    #[test]
    fn test_sse_parser_crlf_and_event_type() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"event: message\r\ndata: hi\r\n\r\ndata: [DONE]\r\n\r\n");

        assert_eq!(events.len(), 2);
        assert_eq!(
            events[0],
            SseEvent::Data {
                data: "hi".into(),
                event_type: Some("message".into())
            }
        );
        assert!(events[1].is_done());
    }

    #[test]
    fn test_sse_parser_multiline_and_no_space() {
        let mut parser = SseParser::new();
        let events = parser.feed(b"data:line1\ndata: line2\n\n");

        assert_eq!(data_of(&events[0]), "line1\nline2");
    }

    #[test]
    fn test_sse_parser_skips_comments_and_fieldless_events() {
        let mut parser = SseParser::new();
        let events = parser.feed(b": keepalive\n\nid: 7\nretry: 100\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_sse_parser_finish_flushes_unterminated_event() {
        let mut parser = SseParser::new();
        assert!(parser.feed(b"data: tail").is_empty());
        assert_eq!(data_of(&parser.finish().unwrap()), "tail");
        assert!(parser.finish().is_none());
    }

    #[test]
    fn test_sse_parser_invalid_utf8() {
        let mut parser = SseParser::new();
        let input: &[u8] = &[b'd', b'a', b't', b'a', b':', b' ', 0xFF, 0xFE, b'\n', b'\n'];
        let events = parser.feed(input);

        assert_eq!(events.len(), 1);
        assert!(data_of(&events[0]).contains('\u{FFFD}'));
    }

    #[test]
    fn test_parse_chunk_content_and_reasoning() {
        assert_eq!(
            parse_chunk(r#"{"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#),
            Decoded::Chunk(StreamChunk::content("Hello"))
        );
        assert_eq!(
            parse_chunk(r#"{"choices":[{"delta":{"reasoning_content":"hmm"}}]}"#),
            Decoded::Chunk(StreamChunk::reasoning("hmm"))
        );
    }

    #[test]
    fn test_parse_chunk_finish_reason() {
        assert_eq!(
            parse_chunk(r#"{"choices":[{"delta":{},"finish_reason":"length"}]}"#),
            Decoded::Chunk(StreamChunk::finish("length"))
        );
    }

    #[test]
    fn test_parse_chunk_skips_malformed_and_choiceless() {
        assert_eq!(parse_chunk("not valid json"), Decoded::Skip);
        assert_eq!(
            parse_chunk(r#"{"choices":[],"usage":{"completion_tokens":3}}"#),
            Decoded::Skip
        );
    }

    #[test]
    fn test_parse_chunk_error_payloads() {
        assert_eq!(
            parse_chunk(r#"{"error":{"message":"rate limit exceeded","code":429}}"#),
            Decoded::Error("rate limit exceeded".into())
        );
        assert_eq!(
            parse_chunk(r#"{"error":"model overloaded"}"#),
            Decoded::Error("model overloaded".into())
        );
    }

    fn body(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Unpin {
        futures::stream::iter(
            parts
                .iter()
                .map(|part| Ok(Bytes::from_static(part.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_sse_chunk_stream_split_across_reads() {
        let stream = sse_chunk_stream(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"He",
            "llo\"}}]}\n\ndata: not json\n\n",
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\ndata: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"ignored\"}}]}\n\n",
        ]));

        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].as_ref().unwrap(), &StreamChunk::content("Hello"));
        assert!(chunks[1].as_ref().unwrap().is_final());
    }

    #[tokio::test]
    async fn test_sse_chunk_stream_clean_close_without_done() {
        let stream = sse_chunk_stream(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}",
        ]));

        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.is_ok()));
    }

    #[tokio::test]
    async fn test_sse_chunk_stream_in_band_error_ends_stream() {
        let stream = sse_chunk_stream(body(&[
            "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
            "data: {\"error\":{\"message\":\"Too Many Requests\"}}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"b\"}}]}\n\n",
        ]));

        let chunks: Vec<_> = stream.collect().await;
        assert_eq!(chunks.len(), 2);
        let err = chunks[1].as_ref().unwrap_err();
        assert_eq!(err.to_error_kind(), streambench_core::ErrorKind::RateLimit);
    }
}
