//! OpenAI-compatible chat completions issuer
//!
//! Works against any server that speaks the OpenAI streaming chat API
//! (vLLM, SGLang, Ollama's compatibility layer, hosted gateways).

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde::Serialize;
use streambench_core::{ChunkStream, GenerationRequest, IssuerError, Message, RequestIssuer};
use tracing::debug;

use crate::config::IssuerConfig;
use crate::streaming::sse_chunk_stream;

/// Request body for `POST /chat/completions`
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message>,
    max_tokens: u32,
    stream: bool,
}

/// Longest error body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Streaming issuer for OpenAI-compatible endpoints
///
/// Holds one pooled `reqwest::Client` shared by every worker. The
/// authorization header, if any, is resolved before construction and
/// attached to the client as a default header.
#[derive(Debug, Clone)]
pub struct OpenAiIssuer {
    client: Client,
    endpoint: String,
}

impl OpenAiIssuer {
    /// Build an issuer from `config`
    ///
    /// # Errors
    /// Fails if the configuration is invalid or the client cannot be built.
    pub fn new(config: &IssuerConfig, authorization: Option<HeaderValue>) -> Result<Self, IssuerError> {
        config
            .validate()
            .map_err(|e| IssuerError::Config(e.to_string()))?;
        let client = config.build_client(authorization)?;
        Ok(Self {
            client,
            endpoint: config.chat_completions_url(),
        })
    }

    /// Issuer sharing an existing client
    pub fn with_client(client: Client, config: &IssuerConfig) -> Self {
        Self {
            client,
            endpoint: config.chat_completions_url(),
        }
    }

    /// Chat completions URL requests are sent to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn truncate_body(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[async_trait]
impl RequestIssuer for OpenAiIssuer {
    fn issuer_name(&self) -> &str {
        "openai"
    }

    async fn open_stream(&self, request: &GenerationRequest) -> Result<ChunkStream, IssuerError> {
        let body = ChatCompletionRequest {
            model: &request.model,
            messages: request.messages(),
            max_tokens: request.max_output_tokens,
            stream: true,
        };

        debug!(
            work_item = %request.work_item,
            model = %request.model,
            max_tokens = request.max_output_tokens,
            "Opening chat completion stream"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let reason = status.canonical_reason().unwrap_or("unknown status");
            let message = if text.trim().is_empty() {
                reason.to_string()
            } else {
                format!("{reason}: {}", truncate_body(text.trim()))
            };
            return Err(IssuerError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(sse_chunk_stream(response.bytes_stream()))
    }
}
