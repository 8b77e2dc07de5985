//! Anthropic Messages API client, streaming mode.
//!
//! Thin HTTP wrapper for `/v1/messages` with `stream: true`. SSE framing
//! lives in [`super::sse`]; per-event delta extraction is pure
//! (`delta_text`) for testability.

use std::time::Duration;

use futures::StreamExt;
use futures::stream;

use super::config::LlmTimeouts;
use super::sse::{SseDecoder, SseEvent};
use super::types::{LlmError, Message, TextStream};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";

// =============================================================================
// CLIENT
// =============================================================================

pub struct AnthropicClient {
    http: reqwest::Client,
    api_key: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key })
    }

    /// Open one streaming chat call and return its text fragments.
    pub async fn stream_chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<TextStream, LlmError> {
        let body = ApiRequest { model, max_tokens, system, messages, stream: true };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        if status != 200 {
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::ApiResponse { status, body: text });
        }

        let mut decoder = SseDecoder::new();
        let fragments = response
            .bytes_stream()
            .map(move |chunk| -> Result<Vec<String>, LlmError> {
                let chunk = chunk.map_err(|e| LlmError::Stream(e.to_string()))?;
                let mut texts = Vec::new();
                for event in decoder.feed(&chunk) {
                    if let Some(text) = delta_text(&event)? {
                        texts.push(text);
                    }
                }
                Ok(texts)
            })
            .map(|result| match result {
                Ok(texts) => stream::iter(texts.into_iter().map(Ok).collect::<Vec<_>>()),
                Err(e) => stream::iter(vec![Err(e)]),
            })
            .flatten()
            .boxed();

        Ok(fragments)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(serde::Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
    stream: bool,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum StreamEvent {
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: Delta },
    #[serde(rename = "error")]
    Error { error: ApiErrorBody },
    /// Everything else: message_start, ping, content_block_start/stop,
    /// message_delta, message_stop. None of them carry generated text.
    #[serde(other)]
    Other,
}

#[derive(serde::Deserialize)]
#[serde(tag = "type")]
enum Delta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(serde::Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "type")]
    kind: String,
    message: String,
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract generated text from one SSE event.
///
/// Only `content_block_delta`/`text_delta` events yield text. In-band
/// `error` events (e.g. `overloaded_error` mid-stream) become
/// [`LlmError::Stream`]; unknown or unparsable events are ignored rather
/// than failing the whole stream.
fn delta_text(event: &SseEvent) -> Result<Option<String>, LlmError> {
    if event.data.is_empty() {
        return Ok(None);
    }
    let Ok(parsed) = serde_json::from_str::<StreamEvent>(&event.data) else {
        return Ok(None);
    };
    match parsed {
        StreamEvent::ContentBlockDelta { delta: Delta::TextDelta { text } } => Ok(Some(text)),
        StreamEvent::Error { error } => Err(LlmError::Stream(format!("{}: {}", error.kind, error.message))),
        StreamEvent::ContentBlockDelta { delta: Delta::Other } | StreamEvent::Other => Ok(None),
    }
}

#[cfg(test)]
#[path = "anthropic_test.rs"]
mod tests;
