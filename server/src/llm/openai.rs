//! OpenAI-compatible API client, streaming mode.
//!
//! Uses `/chat/completions` with `stream: true`, which also covers the many
//! OpenAI-compatible providers reachable through `LLM_OPENAI_BASE_URL`.

use std::time::Duration;

use futures::StreamExt;
use futures::stream;

use super::config::LlmTimeouts;
use super::sse::{SseDecoder, SseEvent};
use super::types::{LlmError, Message, Role, TextStream};

const DONE_SENTINEL: &str = "[DONE]";

// =============================================================================
// CLIENT
// =============================================================================

pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, base_url: String, timeouts: LlmTimeouts) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key, base_url })
    }

    /// Open one streaming chat call and return its text fragments.
    pub async fn stream_chat(
        &self,
        model: &str,
        max_tokens: u32,
        system: &str,
        messages: &[Message],
    ) -> Result<TextStream, LlmError> {
        let msgs = build_messages(system, messages);
        let body = ApiRequest { model, max_tokens, messages: &msgs, stream: true };

        let url = format!("{}/chat/completions", self.base_url);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
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
                Ok(decoder.feed(&chunk).iter().filter_map(delta_text).collect())
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
    messages: &'a [WireMessage<'a>],
    stream: bool,
}

#[derive(serde::Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(serde::Deserialize)]
struct StreamChunk {
    choices: Vec<Choice>,
}

#[derive(serde::Deserialize)]
struct Choice {
    delta: ChoiceDelta,
}

#[derive(serde::Deserialize)]
struct ChoiceDelta {
    content: Option<String>,
}

fn build_messages<'a>(system: &'a str, messages: &'a [Message]) -> Vec<WireMessage<'a>> {
    let mut out = Vec::with_capacity(messages.len() + 1);
    out.push(WireMessage { role: "system", content: system });
    for message in messages {
        let role = match message.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        out.push(WireMessage { role, content: &message.content });
    }
    out
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract generated text from one SSE event.
///
/// The `[DONE]` sentinel, role-only deltas, and unparsable payloads all yield
/// nothing; the stream simply closes after `[DONE]`.
fn delta_text(event: &SseEvent) -> Option<String> {
    if event.data == DONE_SENTINEL {
        return None;
    }
    let chunk: StreamChunk = serde_json::from_str(&event.data).ok()?;
    chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
#[path = "openai_test.rs"]
mod tests;
