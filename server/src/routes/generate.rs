//! Stream relay: one generation request in, one chunked byte stream out.
//!
//! DESIGN
//! ======
//! The handler opens exactly one upstream streaming call and forwards each
//! fragment's raw UTF-8 bytes into the response body as they arrive — no
//! buffering, batching, transformation, or framing. The body is the plain
//! concatenation of fragments; stream close is the only end marker.
//!
//! Failure policy (documented, deliberate): if the upstream fails after the
//! first fragment was flushed, the partial output is surfaced and the body
//! ends cleanly after a warn log. Flushed bytes cannot be retracted, and the
//! wire carries no in-band error signal, so clients must treat any
//! end-of-stream as "complete with whatever was received".

use std::convert::Infallible;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::http::{StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::{StreamExt, future};
use serde::Deserialize;

use crate::llm::SYSTEM_PROMPT;
use crate::llm::types::{LlmError, Message, Role};
use crate::state::AppState;

/// Request body for `POST /api/generate`.
#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    #[serde(default)]
    pub history: Vec<Message>,
}

/// `POST /api/generate` — relay one generation as chunked plain text.
pub async fn generate(State(state): State<AppState>, Json(request): Json<GenerateRequest>) -> Response {
    let prompt = request.prompt.trim();
    if prompt.is_empty() {
        // Rejected before any upstream call is made.
        return (StatusCode::UNPROCESSABLE_ENTITY, "prompt must not be empty").into_response();
    }

    let Some(llm) = state.llm.clone() else {
        return (StatusCode::SERVICE_UNAVAILABLE, "generation backend not configured").into_response();
    };

    let mut messages = request.history;
    messages.push(Message { role: Role::User, content: prompt.to_string() });

    let fragments = match llm.stream_chat(SYSTEM_PROMPT, &messages).await {
        Ok(fragments) => fragments,
        Err(e) => {
            tracing::warn!(error = %e, "upstream call failed before streaming");
            return upstream_error_response(&e);
        }
    };

    // Fragments already flushed stay flushed; an upstream failure mid-stream
    // just ends the body after the last good fragment.
    let body_stream = fragments
        .take_while(|item| {
            if let Err(e) = item {
                tracing::warn!(error = %e, "upstream failed mid-stream; closing response with partial output");
            }
            future::ready(item.is_ok())
        })
        .filter_map(|item| future::ready(item.ok().map(|text| Ok::<_, Infallible>(Bytes::from(text)))));

    // Transfer-Encoding: chunked is applied by hyper for streaming bodies.
    ([(CONTENT_TYPE, "text/plain; charset=utf-8")], Body::from_stream(body_stream)).into_response()
}

fn upstream_error_response(error: &LlmError) -> Response {
    let status = match error {
        LlmError::ApiResponse { status: 429, .. } => StatusCode::TOO_MANY_REQUESTS,
        _ => StatusCode::BAD_GATEWAY,
    };
    (status, "generation failed").into_response()
}

#[cfg(test)]
#[path = "generate_test.rs"]
mod tests;
