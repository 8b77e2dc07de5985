//! LLM types — provider-neutral message types and errors.
//!
//! Shared by the Anthropic and `OpenAI` streaming clients. The relay never
//! inspects fragments; it only forwards them, so the only content type here
//! is plain text.

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by LLM client operations.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The required API key environment variable is not set.
    #[error("missing API key: env var {var} not set")]
    MissingApiKey { var: String },

    /// The HTTP request to the LLM provider failed.
    #[error("API request failed: {0}")]
    ApiRequest(String),

    /// The LLM provider returned a non-success HTTP status.
    #[error("API response error: status {status}")]
    ApiResponse { status: u16, body: String },

    /// The streaming body failed or carried an in-band error event.
    #[error("stream failed: {0}")]
    Stream(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

// =============================================================================
// MESSAGES
// =============================================================================

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation turn sent to the model. Matches the wire shape of the
/// generate endpoint's `history` entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

// =============================================================================
// STREAMING CAPABILITY
// =============================================================================

/// A lazy, finite, non-restartable sequence of text fragments.
///
/// The stream may fail before producing any fragment or mid-sequence; once a
/// fragment has been yielded it is never revised.
pub type TextStream = BoxStream<'static, Result<String, LlmError>>;

/// Streaming chat capability, object-safe so handlers and tests can share
/// fakes behind `Arc<dyn LlmStream>`.
#[async_trait::async_trait]
pub trait LlmStream: Send + Sync {
    /// Model identifier, for logging.
    fn model(&self) -> &str;

    /// Open exactly one upstream streaming call and return its fragments.
    ///
    /// # Errors
    ///
    /// Fails without yielding any fragment when the request cannot be made or
    /// the provider rejects it outright.
    async fn stream_chat(&self, system: &str, messages: &[Message]) -> Result<TextStream, LlmError>;
}
