//! LLM — multi-provider streaming adapter behind the generate relay.
//!
//! DESIGN
//! ======
//! The `LlmClient` enum dispatches to Anthropic or `OpenAI` based on
//! `LLM_PROVIDER`; both providers expose the same capability: given a system
//! instruction and prior turns, produce a lazy sequence of text fragments.
//! The relay forwards those fragments byte-for-byte without inspecting them.

pub mod anthropic;
pub mod config;
pub mod openai;
pub mod sse;
pub mod types;

use config::{LlmConfig, LlmProviderKind};
pub use types::LlmStream;
use types::{LlmError, Message, TextStream};

/// System instruction for component generation. The model must answer with
/// the bare component source so the client can treat the whole stream as one
/// file.
pub const SYSTEM_PROMPT: &str = r#"You are an expert React developer. Generate a single React functional component based on the user's request.

Rules:
- Output ONLY the React component code, no explanations or markdown
- Use TypeScript with proper types
- Use Tailwind CSS for all styling
- The component should be a default export named "GeneratedComponent"
- Do not include any imports - assume React is in scope
- Make the component self-contained and visually appealing
- Use modern React patterns (hooks, functional components)

Example output format:
export default function GeneratedComponent() {
  return (
    <div className="p-4">
      {/* component content */}
    </div>
  );
}"#;

// =============================================================================
// CLIENT DISPATCH
// =============================================================================

/// Concrete LLM client that dispatches to either Anthropic or OpenAI.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    inner: LlmProvider,
    model: String,
    max_tokens: u32,
}

enum LlmProvider {
    Anthropic(anthropic::AnthropicClient),
    OpenAi(openai::OpenAiClient),
}

impl LlmClient {
    /// Build an LLM client from environment variables (see
    /// [`LlmConfig::from_env`] for the variable list).
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from an already-parsed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let inner = match config.provider {
            LlmProviderKind::Anthropic => {
                LlmProvider::Anthropic(anthropic::AnthropicClient::new(config.api_key, config.timeouts)?)
            }
            LlmProviderKind::OpenAi => LlmProvider::OpenAi(openai::OpenAiClient::new(
                config.api_key,
                config.openai_base_url,
                config.timeouts,
            )?),
        };
        Ok(Self { inner, model: config.model, max_tokens: config.max_tokens })
    }
}

#[async_trait::async_trait]
impl LlmStream for LlmClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn stream_chat(&self, system: &str, messages: &[Message]) -> Result<TextStream, LlmError> {
        match &self.inner {
            LlmProvider::Anthropic(client) => {
                client.stream_chat(&self.model, self.max_tokens, system, messages).await
            }
            LlmProvider::OpenAi(client) => client.stream_chat(&self.model, self.max_tokens, system, messages).await,
        }
    }
}
