//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! relay is stateless across requests — history arrives with every request —
//! so the only shared resource is the LLM client.

use std::sync::Arc;

use crate::llm::LlmStream;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the client is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    /// `None` when no provider is configured; the generate endpoint then
    /// answers 503 instead of panicking at startup.
    pub llm: Option<Arc<dyn LlmStream>>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmStream>>) -> Self {
        Self { llm }
    }
}
