//! Studio: wires transcript, session, scheduler, and preview together.
//!
//! DESIGN
//! ======
//! One logical thread of control. The consumer loop is the session's only
//! writer; the scheduler and preview controller see read-only snapshots from
//! its synchronous publishes. Exactly one consumer loop runs per session —
//! submissions are refused while one is streaming, so two loops can never
//! race on the shared display. A new submission discards the previous
//! session as a unit: buffer, highlight state, and preview all reset
//! synchronously before the first byte of the new stream arrives.

use crate::clipboard::Clipboard;
use crate::consumer::{SessionObserver, StreamConsumer};
use crate::highlight::{HighlightResult, HighlightScheduler, Highlighter};
use crate::preview::{PreviewController, RenderSandbox};
use crate::session::{
    ChatMessage, GenerationRequest, GenerationSession, HistoryTurn, SessionStatus,
};
use crate::transport::{GenerationTransport, TransportError};

/// Transcript wording for terminal states, independent of the code buffer.
pub const SUCCESS_MESSAGE: &str =
    "Component generated successfully! Check the Code tab to see the result.";
pub const FAILURE_MESSAGE: &str =
    "Sorry, there was an error generating the component. Please try again.";

#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Rejected before any network call; no session is created.
    #[error("prompt must not be empty")]
    EmptyPrompt,

    /// A generation is already streaming; resubmission is disabled until it
    /// reaches a terminal state.
    #[error("a generation is already streaming")]
    Busy,

    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Client-side front-end state for one conversation.
pub struct Studio<H: Highlighter, S: RenderSandbox> {
    transcript: Vec<ChatMessage>,
    session: GenerationSession,
    scheduler: HighlightScheduler,
    preview: PreviewController,
    highlighter: H,
    sandbox: S,
}

impl<H: Highlighter, S: RenderSandbox> Studio<H, S> {
    pub fn new(highlighter: H, sandbox: S) -> Self {
        Self {
            transcript: Vec::new(),
            session: GenerationSession::new(),
            scheduler: HighlightScheduler::new(),
            preview: PreviewController::new(),
            highlighter,
            sandbox,
        }
    }

    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    #[must_use]
    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    #[must_use]
    pub fn preview(&self) -> &PreviewController {
        &self.preview
    }

    #[must_use]
    pub fn highlight(&self) -> &HighlightScheduler {
        &self.scheduler
    }

    #[must_use]
    pub fn sandbox(&self) -> &S {
        &self.sandbox
    }

    /// The valid rendering, or `None` while the raw buffer should be shown.
    #[must_use]
    pub fn display_markup(&self) -> Option<&str> {
        self.scheduler.rendered().map(|r| r.markup.as_str())
    }

    /// Submit one prompt and consume its stream to a terminal state.
    ///
    /// # Errors
    ///
    /// `EmptyPrompt` and `Busy` are rejected before the transport is
    /// touched; `Transport` means the stream could not be opened (a turn was
    /// still recorded as failed).
    pub async fn submit<T>(&mut self, transport: &T, prompt: &str) -> Result<SessionStatus, StudioError>
    where
        T: GenerationTransport + ?Sized,
    {
        self.submit_with(transport, prompt, |_, _| {}).await
    }

    /// [`Studio::submit`] with a per-update callback for live display,
    /// invoked synchronously after each chunk is absorbed.
    pub async fn submit_with<T, F>(
        &mut self,
        transport: &T,
        prompt: &str,
        mut on_update: F,
    ) -> Result<SessionStatus, StudioError>
    where
        T: GenerationTransport + ?Sized,
        F: FnMut(&str, SessionStatus),
    {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(StudioError::EmptyPrompt);
        }
        if self.session.status() == SessionStatus::Streaming {
            return Err(StudioError::Busy);
        }

        let history: Vec<HistoryTurn> = self
            .transcript
            .iter()
            .map(|m| HistoryTurn { role: m.role, content: m.content.clone() })
            .collect();
        let request = GenerationRequest { prompt: prompt.to_string(), history };
        self.transcript.push(ChatMessage::user(prompt));

        // Fresh session, and synchronous resets: stale highlight output or a
        // previous turn's preview must be gone before the first byte lands.
        self.session = GenerationSession::new();
        self.scheduler.reset();
        self.preview.reset();

        let stream = match transport.stream_generate(&request).await {
            Ok(stream) => stream,
            Err(error) => {
                self.session.fail();
                self.transcript.push(ChatMessage::assistant(FAILURE_MESSAGE));
                return Err(StudioError::Transport(error));
            }
        };

        let mut fan_out = FanOut {
            scheduler: &mut self.scheduler,
            highlighter: &self.highlighter,
            preview: &mut self.preview,
            sandbox: &mut self.sandbox,
            on_update: &mut on_update,
        };
        let status = StreamConsumer::run(stream, &mut self.session, &mut fan_out).await;

        let message = if status == SessionStatus::Complete { SUCCESS_MESSAGE } else { FAILURE_MESSAGE };
        self.transcript.push(ChatMessage::assistant(message));
        Ok(status)
    }

    /// Copy the accumulated source. Clipboard failure is swallowed by
    /// contract.
    pub fn copy_code(&self, clipboard: &mut dyn Clipboard) {
        if let Err(error) = clipboard.write_text(self.session.text()) {
            tracing::debug!(error = %error, "clipboard write failed; ignored");
        }
    }

    #[cfg(test)]
    pub(crate) fn force_streaming_for_tests(&mut self) {
        self.session = GenerationSession::new();
        self.session.begin_streaming();
    }
}

/// Synchronous fan-out from the consumer to every observer, in a fixed
/// order: highlight first, preview second, front-end callback last.
struct FanOut<'a, F> {
    scheduler: &'a mut HighlightScheduler,
    highlighter: &'a dyn Highlighter,
    preview: &'a mut PreviewController,
    sandbox: &'a mut dyn RenderSandbox,
    on_update: &'a mut F,
}

impl<F: FnMut(&str, SessionStatus)> SessionObserver for FanOut<'_, F> {
    fn buffer_changed(&mut self, text: &str, status: SessionStatus) {
        if let Some(job) = self.scheduler.observe(text, status) {
            match self.highlighter.render(&job.source) {
                Ok(markup) => {
                    let result = HighlightResult {
                        generation: job.generation,
                        source_len: job.source.chars().count(),
                        markup,
                    };
                    self.scheduler.apply(result);
                }
                Err(error) => {
                    tracing::debug!(error = %error, "highlight render failed; raw text shown");
                }
            }
        }
        self.preview.observe(text, status, self.sandbox);
        (self.on_update)(text, status);
    }
}

#[cfg(test)]
#[path = "studio_test.rs"]
mod tests;
