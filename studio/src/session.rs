//! Session and transcript state.
//!
//! DESIGN
//! ======
//! One `GenerationSession` per submission. The stream consumer is its only
//! writer; everything else reads snapshots through `text()`/`status()`.
//! Status transitions are monotone — Idle → Streaming → {Complete, Failed} —
//! and terminal states are final; a new submission replaces the session as a
//! unit instead of rewinding it.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a conversation turn. Matches the relay's wire shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One prior turn sent along with a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub content: String,
}

/// Immutable generation request, serialized as the generate endpoint's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub history: Vec<HistoryTurn>,
}

/// One transcript entry shown in the conversation pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: &str) -> Self {
        Self { id: Uuid::new_v4(), role: Role::User, content: content.to_string() }
    }

    #[must_use]
    pub fn assistant(content: &str) -> Self {
        Self { id: Uuid::new_v4(), role: Role::Assistant, content: content.to_string() }
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Lifecycle of one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Streaming,
    Complete,
    Failed,
}

impl SessionStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }
}

/// The accumulated source buffer plus its lifecycle status.
///
/// `accumulated` is append-only while Streaming; its length never decreases
/// within a session.
#[derive(Debug)]
pub struct GenerationSession {
    accumulated: String,
    status: SessionStatus,
    started_at: Instant,
}

impl GenerationSession {
    #[must_use]
    pub fn new() -> Self {
        Self { accumulated: String::new(), status: SessionStatus::Idle, started_at: Instant::now() }
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.accumulated
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// Idle → Streaming. Ignored from any other state: terminal states are
    /// final and a live stream cannot restart.
    pub(crate) fn begin_streaming(&mut self) {
        if self.status == SessionStatus::Idle {
            self.status = SessionStatus::Streaming;
            self.started_at = Instant::now();
        }
    }

    /// Append decoded text. Only the consumer calls this, only while
    /// Streaming.
    pub(crate) fn append(&mut self, text: &str) {
        if self.status == SessionStatus::Streaming {
            self.accumulated.push_str(text);
        }
    }

    /// Streaming → Complete. Abrupt stream end without a transport error is
    /// indistinguishable from clean completion on the wire, so it lands here
    /// too.
    pub(crate) fn complete(&mut self) {
        if self.status == SessionStatus::Streaming {
            self.status = SessionStatus::Complete;
        }
    }

    /// {Idle, Streaming} → Failed. Partial text is retained but no longer
    /// trusted as complete.
    pub(crate) fn fail(&mut self) {
        if !self.status.is_terminal() {
            self.status = SessionStatus::Failed;
        }
    }
}

impl Default for GenerationSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
