//! Highlight scheduler: keeps the rendered code fresh without re-parsing on
//! every chunk.
//!
//! DESIGN
//! ======
//! Re-highlighting cost scales with buffer size, so recompute is triggered by
//! *growth* — a character-count budget, never a timer. A stalled stream does
//! not spin; a fast stream never starves the display for more than
//! [`RECOMPUTE_THRESHOLD`] characters. Stream end always recomputes.
//!
//! Render jobs resolve asynchronously and may finish out of submission
//! order. Every job carries a strictly increasing generation; a result is
//! applied only if its generation exceeds the highest applied so far, so a
//! slow job for older, shorter text can never overwrite a newer rendering.
//! Emptying the buffer (new session) resets the displayed state immediately
//! and synchronously, dooming every in-flight job by advancing the applied
//! watermark past them.

use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;
use syntect::util::{LinesWithEndings, as_24_bit_terminal_escaped};

use crate::session::SessionStatus;

/// Growth budget, in characters, between recomputes while streaming.
pub const RECOMPUTE_THRESHOLD: usize = 50;

/// An asynchronous render request against a snapshot of the buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightJob {
    pub generation: u64,
    pub source: String,
}

/// The resolved rendering for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightResult {
    pub generation: u64,
    pub source_len: usize,
    /// Opaque pre-rendered representation (ANSI escapes in this front-end).
    pub markup: String,
}

#[derive(Debug, thiserror::Error)]
pub enum HighlightError {
    #[error("render failed: {0}")]
    Render(String),
}

/// Renders source into the opaque markup shown to the user.
pub trait Highlighter {
    /// # Errors
    ///
    /// Fails when the underlying renderer rejects the source.
    fn render(&self, source: &str) -> Result<String, HighlightError>;
}

// =============================================================================
// SCHEDULER
// =============================================================================

/// Decides when to recompute and which results are still valid to display.
#[derive(Debug, Default)]
pub struct HighlightScheduler {
    last_computed_len: usize,
    next_generation: u64,
    applied_generation: u64,
    displayed: Option<HighlightResult>,
}

impl HighlightScheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Observe a buffer update; returns a render job when a recompute is due.
    ///
    /// `last_computed_len` is recorded at issue time — before the job
    /// resolves — so a slow in-flight job does not cause the next update to
    /// trigger redundantly.
    pub fn observe(&mut self, text: &str, status: SessionStatus) -> Option<HighlightJob> {
        let len = text.chars().count();
        if len == 0 {
            // Synchronous reset: stale output from a previous session must
            // never appear under an emptied display.
            self.reset();
            return None;
        }

        let grown = len.saturating_sub(self.last_computed_len) > RECOMPUTE_THRESHOLD;
        if status == SessionStatus::Streaming && !grown {
            return None;
        }

        self.last_computed_len = len;
        self.next_generation += 1;
        Some(HighlightJob { generation: self.next_generation, source: text.to_string() })
    }

    /// Apply a resolved render. Returns whether it became the displayed
    /// rendering; stale results (generation at or below the applied
    /// watermark) are dropped silently.
    pub fn apply(&mut self, result: HighlightResult) -> bool {
        if result.generation <= self.applied_generation {
            return false;
        }
        self.applied_generation = result.generation;
        self.displayed = Some(result);
        true
    }

    /// Clear the display and doom every in-flight job. Synchronous.
    pub fn reset(&mut self) {
        self.last_computed_len = 0;
        self.applied_generation = self.next_generation;
        self.displayed = None;
    }

    /// The current valid rendering, if any. While `None` the caller shows
    /// the raw text verbatim so the pane is never blank.
    #[must_use]
    pub fn rendered(&self) -> Option<&HighlightResult> {
        self.displayed.as_ref()
    }
}

// =============================================================================
// SYNTECT RENDERER
// =============================================================================

/// Production highlighter: syntect with 24-bit terminal escapes.
pub struct SyntectHighlighter {
    syntax_set: SyntaxSet,
    theme: Theme,
}

impl SyntectHighlighter {
    #[must_use]
    pub fn new() -> Self {
        let syntax_set = SyntaxSet::load_defaults_newlines();
        let theme = ThemeSet::load_defaults()
            .themes
            .get("base16-ocean.dark")
            .cloned()
            .unwrap_or_default();
        Self { syntax_set, theme }
    }
}

impl Default for SyntectHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl Highlighter for SyntectHighlighter {
    fn render(&self, source: &str) -> Result<String, HighlightError> {
        // The default syntax set has no TSX grammar; JavaScript is the
        // closest match for the generated components.
        let syntax = self
            .syntax_set
            .find_syntax_by_token("js")
            .unwrap_or_else(|| self.syntax_set.find_syntax_plain_text());

        let mut lines = HighlightLines::new(syntax, &self.theme);
        let mut out = String::with_capacity(source.len() * 2);
        for line in LinesWithEndings::from(source) {
            let ranges = lines
                .highlight_line(line, &self.syntax_set)
                .map_err(|e| HighlightError::Render(e.to_string()))?;
            out.push_str(&as_24_bit_terminal_escaped(&ranges, false));
        }
        out.push_str("\x1b[0m");
        Ok(out)
    }
}

#[cfg(test)]
#[path = "highlight_test.rs"]
mod tests;
