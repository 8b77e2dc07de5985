//! Clipboard boundary.
//!
//! Write-only, invoked on explicit user action. Failure is non-fatal by
//! contract and is not surfaced; callers log at debug and move on.

#[derive(Debug, thiserror::Error)]
#[error("clipboard write failed: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard {
    /// # Errors
    ///
    /// Fails when the platform clipboard rejects the write; callers treat
    /// this as non-fatal.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}
