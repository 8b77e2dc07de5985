//! Split-pane layout state.
//!
//! A drag-to-resize state machine with no coupling to the streaming core:
//! one percentage in a fixed bounded range plus a drag flag. Resets to the
//! golden-ratio default on each fresh load; nothing is persisted.

/// Default split: golden ratio, chat pane ~38.2%.
pub const DEFAULT_SPLIT_PERCENT: f64 = 38.2;
pub const MIN_SPLIT_PERCENT: f64 = 25.0;
pub const MAX_SPLIT_PERCENT: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitLayout {
    position: f64,
    dragging: bool,
}

impl SplitLayout {
    #[must_use]
    pub fn new() -> Self {
        Self { position: DEFAULT_SPLIT_PERCENT, dragging: false }
    }

    /// Current split position, percent of container width.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.position
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn press(&mut self) {
        self.dragging = true;
    }

    pub fn release(&mut self) {
        self.dragging = false;
    }

    /// Recompute the split from a pointer position. Ignored unless a drag is
    /// active; the result is clamped to the bounded range.
    pub fn drag(&mut self, pointer_x: f64, container_width: f64) {
        if !self.dragging || container_width <= 0.0 {
            return;
        }
        let percent = (pointer_x / container_width) * 100.0;
        self.position = percent.clamp(MIN_SPLIT_PERCENT, MAX_SPLIT_PERCENT);
    }
}

impl Default for SplitLayout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
