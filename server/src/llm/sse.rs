//! Incremental `text/event-stream` framing.
//!
//! Both providers deliver fragments as server-sent events over a chunked
//! body, and chunk boundaries fall anywhere — mid-line, mid-event, even
//! mid-UTF-8-sequence. The decoder buffers raw bytes and only surfaces
//! events once their terminating blank line has arrived, so parsing stays
//! pure and chunk-boundary independent.

/// One complete server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// Value of the `event:` field, when present.
    pub event: Option<String>,
    /// Concatenated `data:` payload (multiple data lines joined with `\n`).
    pub data: String,
}

/// Stateful SSE decoder fed raw body bytes.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes; returns every event completed by this chunk, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = find_event_end(&self.buf) {
            let block: Vec<u8> = self.buf.drain(..end.block_len).collect();
            self.buf.drain(..end.separator_len);
            if let Some(event) = parse_event(&block) {
                events.push(event);
            }
        }
        events
    }
}

struct EventEnd {
    block_len: usize,
    separator_len: usize,
}

/// Locate the first blank-line separator (`\n\n` or `\r\n\r\n`).
fn find_event_end(buf: &[u8]) -> Option<EventEnd> {
    let mut i = 0;
    while i + 1 < buf.len() {
        if buf[i] == b'\n' && buf[i + 1] == b'\n' {
            return Some(EventEnd { block_len: i, separator_len: 2 });
        }
        if i + 3 < buf.len() && &buf[i..i + 4] == b"\r\n\r\n" {
            return Some(EventEnd { block_len: i, separator_len: 4 });
        }
        i += 1;
    }
    None
}

/// Parse one event block. Returns `None` for comment-only blocks.
///
/// Multi-byte UTF-8 sequences never contain a newline byte, so splitting on
/// the byte level cannot cut a character in half; lossy conversion here only
/// replaces genuinely invalid provider output.
fn parse_event(block: &[u8]) -> Option<SseEvent> {
    let text = String::from_utf8_lossy(block);
    let mut event = None;
    let mut data_lines: Vec<&str> = Vec::new();

    for line in text.lines() {
        if let Some(value) = line.strip_prefix("event:") {
            event = Some(value.trim_start_matches(' ').to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
        // Comments (`:`) and fields we don't use (`id:`, `retry:`) are skipped.
    }

    if event.is_none() && data_lines.is_empty() {
        return None;
    }
    Some(SseEvent { event, data: data_lines.join("\n") })
}

#[cfg(test)]
#[path = "sse_test.rs"]
mod tests;
