//! Chunk-boundary-safe incremental UTF-8 decoding.
//!
//! Network chunks split anywhere, including inside a multi-byte character.
//! Decoding each chunk independently would truncate or mangle those
//! sequences, so the decoder carries undecoded trailing bytes into the next
//! chunk. Invalid sequences become U+FFFD; an incomplete carry at end of
//! stream is flushed the same way by [`Utf8StreamDecoder::finish`].

/// Incremental UTF-8 decoder.
#[derive(Debug, Default)]
pub struct Utf8StreamDecoder {
    carry: Vec<u8>,
}

impl Utf8StreamDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one chunk, including any bytes carried from the previous one.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.carry.extend_from_slice(chunk);
        let buf = std::mem::take(&mut self.carry);

        let mut out = String::with_capacity(buf.len());
        let mut rest: &[u8] = &buf;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.push_str(text);
                    break;
                }
                Err(error) => {
                    let valid = error.valid_up_to();
                    // The prefix was just validated; lossy conversion borrows it.
                    out.push_str(&String::from_utf8_lossy(&rest[..valid]));
                    match error.error_len() {
                        Some(invalid) => {
                            out.push('\u{FFFD}');
                            rest = &rest[valid + invalid..];
                        }
                        None => {
                            // Incomplete trailing sequence: hold it for the
                            // next chunk.
                            self.carry = rest[valid..].to_vec();
                            break;
                        }
                    }
                }
            }
        }
        out
    }

    /// Flush any dangling carry at end of stream as replacement characters.
    pub fn finish(&mut self) -> String {
        if self.carry.is_empty() {
            return String::new();
        }
        let carry = std::mem::take(&mut self.carry);
        String::from_utf8_lossy(&carry).into_owned()
    }
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod tests;
