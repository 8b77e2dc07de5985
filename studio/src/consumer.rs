//! Stream consumer: drives one session from Idle to a terminal state.
//!
//! DESIGN
//! ======
//! Reads the byte stream strictly sequentially; after every chunk it decodes,
//! appends, and publishes the grown buffer to the observer *before* awaiting
//! the next chunk. No chunks are batched into one publish, so downstream
//! components see every intermediate buffer. Correctness rests on this
//! ordering discipline, not on locks — the consumer is the session's only
//! writer.
//!
//! End-of-stream without a transport error is Complete, even when the relay
//! was cut off upstream: the wire carries no marker distinguishing the two
//! (see the relay's failure policy). Only a transport-level error maps to
//! Failed.

use futures::StreamExt;

use crate::decode::Utf8StreamDecoder;
use crate::session::{GenerationSession, SessionStatus};
use crate::transport::ByteStream;

/// Read-only view of each buffer update, published synchronously.
pub trait SessionObserver {
    fn buffer_changed(&mut self, text: &str, status: SessionStatus);
}

impl<F: FnMut(&str, SessionStatus)> SessionObserver for F {
    fn buffer_changed(&mut self, text: &str, status: SessionStatus) {
        self(text, status);
    }
}

pub struct StreamConsumer;

impl StreamConsumer {
    /// Consume the stream to its end, returning the session's terminal
    /// status.
    pub async fn run(
        mut stream: ByteStream,
        session: &mut GenerationSession,
        observer: &mut dyn SessionObserver,
    ) -> SessionStatus {
        session.begin_streaming();
        let mut decoder = Utf8StreamDecoder::new();

        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    let text = decoder.decode(&bytes);
                    session.append(&text);
                    observer.buffer_changed(session.text(), session.status());
                }
                Err(error) => {
                    tracing::warn!(error = %error, "transport failed mid-stream");
                    let tail = decoder.finish();
                    session.append(&tail);
                    session.fail();
                    observer.buffer_changed(session.text(), session.status());
                    return session.status();
                }
            }
        }

        let tail = decoder.finish();
        session.append(&tail);
        session.complete();
        observer.buffer_changed(session.text(), session.status());
        session.status()
    }
}

#[cfg(test)]
#[path = "consumer_test.rs"]
mod tests;
