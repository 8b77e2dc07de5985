//! Client-side core of the uiforge component generator.
//!
//! The server relays a model's incremental output as a chunked plain-text
//! byte stream; this crate reassembles that stream into a growing source
//! buffer, keeps a syntax-highlighted rendering fresh without re-parsing on
//! every chunk, and derives a runnable preview bundle once the stream
//! completes. [`Studio`] ties the pieces together for a front-end.

pub mod clipboard;
pub mod consumer;
pub mod decode;
pub mod highlight;
pub mod layout;
pub mod preview;
pub mod session;
pub mod studio;
pub mod transport;

pub use self::clipboard::{Clipboard, ClipboardError};
pub use self::consumer::{SessionObserver, StreamConsumer};
pub use self::decode::Utf8StreamDecoder;
pub use self::highlight::{
    HighlightJob, HighlightResult, HighlightScheduler, Highlighter, RECOMPUTE_THRESHOLD,
    SyntectHighlighter,
};
pub use self::layout::SplitLayout;
pub use self::preview::{
    HtmlSandbox, PreviewBundle, PreviewController, PreviewState, RenderSandbox, SandboxError,
};
pub use self::session::{
    ChatMessage, GenerationRequest, GenerationSession, HistoryTurn, Role, SessionStatus,
};
pub use self::studio::{FAILURE_MESSAGE, SUCCESS_MESSAGE, Studio, StudioError};
pub use self::transport::{ByteStream, GenerationTransport, HttpTransport, TransportError};
