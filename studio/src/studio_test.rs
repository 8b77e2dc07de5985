use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use futures::StreamExt;
use futures::stream;

use super::*;
use crate::clipboard::ClipboardError;
use crate::session::Role;
use crate::highlight::HighlightError;
use crate::preview::{PreviewBundle, PreviewState, RenderSandbox, SandboxError};
use crate::transport::ByteStream;

const BUTTON: &str = "export default function GeneratedComponent(){return <button>Hi</button>;}";

// One scripted response per submission: either an open failure or a chunk
// sequence (each chunk ok bytes or a mid-stream read error).
type Script = Result<Vec<Result<Vec<u8>, String>>, String>;

struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedTransport {
    fn new(scripts: Vec<Script>) -> Self {
        Self { scripts: Mutex::new(scripts.into()), requests: Mutex::new(Vec::new()) }
    }

    fn single(chunks: Vec<&str>) -> Self {
        Self::new(vec![Ok(chunks.into_iter().map(|c| Ok(c.as_bytes().to_vec())).collect())])
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl GenerationTransport for ScriptedTransport {
    async fn stream_generate(&self, request: &GenerationRequest) -> Result<ByteStream, TransportError> {
        self.requests.lock().unwrap().push(request.clone());
        let script = self.scripts.lock().unwrap().pop_front().expect("unscripted submission");
        match script {
            Err(body) => Err(TransportError::Status { status: 502, body }),
            Ok(chunks) => {
                let items: Vec<Result<Bytes, TransportError>> = chunks
                    .into_iter()
                    .map(|chunk| chunk.map(Bytes::from).map_err(TransportError::Read))
                    .collect();
                Ok(stream::iter(items).boxed())
            }
        }
    }
}

struct FakeHighlighter {
    renders: AtomicUsize,
}

impl FakeHighlighter {
    fn new() -> Self {
        Self { renders: AtomicUsize::new(0) }
    }
}

impl Highlighter for FakeHighlighter {
    fn render(&self, source: &str) -> Result<String, HighlightError> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        Ok(format!("«{source}»"))
    }
}

#[derive(Default)]
struct RecordingSandbox {
    loads: Vec<PreviewBundle>,
}

impl RenderSandbox for RecordingSandbox {
    fn load(&mut self, bundle: &PreviewBundle) -> Result<(), SandboxError> {
        self.loads.push(bundle.clone());
        Ok(())
    }
}

fn studio() -> Studio<FakeHighlighter, RecordingSandbox> {
    Studio::new(FakeHighlighter::new(), RecordingSandbox::default())
}

fn button_in_three_chunks() -> ScriptedTransport {
    ScriptedTransport::single(vec![&BUTTON[..20], &BUTTON[20..40], &BUTTON[40..]])
}

#[tokio::test]
async fn end_to_end_button_generation() {
    let transport = button_in_three_chunks();
    let mut studio = studio();

    let status = studio.submit(&transport, "button").await.unwrap();

    assert_eq!(status, SessionStatus::Complete);
    assert_eq!(studio.session().text(), BUTTON);

    // Preview reached Ready with the full source, only after completion.
    let PreviewState::Ready(bundle) = studio.preview().state() else {
        panic!("expected Ready, got {:?}", studio.preview().state());
    };
    assert!(bundle.files[1].1.contains(BUTTON));
    assert_eq!(studio.sandbox().loads.len(), 1);

    // Final rendering is the non-stale one for the full string.
    assert_eq!(studio.display_markup(), Some(format!("«{BUTTON}»").as_str()));

    // Transcript: the user turn plus one synthesized success turn.
    let transcript = studio.transcript();
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, Role::User);
    assert_eq!(transcript[1].content, SUCCESS_MESSAGE);
}

#[tokio::test]
async fn highlight_recompute_is_throttled_while_streaming() {
    let transport = button_in_three_chunks();
    let mut studio = studio();
    studio.submit(&transport, "button").await.unwrap();

    // 73 chars in chunks of 20/20/33: one recompute past the 50-char budget
    // and one on completion.
    assert_eq!(studio.highlighter.renders.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn preview_stays_off_sandbox_until_complete() {
    let transport = button_in_three_chunks();
    let mut studio = studio();

    let mut seen_ready_while_streaming = false;
    {
        let states = Mutex::new(Vec::new());
        studio
            .submit_with(&transport, "button", |_, status| {
                states.lock().unwrap().push(status);
            })
            .await
            .unwrap();
        let states = states.into_inner().unwrap();
        assert_eq!(states.last(), Some(&SessionStatus::Complete));
        if states[..states.len() - 1].iter().any(|s| s.is_terminal()) {
            seen_ready_while_streaming = true;
        }
    }
    assert!(!seen_ready_while_streaming);
    // Exactly one sandbox load, on the terminal publish.
    assert_eq!(studio.sandbox().loads.len(), 1);
}

#[tokio::test]
async fn live_updates_grow_monotonically() {
    let transport = button_in_three_chunks();
    let mut studio = studio();

    let updates = Mutex::new(Vec::<String>::new());
    studio
        .submit_with(&transport, "button", |text, _| {
            updates.lock().unwrap().push(text.to_string());
        })
        .await
        .unwrap();

    let updates = updates.into_inner().unwrap();
    assert_eq!(updates.len(), 4); // 3 chunks + terminal publish
    for pair in updates.windows(2) {
        assert!(pair[1].starts_with(&pair[0]));
    }
    assert_eq!(updates.last().unwrap(), BUTTON);
}

#[tokio::test]
async fn empty_prompt_rejected_before_any_network_call() {
    let transport = ScriptedTransport::new(vec![]);
    let mut studio = studio();

    let err = studio.submit(&transport, "   ").await.unwrap_err();

    assert!(matches!(err, StudioError::EmptyPrompt));
    assert_eq!(transport.calls(), 0);
    assert!(studio.transcript().is_empty());
    assert_eq!(studio.session().status(), SessionStatus::Idle);
}

#[tokio::test]
async fn busy_while_streaming_rejects_resubmission() {
    let transport = ScriptedTransport::new(vec![]);
    let mut studio = studio();
    studio.force_streaming_for_tests();

    let err = studio.submit(&transport, "another").await.unwrap_err();

    assert!(matches!(err, StudioError::Busy));
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn new_submission_discards_previous_session_without_interleaving() {
    let first = "export default function GeneratedComponent(){return <button>A</button>;}";
    let second = "export default function GeneratedComponent(){return <input />;}";
    let transport = ScriptedTransport::new(vec![
        Ok(vec![Ok(first.as_bytes().to_vec())]),
        Ok(vec![Ok(second.as_bytes().to_vec())]),
    ]);
    let mut studio = studio();

    studio.submit(&transport, "a button").await.unwrap();
    studio.submit(&transport, "an input").await.unwrap();

    // The buffer holds exactly the second session's text.
    assert_eq!(studio.session().text(), second);

    // Prior turns travelled as history, not as buffer content.
    let requests = transport.requests.lock().unwrap();
    assert!(requests[0].history.is_empty());
    assert_eq!(requests[1].history.len(), 2);
    assert_eq!(requests[1].history[0].content, "a button");
}

#[tokio::test]
async fn open_failure_records_failed_turn() {
    let transport = ScriptedTransport::new(vec![Err("bad gateway".into())]);
    let mut studio = studio();

    let err = studio.submit(&transport, "button").await.unwrap_err();

    assert!(matches!(err, StudioError::Transport(TransportError::Status { status: 502, .. })));
    assert_eq!(studio.session().status(), SessionStatus::Failed);
    assert_eq!(studio.transcript().last().unwrap().content, FAILURE_MESSAGE);
}

#[tokio::test]
async fn midstream_failure_keeps_partial_and_fails_turn() {
    let transport = ScriptedTransport::new(vec![Ok(vec![
        Ok(b"partial ".to_vec()),
        Err("connection reset".into()),
    ])]);
    let mut studio = studio();

    let status = studio.submit(&transport, "button").await.unwrap();

    assert_eq!(status, SessionStatus::Failed);
    assert_eq!(studio.session().text(), "partial ");
    assert_eq!(*studio.preview().state(), PreviewState::Pending);
    assert_eq!(studio.transcript().last().unwrap().content, FAILURE_MESSAGE);
}

#[tokio::test]
async fn multibyte_fragment_decodes_across_chunk_boundary() {
    // "é" split across the chunk boundary inside one session.
    let transport = ScriptedTransport::new(vec![Ok(vec![
        Ok(b"caf\xc3".to_vec()),
        Ok(b"\xa9".to_vec()),
    ])]);
    let mut studio = studio();
    studio.submit(&transport, "café sign").await.unwrap();
    assert_eq!(studio.session().text(), "café");
}

struct FailingClipboard;

impl Clipboard for FailingClipboard {
    fn write_text(&mut self, _text: &str) -> Result<(), ClipboardError> {
        Err(ClipboardError("denied".into()))
    }
}

struct RecordingClipboard(String);

impl Clipboard for RecordingClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.0 = text.to_string();
        Ok(())
    }
}

#[tokio::test]
async fn clipboard_failure_is_silent() {
    let transport = button_in_three_chunks();
    let mut studio = studio();
    studio.submit(&transport, "button").await.unwrap();

    studio.copy_code(&mut FailingClipboard); // must not panic or error

    let mut clipboard = RecordingClipboard(String::new());
    studio.copy_code(&mut clipboard);
    assert_eq!(clipboard.0, BUTTON);
}
