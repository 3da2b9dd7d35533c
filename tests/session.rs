//! Session-loop contract tests.
//!
//! The completer and (mostly) the text provider are hand-rolled mocks, so the
//! tests pin down the REPL behaviour alone: when it stops, how many calls
//! each line causes, and what gets printed.

use async_trait::async_trait;
use edgequake_pdfqa::session::{ANSWER_LABEL, EXIT_MESSAGE, NO_TEXT_MESSAGE, READY_MESSAGE};
use edgequake_pdfqa::{
    run_session, Completer, CompletionFailure, PdfiumTextProvider, Reply, SessionOptions,
    SessionSummary, TextProvider,
};
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::io::BufReader;

// ── Mocks ────────────────────────────────────────────────────────────────────

/// A text provider returning a fixed result and counting calls.
struct MockText {
    text: Option<String>,
    calls: AtomicUsize,
}

impl MockText {
    fn with(text: Option<&str>) -> Self {
        Self {
            text: text.map(str::to_string),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl TextProvider for MockText {
    async fn extract(&self, _path: &Path) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.text.clone()
    }
}

/// A completer replaying a sequence of replies (last one repeats).
struct MockCompleter {
    replies: Mutex<Vec<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
}

impl MockCompleter {
    fn always(reply: Reply) -> Self {
        Self::with_sequence(vec![reply])
    }

    fn with_sequence(mut replies: Vec<Reply>) -> Self {
        assert!(!replies.is_empty(), "sequence must have at least one reply");
        replies.reverse();
        let fallback = replies[0].clone();
        Self {
            replies: Mutex::new(replies),
            fallback,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Completer for MockCompleter {
    async fn complete(&self, _prompt: &str) -> Reply {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.replies
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

async fn drive(
    provider: &dyn TextProvider,
    completer: &dyn Completer,
    stdin: &str,
) -> (SessionSummary, String) {
    let mut out = Vec::new();
    let summary = run_session(
        provider,
        completer,
        Path::new("knowledgeBase/self.pdf"),
        &SessionOptions::default(),
        stdin.as_bytes(),
        &mut out,
    )
    .await
    .expect("session should not fail on in-memory I/O");
    (summary, String::from_utf8(out).unwrap())
}

// ── Quit sentinel ────────────────────────────────────────────────────────────

#[tokio::test]
async fn lowercase_q_exits_without_calling_the_model() {
    let provider = MockText::with(Some("doc"));
    let completer = MockCompleter::always(Reply::Answer("unused".into()));

    let (summary, out) = drive(&provider, &completer, "q\n").await;

    assert_eq!(completer.call_count(), 0);
    assert_eq!(summary.queries, 0);
    assert!(out.contains(READY_MESSAGE));
    assert!(out.contains(EXIT_MESSAGE));
}

#[tokio::test]
async fn uppercase_q_also_exits() {
    let provider = MockText::with(Some("doc"));
    let completer = MockCompleter::always(Reply::Answer("unused".into()));

    let (summary, out) = drive(&provider, &completer, "Q\nnever read\n").await;

    assert_eq!(completer.call_count(), 0);
    assert_eq!(summary, SessionSummary { document_loaded: true, ..Default::default() });
    assert!(out.trim_end().ends_with(EXIT_MESSAGE));
}

// ── One call per question ────────────────────────────────────────────────────

#[tokio::test]
async fn each_question_triggers_exactly_one_completion() {
    let provider = MockText::with(Some("doc"));
    let completer = MockCompleter::with_sequence(vec![
        Reply::Answer("one".into()),
        Reply::Failed(CompletionFailure::Unavailable {
            detail: "HTTP 500".into(),
        }),
        Reply::Answer("three".into()),
    ]);

    let (summary, out) = drive(&provider, &completer, "a\nb\nc\nq\n").await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    assert_eq!(completer.call_count(), 3);
    assert_eq!(summary.queries, 3);
    assert_eq!(summary.answered, 2);
    assert_eq!(summary.failed, 1);

    assert!(out.contains(&format!("{ANSWER_LABEL}one")));
    assert!(out.contains("Answer: Error: Unable to get a response from the model."));
    assert!(out.contains(&format!("{ANSWER_LABEL}three")));
}

#[tokio::test]
async fn blank_line_is_still_a_question() {
    let provider = MockText::with(Some("doc"));
    let completer = MockCompleter::always(Reply::Answer("ok".into()));

    let (summary, _) = drive(&provider, &completer, "\nq\n").await;

    assert_eq!(completer.call_count(), 1);
    assert_eq!(summary.queries, 1);
}

#[tokio::test]
async fn scripted_terminal_input() {
    let provider = MockText::with(Some("doc"));
    let completer = MockCompleter::always(Reply::Answer("ok".into()));
    let stdin = tokio_test::io::Builder::new()
        .read(b"first question\n")
        .read(b"second question\n")
        .read(b"Q\n")
        .build();

    let mut out = Vec::new();
    let summary = run_session(
        &provider,
        &completer,
        Path::new("doc.pdf"),
        &SessionOptions::default(),
        BufReader::new(stdin),
        &mut out,
    )
    .await
    .unwrap();

    assert_eq!(completer.call_count(), 2);
    assert_eq!(summary.answered, 2);
}

#[tokio::test]
async fn invalid_utf8_question_is_still_asked() {
    let provider = MockText::with(Some("doc"));
    let completer = MockCompleter::always(Reply::Answer("ok".into()));

    let mut out = Vec::new();
    let summary = run_session(
        &provider,
        &completer,
        Path::new("doc.pdf"),
        &SessionOptions::default(),
        &b"caf\xe9?\r\nsecond\nq\n"[..],
        &mut out,
    )
    .await
    .expect("a bad byte must not end the session");

    assert_eq!(completer.call_count(), 2);
    assert_eq!(summary.queries, 2);
    assert_eq!(summary.answered, 2);
    assert!(String::from_utf8(out).unwrap().contains(EXIT_MESSAGE));
}

// ── No document text ─────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_document_stops_before_prompting() {
    let provider = MockText::with(None);
    let completer = MockCompleter::always(Reply::Answer("unused".into()));

    let (summary, out) = drive(&provider, &completer, "a question\n").await;

    assert!(!summary.document_loaded);
    assert_eq!(completer.call_count(), 0);
    assert_eq!(out.trim_end(), NO_TEXT_MESSAGE);
}

#[tokio::test]
async fn corrupt_pdf_through_pdfium_provider_stops_before_prompting() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    f.write_all(b"%PDF-1.7\nthis is not really a pdf").unwrap();

    let provider = PdfiumTextProvider::new();
    let completer = MockCompleter::always(Reply::Answer("unused".into()));

    let mut out = Vec::new();
    let summary = run_session(
        &provider,
        &completer,
        f.path(),
        &SessionOptions::default(),
        "question\n".as_bytes(),
        &mut out,
    )
    .await
    .unwrap();

    assert!(!summary.document_loaded);
    assert_eq!(completer.call_count(), 0);
    assert!(String::from_utf8(out).unwrap().contains(NO_TEXT_MESSAGE));
}

#[tokio::test]
async fn missing_pdf_path_stops_before_prompting() {
    let provider = PdfiumTextProvider::new();
    let completer = MockCompleter::always(Reply::Answer("unused".into()));

    let mut out = Vec::new();
    let summary = run_session(
        &provider,
        &completer,
        Path::new("/definitely/not/here.pdf"),
        &SessionOptions::default(),
        "question\n".as_bytes(),
        &mut out,
    )
    .await
    .unwrap();

    assert!(!summary.document_loaded);
    assert_eq!(completer.call_count(), 0);
}
