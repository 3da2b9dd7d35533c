//! # edgequake-pdfqa
//!
//! Ask questions about a PDF document from the terminal using a
//! chat-completion LLM.
//!
//! The text of the whole document is extracted once with pdfium, then every
//! question is sent to an OpenAI-compatible `/chat/completions` endpoint
//! together with that text. There is no retrieval index: the document is
//! stuffed into the prompt, which suits short documents and keeps the tool
//! small.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate the local path (exists, readable, %PDF)
//!  ├─ 2. Extract  concatenate page text via pdfium (spawn_blocking)
//!  └─ 3. Session  for each question:
//!        ├─ prompt   template + document text + question
//!        ├─ LLM      POST with exponential backoff on HTTP 429
//!        └─ print    "Answer: …" (or a failure sentinel)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfqa::{
//!     run_session, ApiKey, CompletionClient, PdfiumTextProvider, QaConfig, SessionOptions,
//! };
//! use std::path::Path;
//! use tokio::io::BufReader;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = QaConfig::builder().api_key(ApiKey::from_env()?).build()?;
//!     let client = CompletionClient::new(&config)?;
//!     let provider = PdfiumTextProvider::new();
//!
//!     let summary = run_session(
//!         &provider,
//!         &client,
//!         Path::new("document.pdf"),
//!         &SessionOptions::default(),
//!         BufReader::new(tokio::io::stdin()),
//!         &mut tokio::io::stdout(),
//!     )
//!     .await?;
//!     eprintln!("{} questions answered", summary.answered);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfqa` binary (clap + anyhow + tracing-subscriber + dotenvy) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod session;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ApiKey, QaConfig, QaConfigBuilder, API_KEY_ENV};
pub use error::{CompletionFailure, PdfQaError};
pub use output::{AttemptOutcome, CompletionReport, Reply, SessionSummary};
pub use pipeline::extract::{PdfiumTextProvider, TextProvider};
pub use pipeline::llm::{ChatMessage, ChatRequest, Completer, CompletionClient, RetryPolicy};
pub use session::{answer_query, run_session, SessionOptions};
