//! Pipeline stages for answering questions about a PDF.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──────────────▶ (document text, once per run)
//! (path)    (pdfium, blocking)
//!
//! prompt ──▶ llm ──▶ reply           (once per question)
//!            (HTTP, retry on 429)
//! ```
//!
//! 1. [`input`]   — check the path is a readable file starting with `%PDF`
//! 2. [`extract`] — concatenate page text via pdfium; runs in
//!    `spawn_blocking` and turns every failure into `None`
//! 3. [`llm`]     — POST the prompt to the chat-completion endpoint with
//!    exponential backoff on rate limiting; the only stage with network I/O

pub mod extract;
pub mod input;
pub mod llm;
