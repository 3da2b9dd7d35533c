//! Error types for the edgequake-pdfqa library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfQaError`] — **Out-of-band**: something the caller has to act on
//!   (no API key, unreadable PDF, a prompt that could not be assembled).
//!   Returned as `Err(PdfQaError)` from configuration, input validation and
//!   the per-query path of the session loop.
//!
//! * [`CompletionFailure`] — **In-band**: the chat-completion call did not
//!   produce an answer. It is carried inside [`crate::output::Reply`] and its
//!   `Display` is the sentinel text printed in place of an answer, so the
//!   REPL prints success and failure through the same path.

use std::path::PathBuf;
use thiserror::Error;

/// Sentinel printed when the endpoint failed with anything other than 429.
pub const UNAVAILABLE_SENTINEL: &str = "Error: Unable to get a response from the model.";

/// Sentinel printed when every attempt was rate limited.
pub const RETRIES_EXHAUSTED_SENTINEL: &str = "Error: Max retries exceeded.";

/// All errors returned by the edgequake-pdfqa library.
#[derive(Debug, Error)]
pub enum PdfQaError {
    // ── Config errors ─────────────────────────────────────────────────────
    /// The API key environment variable is unset or blank.
    #[error("API key is not set.\nExport {var}=sk-... or add it to a .env file.")]
    MissingApiKey { var: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// pdfium could not open the document or read a page's text.
    #[error("PDF '{path}' could not be read: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Query errors ──────────────────────────────────────────────────────
    /// The assembled prompt is longer than the configured limit.
    #[error("Prompt is {len} characters, above the limit of {max}")]
    PromptTooLarge { len: usize, max: usize },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    /// Reading the question or writing the answer failed.
    #[error("Terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Why a completion call produced no answer.
///
/// The `Display` output of each variant is the exact sentinel string shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompletionFailure {
    /// A non-429 HTTP error, an unusable body, or no response at all.
    #[error("{}", UNAVAILABLE_SENTINEL)]
    Unavailable { detail: String },

    /// Every attempt came back 429.
    #[error("{}", RETRIES_EXHAUSTED_SENTINEL)]
    RetriesExhausted { attempts: u32 },
}
