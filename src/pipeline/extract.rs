//! Text extraction: pull the plain text out of every page of a PDF via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and is not safe to drive from async contexts. The whole
//! bind → open → read sequence runs on a blocking-pool thread, and the
//! document handle never leaves that closure, so it is closed on every exit
//! path, including a failed page read.
//!
//! ## Failure policy
//!
//! [`TextProvider::extract`] never returns an error. Anything that goes wrong
//! is logged and reported as `None`; the session then refuses to start.

use crate::error::PdfQaError;
use crate::pipeline::input::resolve_local;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Environment variable pointing at an existing pdfium shared library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Source of the document text a session answers questions about.
#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Extract the document's text, or `None` if there is no usable text.
    async fn extract(&self, path: &Path) -> Option<String>;
}

/// [`TextProvider`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumTextProvider {
    password: Option<String>,
}

impl PdfiumTextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open encrypted documents with this user password.
    pub fn with_password(mut self, password: Option<String>) -> Self {
        self.password = password;
        self
    }
}

#[async_trait]
impl TextProvider for PdfiumTextProvider {
    async fn extract(&self, path: &Path) -> Option<String> {
        let path = path.to_path_buf();
        let password = self.password.clone();

        let result = tokio::task::spawn_blocking(move || {
            extract_text_blocking(&path, password.as_deref())
        })
        .await
        .map_err(|e| PdfQaError::Internal(format!("Extraction task panicked: {}", e)))
        .and_then(|r| r);

        match result {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => {
                warn!("PDF contains no extractable text");
                None
            }
            Err(e) => {
                warn!("An error occurred while reading the PDF: {}", e);
                None
            }
        }
    }
}

/// Blocking implementation of text extraction.
fn extract_text_blocking(pdf_path: &Path, password: Option<&str>) -> Result<String, PdfQaError> {
    let pdf_path = resolve_local(pdf_path)?;
    let pdfium = bind_pdfium()?;

    let document = pdfium
        .load_pdf_from_file(&pdf_path, password)
        .map_err(|e| PdfQaError::CorruptPdf {
            path: pdf_path.clone(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    info!("PDF loaded: {} pages", pages.len());

    let mut text = String::new();
    for (idx, page) in pages.iter().enumerate() {
        let page_text = page.text().map_err(|e| PdfQaError::CorruptPdf {
            path: pdf_path.clone(),
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        let chunk = page_text.all();
        debug!("Page {}: {} chars", idx + 1, chunk.len());
        text.push_str(&chunk);
    }

    Ok(text)
}

/// Bind to pdfium: `PDFIUM_LIB_PATH` when set, otherwise the system library.
fn bind_pdfium() -> Result<Pdfium, PdfQaError> {
    let bindings = match std::env::var(PDFIUM_LIB_PATH_ENV) {
        Ok(p) if !p.is_empty() => {
            let lib = PathBuf::from(p);
            debug!("Binding pdfium from {}", lib.display());
            Pdfium::bind_to_library(&lib)
        }
        _ => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| PdfQaError::PdfiumBindingFailed(e.to_string()))?;

    Ok(Pdfium::new(bindings))
}
