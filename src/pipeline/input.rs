//! Input validation: make sure the user-supplied path is a readable PDF.
//!
//! pdfium reports a missing file, a permission problem and a non-PDF all as
//! the same opaque load error. Checking up front (and the `%PDF` magic bytes)
//! gives the extraction log line a meaningful reason.

use crate::error::PdfQaError;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate a local file path, checking existence, readability and PDF magic bytes.
pub fn resolve_local(path: &Path) -> Result<PathBuf, PdfQaError> {
    let path = path.to_path_buf();

    if !path.is_file() {
        return Err(PdfQaError::FileNotFound { path });
    }

    match std::fs::File::open(&path) {
        Ok(f) => {
            let mut head = Vec::with_capacity(4);
            f.take(4)
                .read_to_end(&mut head)
                .map_err(|e| PdfQaError::CorruptPdf {
                    path: path.clone(),
                    detail: e.to_string(),
                })?;
            if head.as_slice() != b"%PDF" {
                let mut magic = [0u8; 4];
                magic[..head.len()].copy_from_slice(&head);
                return Err(PdfQaError::NotAPdf { path, magic });
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfQaError::PermissionDenied { path });
        }
        Err(_) => {
            return Err(PdfQaError::FileNotFound { path });
        }
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_is_not_found() {
        let err = resolve_local(Path::new("/definitely/not/a/real/file.pdf")).unwrap_err();
        assert!(matches!(err, PdfQaError::FileNotFound { .. }));
    }

    #[test]
    fn directory_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_local(dir.path()).unwrap_err();
        assert!(matches!(err, PdfQaError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello, not a pdf").unwrap();
        match resolve_local(f.path()).unwrap_err() {
            PdfQaError::NotAPdf { magic, .. } => assert_eq!(&magic, b"hell"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_file_is_rejected() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%P").unwrap();
        assert!(matches!(
            resolve_local(f.path()),
            Err(PdfQaError::NotAPdf { .. })
        ));
    }

    #[test]
    fn pdf_header_is_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"%PDF-1.7\n").unwrap();
        assert_eq!(resolve_local(f.path()).unwrap(), f.path());
    }
}
