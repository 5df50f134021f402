//! PDF-to-text conversion.

mod extractor;

pub use extractor::{PdfContent, PdfExtractor};

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{DocsiftError, PdfError};

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF text extraction implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text of each page, in page order.
    fn extract_page_texts(&self) -> Result<Vec<String>>;
}

/// Read a PDF file and return its text content.
///
/// A document that yields no text (typically a scan) is reported as
/// [`DocsiftError::UnreadableDocument`], as is a read or conversion failure.
pub fn pdf_to_text(path: &Path) -> crate::error::Result<PdfContent> {
    let data = fs::read(path).map_err(|e| unreadable(path, &e.to_string()))?;
    let mut extractor = PdfExtractor::new();

    let content = extractor
        .load(&data)
        .and_then(|_| extractor.extract_all())
        .map_err(|e| unreadable(path, &e.to_string()))?;

    if !content.has_text() {
        return Err(unreadable(path, "no text layer (is it scanned?)"));
    }

    info!(
        "Read {} chars of text from {}",
        content.text.len(),
        path.display()
    );
    Ok(content)
}

fn unreadable(path: &Path, reason: &str) -> DocsiftError {
    DocsiftError::UnreadableDocument(format!("{}: {}", path.display(), reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.pdf");

        match pdf_to_text(&path) {
            Err(DocsiftError::UnreadableDocument(reason)) => {
                assert!(reason.starts_with(&path.display().to_string()));
            }
            other => panic!("expected UnreadableDocument, got {:?}", other.map(|c| c.text)),
        }
    }

    #[test]
    fn test_garbage_bytes_are_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        fs::write(&path, b"not really a pdf").unwrap();

        assert!(matches!(
            pdf_to_text(&path),
            Err(DocsiftError::UnreadableDocument(_))
        ));
    }
}
