/// PDF text extraction.
///
/// Extraction is synchronous and CPU-bound. `DocumentReader` is the async entry point:
/// it dispatches every call to `tokio::task::spawn_blocking` so the request workers
/// never parse PDFs inline. The extractor itself sits behind `TextExtractor` so the
/// PDF library can be swapped or stubbed.
use std::sync::Arc;

use tracing::debug;

use crate::error::CommonError;

/// Plain text pulled out of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText {
    /// Page texts in page order, each followed by a newline.
    pub text: String,
    pub page_count: usize,
}

impl ExtractedText {
    /// Join per-page texts, terminating each page with a newline.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut text = String::new();
        let mut page_count = 0;
        for page in pages {
            text.push_str(page.as_ref());
            text.push('\n');
            page_count += 1;
        }
        Self { text, page_count }
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

/// Turns document bytes into plain text, or fails.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, CommonError>;
}

/// `TextExtractor` backed by lopdf.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<ExtractedText, CommonError> {
        let doc = lopdf::Document::load_mem(bytes)
            .map_err(|e| CommonError::Pdf(format!("failed to load document: {e}")))?;
        if doc.is_encrypted() {
            return Err(CommonError::PdfEncrypted);
        }

        let pages = doc.get_pages();
        debug!(pages = pages.len(), "pdf loaded");

        // get_pages is keyed by page number, so iteration is already in reading order.
        let mut texts = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            let text = doc.extract_text(&[page_number]).map_err(|e| {
                CommonError::Pdf(format!("failed to extract text from page {page_number}: {e}"))
            })?;
            texts.push(text);
        }

        Ok(ExtractedText::from_pages(texts))
    }
}

/// Async front for a `TextExtractor`.
#[derive(Clone)]
pub struct DocumentReader {
    extractor: Arc<dyn TextExtractor>,
}

impl DocumentReader {
    pub fn new(extractor: Arc<dyn TextExtractor>) -> Self {
        Self { extractor }
    }

    /// Reader over the lopdf extractor.
    pub fn pdf() -> Self {
        Self::new(Arc::new(PdfTextExtractor))
    }

    /// Extract text on a blocking thread. The buffer is dropped when extraction ends,
    /// whether it succeeded or not.
    pub async fn read(&self, bytes: Vec<u8>) -> Result<ExtractedText, CommonError> {
        let extractor = Arc::clone(&self.extractor);
        tokio::task::spawn_blocking(move || extractor.extract(&bytes))
            .await
            .map_err(|e| CommonError::Worker(format!("spawn_blocking join error: {e}")))?
    }
}
