//! PDF decoding boundary.
//!
//! The scanner only needs a page count and, per page, the fragments a
//! decoder produced. [`PageSource`] is that seam; [`Document`] is the
//! in-memory implementation every loader produces.
//!
//! # Supported inputs
//!
//! | Extension | Decoder | Feature Flag |
//! |-----------|---------|-------------|
//! | `.json` | pdf.js `getTextContent` dump ([`pdfjs`]) | always |
//! | `.pdf` | pdfium text segments (`pdfium`) | `pdf` |

#[cfg(feature = "pdf")]
pub mod pdfium;
pub mod pdfjs;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::fragment::TextFragment;

/// Document could not be decoded.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid text dump: {0}")]
    Dump(String),

    #[error("Failed to parse PDF: {0}")]
    Pdf(String),

    #[error("Page {0} does not exist")]
    PageOutOfRange(usize),

    #[error("Unsupported input: {0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Per-page access to decoded fragments.
///
/// Pages are numbered from 1. Implementations may suspend while decoding.
#[async_trait]
pub trait PageSource: Send + Sync {
    fn page_count(&self) -> usize;

    async fn page_fragments(&self, page_number: usize) -> Result<Vec<TextFragment>>;
}

/// A fully decoded document held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pages: Vec<Vec<TextFragment>>,
}

impl Document {
    pub fn new(pages: Vec<Vec<TextFragment>>) -> Self {
        Self { pages }
    }

    /// Fragments for a 1-based page number.
    pub fn page(&self, page_number: usize) -> Option<&[TextFragment]> {
        page_number
            .checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .map(Vec::as_slice)
    }

    pub fn pages(&self) -> impl Iterator<Item = (usize, &[TextFragment])> {
        self.pages
            .iter()
            .enumerate()
            .map(|(idx, page)| (idx + 1, page.as_slice()))
    }
}

#[async_trait]
impl PageSource for Document {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    async fn page_fragments(&self, page_number: usize) -> Result<Vec<TextFragment>> {
        self.page(page_number)
            .map(<[TextFragment]>::to_vec)
            .ok_or(DecodeError::PageOutOfRange(page_number))
    }
}

/// Load a document, choosing the decoder by file extension.
#[instrument(fields(path = %path.display()))]
pub async fn load_document(path: &Path) -> Result<Document> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let bytes = tokio::fs::read(path).await?;
    debug!(bytes = bytes.len(), extension = %extension, "read input");

    match extension.as_str() {
        "json" => pdfjs::parse_dump(&bytes),
        "pdf" => decode_pdf(bytes).await,
        other => Err(DecodeError::Unsupported(format!(
            "unrecognised extension {other:?} (expected .pdf or .json)"
        ))),
    }
}

#[cfg(feature = "pdf")]
async fn decode_pdf(bytes: Vec<u8>) -> Result<Document> {
    // pdfium is a blocking FFI call
    tokio::task::spawn_blocking(move || pdfium::decode(&bytes))
        .await
        .map_err(|e| DecodeError::Pdf(e.to_string()))?
}

#[cfg(not(feature = "pdf"))]
async fn decode_pdf(_bytes: Vec<u8>) -> Result<Document> {
    Err(DecodeError::Unsupported(
        "native PDF decoding requires the `pdf` feature; supply a pdf.js .json dump instead"
            .to_string(),
    ))
}
