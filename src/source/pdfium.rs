//! Native PDF decoding via `pdfium-render` (Chromium's PDF library).
//!
//! Each text segment pdfium reports becomes one [`TextFragment`]; its
//! bounding box supplies the origin (left, bottom) and glyph height.

use pdfium_render::prelude::*;
use tracing::debug;

use super::{DecodeError, Document, Result};
use crate::fragment::TextFragment;

/// Decode every page of a PDF into fragments.
#[allow(deprecated)] // PdfRect field access deprecated in 0.8.28, removed in 0.9.0
pub fn decode(bytes: &[u8]) -> Result<Document> {
    let bindings = Pdfium::bind_to_system_library()
        .map_err(|e| DecodeError::Pdf(format!("pdfium library unavailable: {e}")))?;
    let pdfium = Pdfium::new(bindings);
    let doc = pdfium
        .load_pdf_from_byte_slice(bytes, None)
        .map_err(|e| DecodeError::Pdf(e.to_string()))?;

    let mut pages = Vec::with_capacity(doc.pages().len() as usize);
    for (page_idx, page) in doc.pages().iter().enumerate() {
        // A page without a text layer is empty, not a decode failure
        let Ok(text) = page.text() else {
            debug!(page = page_idx + 1, "no text layer");
            pages.push(Vec::new());
            continue;
        };

        let fragments: Vec<TextFragment> = text
            .segments()
            .iter()
            .map(|segment| {
                let rect = segment.bounds();
                TextFragment::new(
                    segment.text(),
                    f64::from(rect.left.value),
                    f64::from(rect.bottom.value),
                )
                .with_glyph_height(f64::from((rect.top.value - rect.bottom.value).abs()))
            })
            .collect();
        pages.push(fragments);
    }

    Ok(Document::new(pages))
}
