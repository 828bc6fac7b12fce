//! Decoder for pdf.js text-content dumps.
//!
//! Browser tooling can serialize `page.getTextContent()` for every page:
//!
//! ```json
//! {"pages": [{"items": [{"str": "Total", "transform": [1, 0, 0, 1, 10, 100], "height": 12}]}]}
//! ```
//!
//! `transform[4]` and `transform[5]` are the fragment origin. Items without
//! `str` are marked-content markers and carry no text.

use serde::Deserialize;
use tracing::warn;

use super::{DecodeError, Document, Result};
use crate::fragment::{TextFragment, DEFAULT_GLYPH_HEIGHT};

#[derive(Debug, Deserialize)]
struct Dump {
    pages: Vec<DumpPage>,
}

#[derive(Debug, Deserialize)]
struct DumpPage {
    #[serde(default)]
    items: Vec<DumpItem>,
}

#[derive(Debug, Deserialize)]
struct DumpItem {
    #[serde(rename = "str")]
    text: Option<String>,
    #[serde(default)]
    transform: Vec<f64>,
    height: Option<f64>,
}

/// Parse a dump into a [`Document`].
pub fn parse_dump(bytes: &[u8]) -> Result<Document> {
    let dump: Dump = serde_json::from_slice(bytes).map_err(|e| DecodeError::Dump(e.to_string()))?;

    let pages = dump
        .pages
        .into_iter()
        .enumerate()
        .map(|(idx, page)| convert_page(idx + 1, page))
        .collect();

    Ok(Document::new(pages))
}

/// Items with a truncated `transform` keep their text but get NaN
/// coordinates, which sends the page down the draw-order fallback instead
/// of failing the whole document.
fn convert_page(page_number: usize, page: DumpPage) -> Vec<TextFragment> {
    let mut fragments = Vec::with_capacity(page.items.len());
    for (item_idx, item) in page.items.into_iter().enumerate() {
        let Some(text) = item.text else {
            continue;
        };
        let (x, y) = match (item.transform.get(4), item.transform.get(5)) {
            (Some(&x), Some(&y)) => (x, y),
            _ => {
                warn!(
                    page = page_number,
                    item = item_idx,
                    entries = item.transform.len(),
                    "transform too short, position unknown"
                );
                (f64::NAN, f64::NAN)
            }
        };
        let height = item
            .height
            .filter(|h| *h != 0.0)
            .unwrap_or(DEFAULT_GLYPH_HEIGHT);
        fragments.push(TextFragment::new(text, x, y).with_glyph_height(height));
    }
    fragments
}
