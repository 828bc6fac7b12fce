//! Line reconstruction from positioned PDF fragments.
//!
//! A decoder hands back fragments in draw order, which is rarely reading
//! order. Reconstruction tries three strategies of decreasing fidelity and
//! keeps the first candidate with enough text:
//!
//! ```text
//! fragments → positional lines → draw order → run-on splitting
//! ```
//!
//! 1. **Positional**: bucket fragments whose rounded Y values lie within
//!    [`LINE_TOLERANCE`] of each other, sort each bucket by X, emit buckets
//!    top-to-bottom.
//! 2. **Draw order**: trimmed fragments joined by single spaces.
//! 3. **Run-on splitting**: raw concatenation with spaces re-inserted at
//!    `aB` and `1B` boundaries, for decoders that drop spacing entirely.
//!
//! A strategy that cannot handle the page (say, a NaN coordinate breaks
//! positional bucketing) is skipped in favour of the next one. Reconstruction
//! never fails outward: if every strategy errors, the page becomes a
//! placeholder string so a multi-page scan can carry on.

use std::collections::BTreeMap;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::fragment::TextFragment;

/// Maximum vertical distance (PDF units) for two fragments to share a line.
pub const LINE_TOLERANCE: u64 = 3;

/// A candidate is accepted once its trimmed length exceeds this many chars.
pub const MIN_ACCEPTED_CHARS: usize = 50;

/// Returned when a page has no non-blank fragments.
pub const NO_CONTENT: &str = "No text content found on this page.";

/// Prefix of the placeholder returned when extraction fails.
pub const EXTRACTION_FAILED_PREFIX: &str = "Text extraction failed: ";

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static LOWER_UPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z])([A-Z])").expect("valid regex"));
static DIGIT_UPPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d)([A-Z])").expect("valid regex"));

/// Failure inside a single extraction strategy.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExtractionError {
    #[error("fragment {content:?} has a non-finite coordinate")]
    NonFiniteCoordinate { content: String },
}

pub type Result<T> = std::result::Result<T, ExtractionError>;

/// An extraction strategy: fragments in, candidate page text out.
#[derive(Clone, Copy)]
pub struct Strategy {
    pub name: &'static str,
    pub run: fn(&[TextFragment]) -> Result<String>,
}

impl fmt::Debug for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// Strategies in order of decreasing structural fidelity.
pub const STRATEGIES: [Strategy; 3] = [
    Strategy {
        name: "positional",
        run: positional_lines,
    },
    Strategy {
        name: "draw-order",
        run: draw_order,
    },
    Strategy {
        name: "run-on-split",
        run: run_on_split,
    },
];

/// Reconstructed text for one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageText {
    /// Text produced by one of the strategies.
    Text(String),
    /// No non-blank fragments on the page.
    Empty,
    /// A strategy failed; carries the reason.
    Failed(String),
}

impl PageText {
    /// True when the page carries extracted text rather than a sentinel.
    pub fn has_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    pub fn into_string(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Empty => NO_CONTENT.to_string(),
            Self::Failed(reason) => format!("{EXTRACTION_FAILED_PREFIX}{reason}"),
        }
    }
}

impl fmt::Display for PageText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Empty => f.write_str(NO_CONTENT),
            Self::Failed(reason) => write!(f, "{EXTRACTION_FAILED_PREFIX}{reason}"),
        }
    }
}

/// Reconstruct a page's text as a plain string.
///
/// Never empty: pages without content yield [`NO_CONTENT`] and failed
/// extraction yields a placeholder starting with [`EXTRACTION_FAILED_PREFIX`].
pub fn reconstruct(fragments: &[TextFragment]) -> String {
    reconstruct_page(fragments).into_string()
}

/// Reconstruct a page, keeping the empty and failed cases distinguishable.
pub fn reconstruct_page(fragments: &[TextFragment]) -> PageText {
    if fragments.iter().all(TextFragment::is_blank) {
        return PageText::Empty;
    }

    match first_acceptable(fragments, &STRATEGIES) {
        Ok(text) => PageText::Text(text),
        Err(e) => {
            warn!(error = %e, "text extraction failed");
            PageText::Failed(e.to_string())
        }
    }
}

/// Run `strategies` in order, returning the first candidate whose trimmed
/// length exceeds [`MIN_ACCEPTED_CHARS`], else the last candidate produced.
///
/// A failing strategy is skipped. The error surfaces only when no strategy
/// produced a candidate at all.
pub fn first_acceptable(fragments: &[TextFragment], strategies: &[Strategy]) -> Result<String> {
    let mut last: Option<String> = None;
    let mut failure: Option<ExtractionError> = None;

    for strategy in strategies {
        let candidate = match (strategy.run)(fragments) {
            Ok(candidate) => candidate,
            Err(e) => {
                debug!(strategy = strategy.name, error = %e, "strategy failed, trying next");
                failure = Some(e);
                continue;
            }
        };
        if candidate.trim().chars().count() > MIN_ACCEPTED_CHARS {
            debug!(strategy = strategy.name, chars = candidate.len(), "accepted candidate");
            return Ok(candidate);
        }
        last = Some(candidate);
    }

    match (last, failure) {
        (Some(candidate), _) => {
            debug!("no candidate passed the length check, keeping the simplest");
            Ok(candidate)
        }
        (None, Some(e)) => Err(e),
        (None, None) => Ok(String::new()),
    }
}

/// Group fragments into visual lines by Y, order each line by X.
pub fn positional_lines(fragments: &[TextFragment]) -> Result<String> {
    let mut buckets: BTreeMap<i64, Vec<(i64, &str)>> = BTreeMap::new();

    for fragment in fragments.iter().filter(|f| !f.is_blank()) {
        let non_finite = || ExtractionError::NonFiniteCoordinate {
            content: fragment.content.clone(),
        };
        let y = fragment.rounded_y().ok_or_else(non_finite)?;
        let x = fragment.rounded_x().ok_or_else(non_finite)?;

        let key = buckets
            .keys()
            .copied()
            .find(|existing| existing.abs_diff(y) <= LINE_TOLERANCE)
            .unwrap_or(y);
        buckets.entry(key).or_default().push((x, fragment.content.as_str()));
    }

    let lines: Vec<String> = buckets
        .into_values()
        .rev()
        .filter_map(|mut items| {
            items.sort_by_key(|(x, _)| *x);
            let line = items
                .iter()
                .map(|(_, text)| *text)
                .collect::<Vec<_>>()
                .join(" ")
                .trim()
                .to_string();
            (!line.is_empty()).then_some(line)
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Trimmed non-blank fragments in draw order, single-spaced.
pub fn draw_order(fragments: &[TextFragment]) -> Result<String> {
    let joined = fragments
        .iter()
        .filter(|f| !f.is_blank())
        .map(|f| f.content.trim())
        .collect::<Vec<_>>()
        .join(" ");
    Ok(collapse_whitespace(&joined))
}

/// Raw concatenation with spaces restored at case and digit boundaries.
pub fn run_on_split(fragments: &[TextFragment]) -> Result<String> {
    let joined: String = fragments.iter().map(|f| f.content.as_str()).collect();
    let split = LOWER_UPPER.replace_all(joined.trim(), "$1 $2");
    let split = DIGIT_UPPER.replace_all(&split, "$1 $2");
    Ok(collapse_whitespace(&split))
}

fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RUN.replace_all(text, " ").trim().to_string()
}
