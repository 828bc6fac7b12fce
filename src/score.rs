//! Lexical relevance scoring of page text against a fund name.
//!
//! A cheap heuristic rather than semantic search. Every component is
//! additive and independent:
//!
//! | Component | Points |
//! |-----------|--------|
//! | normalized query appears verbatim | 100 |
//! | each query word (> 2 chars) found | 10 |
//! | ≥ 70% of those words found | 20 |
//! | leading / trailing 70% of raw query found | 5 each |
//!
//! The partial components tolerate truncated or noisy PDF text while the
//! exact phrase still dominates.

use once_cell::sync::Lazy;
use regex::Regex;

pub const EXACT_PHRASE_POINTS: u32 = 100;
pub const WORD_POINTS: u32 = 10;
pub const COVERAGE_POINTS: u32 = 20;
pub const FUZZY_POINTS: u32 = 5;

/// Fraction of qualifying words that must be present for the coverage bonus.
pub const COVERAGE_THRESHOLD: f64 = 0.7;

/// Words must be longer than this many chars to count.
const MIN_WORD_CHARS: usize = 2;

// Word characters are ASCII only; accented letters count as punctuation.
static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9A-Za-z_\s]").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lowercase, replace punctuation with spaces, collapse and trim whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let spaced = PUNCTUATION.replace_all(&lowered, " ");
    WHITESPACE_RUN.replace_all(&spaced, " ").trim().to_string()
}

/// Score `page_text` for relevance to `query`. Zero means no match.
pub fn score(page_text: &str, query: &str) -> u32 {
    let text = normalize(page_text);
    let phrase = normalize(query);

    let mut total = 0;

    if !phrase.is_empty() && text.contains(&phrase) {
        total += EXACT_PHRASE_POINTS;
    }

    let words: Vec<&str> = phrase
        .split(' ')
        .filter(|w| w.chars().count() > MIN_WORD_CHARS)
        .collect();
    let found = words.iter().filter(|w| text.contains(**w)).count();
    total += WORD_POINTS * found as u32;

    if !words.is_empty() && found as f64 / words.len() as f64 >= COVERAGE_THRESHOLD {
        total += COVERAGE_POINTS;
    }

    for part in fuzzy_parts(query) {
        if part.chars().count() > 3 && text.contains(&part) {
            total += FUZZY_POINTS;
        }
    }

    total
}

/// Leading and trailing 70% slices of the raw query, lowercased.
///
/// Only produced for queries longer than four chars.
fn fuzzy_parts(query: &str) -> Vec<String> {
    let chars: Vec<char> = query.chars().collect();
    let len = chars.len();
    if len <= 4 {
        return Vec::new();
    }
    let head_end = len * 7 / 10;
    let tail_start = len * 3 / 10;
    vec![
        chars[..head_end].iter().collect::<String>().to_lowercase(),
        chars[tail_start..].iter().collect::<String>().to_lowercase(),
    ]
}
