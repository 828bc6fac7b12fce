//! Sequential page scan for the best-matching fund page.
//!
//! ```text
//! Idle → Scanning → Found | NotFound
//! ```
//!
//! Pages are visited 1..=N in order: decode, reconstruct, score. Every page
//! scoring above zero is kept; the best one wins with a strict `>`, so the
//! first-seen page keeps ties. A single page failing never aborts the scan.

use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::reconstruct::{reconstruct_page, PageText};
use crate::score::score;
use crate::source::PageSource;

/// Pages whose text trims to fewer chars than this are treated as noise.
pub const MIN_PAGE_CHARS: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScanError {
    #[error("Please enter a fund name to search.")]
    EmptyQuery,

    #[error("Please wait for the current search to complete.")]
    AlreadyScanning,
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// A page that scored above zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub page_number: usize,
    pub score: u32,
    pub text: String,
}

/// Terminal result of a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanOutcome {
    Found {
        best: MatchResult,
        matches: Vec<MatchResult>,
        pages_scanned: usize,
    },
    NotFound {
        pages_scanned: usize,
    },
}

impl ScanOutcome {
    pub fn best(&self) -> Option<&MatchResult> {
        match self {
            Self::Found { best, .. } => Some(best),
            Self::NotFound { .. } => None,
        }
    }

    pub fn matches(&self) -> &[MatchResult] {
        match self {
            Self::Found { matches, .. } => matches,
            Self::NotFound { .. } => &[],
        }
    }

    pub fn pages_scanned(&self) -> usize {
        match self {
            Self::Found { pages_scanned, .. } | Self::NotFound { pages_scanned } => *pages_scanned,
        }
    }

    pub fn state(&self) -> ScanState {
        match self {
            Self::Found { .. } => ScanState::Found,
            Self::NotFound { .. } => ScanState::NotFound,
        }
    }
}

/// Lifecycle of a [`Scanner`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ScanState {
    Idle = 0,
    Scanning = 1,
    Found = 2,
    NotFound = 3,
}

impl ScanState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Scanning,
            2 => Self::Found,
            3 => Self::NotFound,
            _ => Self::Idle,
        }
    }
}

/// Runs scans one at a time.
///
/// A second [`Scanner::scan`] while one is in flight is rejected with
/// [`ScanError::AlreadyScanning`], never queued.
#[derive(Debug, Default)]
pub struct Scanner {
    state: AtomicU8,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ScanState {
        ScanState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Scan every page of `source` for `query`.
    #[instrument(skip(self, source), fields(pages = source.page_count()))]
    pub async fn scan<S>(&self, source: &S, query: &str) -> Result<ScanOutcome>
    where
        S: PageSource + ?Sized,
    {
        let query = query.trim();
        if query.is_empty() {
            return Err(ScanError::EmptyQuery);
        }

        let mut guard = self.begin()?;
        let outcome = scan_pages(source, query).await;
        guard.terminal = outcome.state();

        match &outcome {
            ScanOutcome::Found { best, matches, .. } => info!(
                best_page = best.page_number,
                score = best.score,
                matched_pages = matches.len(),
                "scan complete"
            ),
            ScanOutcome::NotFound { pages_scanned } => {
                info!(pages_scanned, "scan complete, no match");
            }
        }
        Ok(outcome)
    }

    fn begin(&self) -> Result<ScanGuard<'_>> {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |s| {
                (s != ScanState::Scanning as u8).then_some(ScanState::Scanning as u8)
            })
            .map_err(|_| ScanError::AlreadyScanning)?;
        Ok(ScanGuard {
            state: &self.state,
            terminal: ScanState::Idle,
        })
    }
}

/// Leaves the scanner in `terminal` when dropped, `Idle` if the scan future
/// was dropped before finishing.
struct ScanGuard<'a> {
    state: &'a AtomicU8,
    terminal: ScanState,
}

impl Drop for ScanGuard<'_> {
    fn drop(&mut self) {
        self.state.store(self.terminal as u8, Ordering::Release);
    }
}

/// Visit pages 1..=N and collect every page scoring above zero.
///
/// Unguarded; callers that need overlap protection go through [`Scanner`].
pub async fn scan_pages<S>(source: &S, query: &str) -> ScanOutcome
where
    S: PageSource + ?Sized,
{
    let page_count = source.page_count();
    let mut matches: Vec<MatchResult> = Vec::new();
    let mut best_idx: Option<usize> = None;

    for page_number in 1..=page_count {
        let fragments = match source.page_fragments(page_number).await {
            Ok(fragments) => fragments,
            Err(e) => {
                warn!(page = page_number, error = %e, "skipping undecodable page");
                continue;
            }
        };
        if fragments.is_empty() {
            debug!(page = page_number, "no fragments");
            continue;
        }

        let text = match reconstruct_page(&fragments) {
            PageText::Text(text) => text,
            other => {
                debug!(page = page_number, reason = %other, "no usable text");
                continue;
            }
        };
        if text.trim().chars().count() < MIN_PAGE_CHARS {
            debug!(page = page_number, "text too short");
            continue;
        }

        let page_score = score(&text, query);
        debug!(page = page_number, score = page_score, "scored");
        if page_score == 0 {
            continue;
        }

        if best_idx.is_none_or(|idx| page_score > matches[idx].score) {
            best_idx = Some(matches.len());
        }
        matches.push(MatchResult {
            page_number,
            score: page_score,
            text,
        });
    }

    match best_idx {
        Some(idx) => ScanOutcome::Found {
            best: matches[idx].clone(),
            matches,
            pages_scanned: page_count,
        },
        None => ScanOutcome::NotFound {
            pages_scanned: page_count,
        },
    }
}
