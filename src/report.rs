//! Scan report generation
//!
//! Turns scan outcomes and analysis results into user-facing text or JSON,
//! and renders the per-page debug listing.

use std::fmt::Write as FmtWrite;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::fragment::TextFragment;
use crate::prompt::manual_prompt;
use crate::reconstruct::reconstruct;
use crate::scan::{MatchResult, ScanOutcome};
use crate::source::{Document, PageSource};

/// Pages shown by the debug report unless told otherwise.
pub const DEBUG_DEFAULT_PAGES: usize = 5;

const DEBUG_PREVIEW_CHARS: usize = 500;
const DEBUG_RAW_ITEMS: usize = 10;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Format error: {0}")]
    Format(#[from] std::fmt::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// Human-readable messages (default)
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// What happened to the best match after the scan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AnalysisReport {
    Completed {
        content: String,
    },
    /// Analysis failed; the extracted text survives in `manual_prompt`.
    Failed {
        error: String,
        manual_prompt: String,
    },
    Skipped,
}

impl AnalysisReport {
    pub fn from_result(
        result: std::result::Result<String, AnalysisError>,
        fund_name: &str,
        best: &MatchResult,
    ) -> Self {
        match result {
            Ok(content) => Self::Completed { content },
            Err(e) => Self::Failed {
                error: e.to_string(),
                manual_prompt: manual_prompt(fund_name, &best.text),
            },
        }
    }
}

/// Everything one `scan` invocation produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub fund_name: String,
    pub scanned_at: DateTime<Utc>,
    pub outcome: ScanOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisReport>,
}

impl ScanReport {
    pub fn new(fund_name: &str, outcome: ScanOutcome) -> Self {
        Self {
            fund_name: fund_name.trim().to_string(),
            scanned_at: Utc::now(),
            outcome,
            analysis: None,
        }
    }

    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ReportFormat::Text => self.to_text(),
        }
    }

    fn to_text(&self) -> Result<String> {
        let mut out = String::new();

        let Some(best) = self.outcome.best() else {
            out.push_str(&not_found_message(&self.fund_name));
            return Ok(out);
        };

        writeln!(out, "{}", found_summary(&self.outcome))?;

        match &self.analysis {
            Some(AnalysisReport::Completed { content }) => {
                writeln!(out, "\nAI Analysis Results (from Page {}):\n", best.page_number)?;
                writeln!(out, "{content}")?;
            }
            Some(AnalysisReport::Failed {
                error,
                manual_prompt,
            }) => {
                out.push_str(&analysis_failure_message(best.page_number, error));
                writeln!(out, "\n{manual_prompt}")?;
            }
            Some(AnalysisReport::Skipped) | None => {
                writeln!(out, "\nText from Page {}:\n", best.page_number)?;
                writeln!(out, "{}", best.text)?;
            }
        }

        Ok(out)
    }
}

/// One-line summary of a successful scan.
pub fn found_summary(outcome: &ScanOutcome) -> String {
    match outcome.best() {
        Some(best) => format!(
            "Found matches on {} page(s). Best match on page {} (score: {}).",
            outcome.matches().len(),
            best.page_number,
            best.score
        ),
        None => "No matching page found.".to_string(),
    }
}

/// Not-found outcome with remediation suggestions.
pub fn not_found_message(fund_name: &str) -> String {
    format!(
        "Fund \"{fund_name}\" was not found in the PDF.

Suggestions:
• Try searching for just part of the fund name
• Check the spelling
• Run `fundscan debug <FILE>` to see the available text
• Try searching for keywords like \"equity\", \"debt\", \"fund\" etc.
"
    )
}

/// Explanation shown when analysis failed, before the manual prompt.
pub fn analysis_failure_message(page_number: usize, error: &str) -> String {
    format!(
        "\nAI Processing Failed for page {page_number}:
{error}

Suggestions:
• The AI could not process the text from page {page_number}. Paste the prompt below into any chat model to process it manually.
• Re-run with RUST_LOG=debug for technical details.
• Ensure the relay is running and its API key is correct and active.
"
    )
}

/// Per-page listing of fragment counts, extracted text and raw fragments.
pub fn debug_report(doc: &Document, max_pages: usize) -> Result<String> {
    let total = doc.page_count();
    let mut out = String::new();

    writeln!(out, "PDF Analysis:\n- Total Pages: {total}\n")?;

    for (page_number, fragments) in doc.pages().take(max_pages) {
        writeln!(out, "=== PAGE {page_number} ===")?;
        writeln!(out, "Text Items Found: {}", fragments.len())?;

        if fragments.is_empty() {
            writeln!(out, "No text items found on this page.\n")?;
            continue;
        }

        let text = reconstruct(fragments);
        let preview: String = text.chars().take(DEBUG_PREVIEW_CHARS).collect();
        writeln!(out, "Extracted Text Length: {} characters", text.chars().count())?;
        writeln!(out, "First {DEBUG_PREVIEW_CHARS} chars:\n{preview}...\n")?;
        writeln!(out, "Raw text items (first {DEBUG_RAW_ITEMS}):")?;
        for (idx, fragment) in fragments.iter().take(DEBUG_RAW_ITEMS).enumerate() {
            writeln!(out, "{}. {}", idx + 1, describe_fragment(fragment))?;
        }
        writeln!(out)?;
    }

    if total > max_pages {
        write!(
            out,
            "... and {} more pages not shown in this debug output.",
            total - max_pages
        )?;
    }

    Ok(out)
}

fn describe_fragment(fragment: &TextFragment) -> String {
    let coord = |v: Option<i64>| v.map_or_else(|| "?".to_string(), |v| v.to_string());
    format!(
        "{:?} (x:{}, y:{})",
        fragment.content,
        coord(fragment.rounded_x()),
        coord(fragment.rounded_y())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn best() -> MatchResult {
        MatchResult {
            page_number: 2,
            score: 170,
            text: "HDFC Top 100 Fund holdings".into(),
        }
    }

    fn found() -> ScanOutcome {
        ScanOutcome::Found {
            best: best(),
            matches: vec![best()],
            pages_scanned: 3,
        }
    }

    #[test]
    fn summary_lists_page_and_score() {
        assert_eq!(
            found_summary(&found()),
            "Found matches on 1 page(s). Best match on page 2 (score: 170)."
        );
    }

    #[test]
    fn not_found_text_has_suggestions() {
        let report = ScanReport::new(" Axis ", ScanOutcome::NotFound { pages_scanned: 4 });
        let text = report.render(ReportFormat::Text).unwrap();
        assert!(text.starts_with("Fund \"Axis\" was not found in the PDF."));
        assert!(text.contains("Check the spelling"));
    }

    #[test]
    fn failed_analysis_keeps_page_text() {
        let mut report = ScanReport::new("HDFC Top 100 Fund", found());
        report.analysis = Some(AnalysisReport::from_result(
            Err(AnalysisError::MalformedResponse("Invalid response structure from server.".into())),
            "HDFC Top 100 Fund",
            &best(),
        ));
        let text = report.render(ReportFormat::Text).unwrap();
        assert!(text.contains("AI Processing Failed for page 2"));
        assert!(text.contains("--- TEXT TO ANALYZE ---\nHDFC Top 100 Fund holdings"));
    }

    #[test]
    fn completed_analysis_is_printed() {
        let mut report = ScanReport::new("HDFC Top 100 Fund", found());
        report.analysis = Some(AnalysisReport::Completed {
            content: "| HDFC Bank | 9.8% |".into(),
        });
        let text = report.render(ReportFormat::Text).unwrap();
        assert!(text.contains("AI Analysis Results (from Page 2)"));
        assert!(text.contains("| HDFC Bank | 9.8% |"));
    }

    #[test]
    fn json_report_is_tagged() {
        let mut report = ScanReport::new("HDFC Top 100 Fund", found());
        report.analysis = Some(AnalysisReport::Skipped);
        let json: serde_json::Value =
            serde_json::from_str(&report.render(ReportFormat::Json).unwrap()).unwrap();
        assert_eq!(json["outcome"]["status"], "found");
        assert_eq!(json["outcome"]["best"]["page_number"], 2);
        assert_eq!(json["analysis"]["status"], "skipped");
    }

    #[test]
    fn debug_report_limits_pages_and_items() {
        let many: Vec<TextFragment> = (0..12)
            .map(|i| TextFragment::new(format!("w{i}"), f64::from(i) * 10.0, 100.0))
            .collect();
        let doc = Document::new(vec![many, vec![], vec![], vec![]]);
        let text = debug_report(&doc, 2).unwrap();
        assert!(text.contains("- Total Pages: 4"));
        assert!(text.contains("Text Items Found: 12"));
        assert!(text.contains("10. \"w9\" (x:90, y:100)"));
        assert!(!text.contains("11. "));
        assert!(text.contains("No text items found on this page."));
        assert!(!text.contains("=== PAGE 3 ==="));
        assert!(text.ends_with("... and 2 more pages not shown in this debug output."));
    }
}
