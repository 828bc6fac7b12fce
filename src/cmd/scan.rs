use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use fundscan::report::{AnalysisReport, ScanReport};
use fundscan::source::{load_document, PageSource};
use fundscan::{AnalysisClient, Config, Scanner};

use crate::OutputFormat;

pub async fn cmd_scan(
    file: &Path,
    fund_name: &str,
    analyze: bool,
    endpoint: Option<&str>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<()> {
    // Only the analysis step reads config, so --no-analyze never touches it
    let analysis_target = if analyze {
        let mut config = Config::load()?;
        if let Some(endpoint) = endpoint {
            config.endpoint = endpoint.to_string();
        }
        Some((config.endpoint_url()?, config.timeout()))
    } else {
        None
    };

    let doc = load_document(file)
        .await
        .with_context(|| format!("Error loading PDF {}", file.display()))?;

    eprintln!("📄 {} ({} pages)", file.display(), doc.page_count());
    eprintln!("🔍 Searching for \"{}\"...", fund_name.trim());

    let outcome = Scanner::new().scan(&doc, fund_name).await?;
    let mut report = ScanReport::new(fund_name, outcome);

    if let Some(best) = report.outcome.best().cloned() {
        let analysis = if let Some((endpoint, timeout)) = analysis_target {
            eprintln!("🤖 Analyzing page {} via {endpoint}...", best.page_number);
            let client = AnalysisClient::new(endpoint, timeout)?;
            let result = client.analyze(&best.text, fund_name).await;
            if let Err(ref e) = result {
                eprintln!("❌ {e}");
            }
            AnalysisReport::from_result(result, fund_name, &best)
        } else {
            AnalysisReport::Skipped
        };
        report.analysis = Some(analysis);
    }

    if let Some(path) = output {
        save_payload(&report, &path)?;
    }

    println!("{}", report.render(format.into())?);

    Ok(())
}

/// Write the part of the report worth keeping: the analysis, the manual
/// prompt when analysis failed, or the raw page text when it was skipped.
fn save_payload(report: &ScanReport, path: &Path) -> Result<()> {
    let Some(best) = report.outcome.best() else {
        eprintln!("⚠️  Nothing to save, no matching page");
        return Ok(());
    };

    let payload = match &report.analysis {
        Some(AnalysisReport::Completed { content }) => content.as_str(),
        Some(AnalysisReport::Failed { manual_prompt, .. }) => manual_prompt.as_str(),
        Some(AnalysisReport::Skipped) | None => best.text.as_str(),
    };

    std::fs::write(path, payload).with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("💾 Saved {} bytes to {}", payload.len(), path.display());
    Ok(())
}
