use std::path::Path;

use anyhow::{Context, Result};

use fundscan::report::debug_report;
use fundscan::source::load_document;

pub async fn cmd_debug(file: &Path, pages: usize) -> Result<()> {
    let doc = load_document(file)
        .await
        .with_context(|| format!("Error loading PDF {}", file.display()))?;

    eprintln!("🔍 Extracting text from {}", file.display());
    println!("{}", debug_report(&doc, pages)?);

    Ok(())
}
