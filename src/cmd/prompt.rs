use std::path::Path;

use anyhow::{Context, Result};

use fundscan::prompt::manual_prompt;
use fundscan::report::{found_summary, not_found_message};
use fundscan::source::load_document;
use fundscan::Scanner;

pub async fn cmd_prompt(file: &Path, fund_name: &str) -> Result<()> {
    let doc = load_document(file)
        .await
        .with_context(|| format!("Error loading PDF {}", file.display()))?;

    let outcome = Scanner::new().scan(&doc, fund_name).await?;

    match outcome.best() {
        Some(best) => {
            eprintln!("✅ {}", found_summary(&outcome));
            println!("{}", manual_prompt(fund_name, &best.text));
        }
        None => eprintln!("{}", not_found_message(fund_name.trim())),
    }

    Ok(())
}
