//! `fundscan` CLI - find a fund's page in a PDF report and extract its holdings

mod cmd;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use fundscan::report::{ReportFormat, DEBUG_DEFAULT_PAGES};

#[derive(Parser)]
#[command(name = "fundscan")]
#[command(about = "Locate a fund inside a PDF report and extract holdings, sectors and allocation")]
#[command(version)]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find the best page for a fund and analyze it
    Scan {
        /// Report to search (.pdf, or a pdf.js .json text dump)
        file: PathBuf,

        /// Fund name to look for
        #[arg(required = true, num_args = 1..)]
        fund: Vec<String>,

        /// Only locate the page, skip the LLM call
        #[arg(long)]
        no_analyze: bool,

        /// Analysis endpoint (overrides config and FUNDSCAN_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Save the analysis (or the manual prompt on failure) to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a ready-to-paste analysis prompt for the best page
    Prompt {
        /// Report to search (.pdf, or a pdf.js .json text dump)
        file: PathBuf,

        /// Fund name to look for
        #[arg(required = true, num_args = 1..)]
        fund: Vec<String>,
    },

    /// Show what text each page yields
    Debug {
        /// Report to inspect (.pdf, or a pdf.js .json text dump)
        file: PathBuf,

        /// Number of pages to show
        #[arg(short, long, default_value_t = DEBUG_DEFAULT_PAGES)]
        pages: usize,
    },
}

#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => ReportFormat::Text,
            OutputFormat::Json => ReportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pipeable
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.command {
        Commands::Scan {
            file,
            fund,
            no_analyze,
            endpoint,
            format,
            output,
        } => {
            cmd::scan::cmd_scan(
                &file,
                &fund.join(" "),
                !no_analyze,
                endpoint.as_deref(),
                format,
                output,
            )
            .await?;
        }
        Commands::Prompt { file, fund } => {
            cmd::prompt::cmd_prompt(&file, &fund.join(" ")).await?;
        }
        Commands::Debug { file, pages } => {
            cmd::debug::cmd_debug(&file, pages).await?;
        }
    }

    Ok(())
}
