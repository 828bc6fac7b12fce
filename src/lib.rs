//! `fundscan` - find a fund's data inside a PDF report
//!
//! # Pipeline
//!
//! ```text
//! PDF → fragments per page → reconstructed lines → relevance score → best page → LLM extraction
//! ```
//!
//! - **Reconstruction** ([`reconstruct`](mod@reconstruct)): positioned fragments to readable lines
//! - **Scoring** ([`score`](mod@score)): lexical relevance of a page to a fund name
//! - **Scanning** ([`scan`]): sequential best-page search with an overlap guard
//! - **Analysis** ([`analysis`], [`relay`]): holdings, sectors and allocation via an LLM
//!
//! # Example
//!
//! ```rust
//! use fundscan::{Document, Scanner, TextFragment};
//!
//! # tokio_test_block(async {
//! let doc = Document::new(vec![
//!     vec![TextFragment::new("Statutory disclosures", 10.0, 700.0)],
//!     vec![TextFragment::new("Portfolio of HDFC Top 100 Fund", 10.0, 700.0)],
//! ]);
//! let outcome = Scanner::new().scan(&doc, "HDFC Top 100 Fund").await.unwrap();
//! assert_eq!(outcome.best().unwrap().page_number, 2);
//! # });
//! # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```

pub mod analysis;
pub mod config;
pub mod fragment;
pub mod prompt;
pub mod reconstruct;
pub mod relay;
pub mod report;
pub mod scan;
pub mod score;
pub mod source;

pub use analysis::{AnalysisClient, AnalysisError, AnalyzeRequest};
pub use config::{Config, RelayConfig};
pub use fragment::TextFragment;
pub use reconstruct::{reconstruct, reconstruct_page, PageText};
pub use relay::{Relay, RelayError};
pub use report::{AnalysisReport, ReportFormat, ScanReport};
pub use scan::{MatchResult, ScanError, ScanOutcome, ScanState, Scanner};
pub use score::{normalize, score};
pub use source::{load_document, DecodeError, Document, PageSource};

/// Version of fundscan
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
