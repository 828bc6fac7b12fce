//! Client for the analysis endpoint.
//!
//! Posts `{ textChunk, fundName }` and expects a chat-completion shaped
//! body back. Transport and shape problems come back as a typed
//! [`AnalysisError`], so callers never inspect raw JSON.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, instrument};
use url::Url;

use crate::prompt::{non_blank_or, DEFAULT_FUND_NAME};

/// Endpoint the relay listens on by default.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/analyze";

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to get analysis: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to get analysis: {message}")]
    Server { status: u16, message: String },

    #[error("Failed to get analysis: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Request body shared by the client and the relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub text_chunk: String,
    pub fund_name: String,
}

/// Chat-completion response, reduced to the part we read.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the analysis endpoint.
pub struct AnalysisClient {
    client: Client,
    endpoint: Url,
}

impl AnalysisClient {
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Ask the endpoint to extract holdings, sectors and allocation from
    /// `page_text`. Returns the model's message content.
    #[instrument(skip(self, page_text), fields(endpoint = %self.endpoint, chars = page_text.len()))]
    pub async fn analyze(&self, page_text: &str, fund_name: &str) -> Result<String> {
        let request = AnalyzeRequest {
            text_chunk: page_text.to_string(),
            fund_name: non_blank_or(fund_name, DEFAULT_FUND_NAME).to_string(),
        };

        debug!("Posting analysis request");
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        info!(status = %status, "Analysis response received");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or_else(|| "Server error".to_string());
            return Err(AnalysisError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        extract_content(&body)
    }
}

/// Pull `choices[0].message.content` out of a chat-completion body.
pub fn extract_content(body: &str) -> Result<String> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedResponse(format!("invalid JSON from server: {e}")))?;

    completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .ok_or_else(|| {
            AnalysisError::MalformedResponse("Invalid response structure from server.".to_string())
        })
}
