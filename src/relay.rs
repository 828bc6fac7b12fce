//! Relay between the analysis client and an LLM provider.
//!
//! Holds the provider credential server-side. `POST /api/analyze` turns an
//! [`AnalyzeRequest`] into a chat-completion call and returns the provider's
//! JSON untouched. Every failure carries `{"error": "..."}`:
//!
//! - unreadable request body: the extractor's status (400/415/422) and reason
//! - no credential configured: 500, fail closed before calling out
//! - provider error: 500 with its `error.message` passed through
//! - transport error: 500 with the error text

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument, warn};
use url::Url;

use crate::analysis::AnalyzeRequest;
use crate::config::RelayConfig;
use crate::prompt::{relay_prompt, SYSTEM_PROMPT};

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("Invalid request body: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    #[error("API key is not configured on the server.")]
    MissingCredential,

    #[error("{message}")]
    Upstream { status: u16, message: String },

    #[error("{0}")]
    Transport(#[from] reqwest::Error),
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidRequest { status, .. } => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<JsonRejection> for RelayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

/// Upstream provider client plus the credential it signs with.
pub struct Relay {
    client: Client,
    provider_url: Url,
    model: String,
    temperature: f64,
    api_key: Option<String>,
}

impl Relay {
    pub fn new(config: &RelayConfig, api_key: Option<String>) -> anyhow::Result<Self> {
        let client = Client::builder()
            .use_rustls_tls()
            .gzip(true)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(120))
            .build()
            .context("failed to build provider client")?;

        Ok(Self {
            client,
            provider_url: config.provider_url()?,
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
        })
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Forward one analysis request to the provider.
    #[instrument(skip(self, request), fields(fund = %request.fund_name, model = %self.model))]
    pub async fn forward(&self, request: &AnalyzeRequest) -> Result<Value, RelayError> {
        let api_key = self.api_key.as_deref().ok_or(RelayError::MissingCredential)?;

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: relay_prompt(&request.fund_name, &request.text_chunk),
                },
            ],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(self.provider_url.clone())
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        info!(status = %status, "Provider response received");

        if !status.is_success() {
            let error_body: Value = response.json().await.unwrap_or(Value::Null);
            let message = error_body["error"]["message"]
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Upstream error")
                        .to_string()
                });
            warn!(status = %status, message = %message, "Provider rejected request");
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Router exposing `POST /api/analyze` with permissive CORS.
pub fn router(relay: Arc<Relay>) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .layer(CorsLayer::permissive())
        .with_state(relay)
}

async fn analyze(
    State(relay): State<Arc<Relay>>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Value>, RelayError> {
    let Json(request) = payload.inspect_err(|e| warn!(error = %e, "Rejected request body"))?;
    relay.forward(&request).await.map(Json)
}
