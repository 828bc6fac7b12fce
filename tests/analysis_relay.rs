//! Analysis client → relay → provider round trips over loopback.
//!
//! A stub provider stands in for the chat-completion API so the relay's
//! credential handling and error pass-through can be checked end to end.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use url::Url;

use fundscan::analysis::{AnalysisClient, AnalysisError};
use fundscan::config::RelayConfig;
use fundscan::relay::{router, Relay};

/// What the stub provider saw on its last call.
#[derive(Default)]
struct Seen {
    authorization: Option<String>,
    body: Option<Value>,
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn ok_provider(
    State(seen): State<Arc<Mutex<Seen>>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    let mut seen = seen.lock().await;
    seen.authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    seen.body = Some(body);
    Json(json!({
        "id": "chatcmpl-1",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "| HDFC Bank | 9.84% |"}}]
    }))
}

async fn rejecting_provider() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}})),
    )
}

async fn start_relay(provider: SocketAddr, api_key: Option<&str>) -> SocketAddr {
    let config = RelayConfig {
        provider_url: format!("http://{provider}/v1/chat/completions"),
        ..RelayConfig::default()
    };
    let relay = Arc::new(Relay::new(&config, api_key.map(String::from)).unwrap());
    serve(router(relay)).await
}

fn client(relay: SocketAddr) -> AnalysisClient {
    let endpoint = Url::parse(&format!("http://{relay}/api/analyze")).unwrap();
    AnalysisClient::new(endpoint, Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn round_trip_returns_model_content() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let provider = serve(
        Router::new()
            .route("/v1/chat/completions", post(ok_provider))
            .with_state(seen.clone()),
    )
    .await;
    let relay = start_relay(provider, Some("sk-test")).await;

    let content = client(relay)
        .analyze("HDFC Bank Ltd. 9.84", "HDFC Top 100 Fund")
        .await
        .unwrap();
    assert_eq!(content, "| HDFC Bank | 9.84% |");

    let seen = seen.lock().await;
    assert_eq!(seen.authorization.as_deref(), Some("Bearer sk-test"));
    let body = seen.body.as_ref().unwrap();
    assert_eq!(body["model"], "gpt-4o-mini");
    assert_eq!(body["messages"][0]["role"], "system");
    let prompt = body["messages"][1]["content"].as_str().unwrap();
    assert!(prompt.contains("financial fund 'HDFC Top 100 Fund'"));
    assert!(prompt.contains("--- TEXT FROM PDF ---\nHDFC Bank Ltd. 9.84\n--- END OF TEXT ---"));
}

#[tokio::test]
async fn blank_fund_name_defaults_in_request() {
    let seen = Arc::new(Mutex::new(Seen::default()));
    let provider = serve(
        Router::new()
            .route("/v1/chat/completions", post(ok_provider))
            .with_state(seen.clone()),
    )
    .await;
    let relay = start_relay(provider, Some("sk-test")).await;

    client(relay).analyze("text", "  ").await.unwrap();

    let seen = seen.lock().await;
    let prompt = seen.body.as_ref().unwrap()["messages"][1]["content"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(prompt.contains("financial fund 'the fund'"));
}

#[tokio::test]
async fn missing_credential_surfaces_as_server_error() {
    let provider = serve(Router::new().route("/v1/chat/completions", post(rejecting_provider))).await;
    let relay = start_relay(provider, None).await;

    let err = client(relay).analyze("text", "Axis").await.unwrap_err();
    match err {
        AnalysisError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "API key is not configured on the server.");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn provider_error_message_is_propagated() {
    let provider = serve(Router::new().route("/v1/chat/completions", post(rejecting_provider))).await;
    let relay = start_relay(provider, Some("sk-wrong")).await;

    let err = client(relay).analyze("text", "Axis").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Server { status: 500, .. }));
    assert_eq!(
        err.to_string(),
        "Failed to get analysis: Incorrect API key provided"
    );
}

#[tokio::test]
async fn unreadable_request_body_gets_json_error() {
    let relay = start_relay("127.0.0.1:9".parse().unwrap(), Some("sk-test")).await;
    let url = format!("http://{relay}/api/analyze");
    let http = reqwest::Client::new();

    let response = http
        .post(&url)
        .json(&json!({"textChunk": "HDFC Bank Ltd. 9.84"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 422);
    let body: Value = response.json().await.unwrap();
    let message = body["error"].as_str().unwrap();
    assert!(message.starts_with("Invalid request body:"));
    assert!(message.contains("fundName"));

    let response = http
        .post(&url)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request body:"));
}

#[tokio::test]
async fn malformed_success_body_is_typed() {
    // Relay-shaped endpoint answering 200 without choices
    let endpoint = serve(Router::new().route(
        "/api/analyze",
        post(|| async { Json(json!({"object": "chat.completion", "choices": []})) }),
    ))
    .await;

    let err = client(endpoint).analyze("text", "Axis").await.unwrap_err();
    assert!(matches!(err, AnalysisError::MalformedResponse(_)));
}

#[tokio::test]
async fn non_json_error_body_defaults_message() {
    let endpoint = serve(Router::new().route(
        "/api/analyze",
        post(|| async { (StatusCode::BAD_GATEWAY, "upstream down") }),
    ))
    .await;

    let err = client(endpoint).analyze("text", "Axis").await.unwrap_err();
    match err {
        AnalysisError::Server { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Server error");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(addr).analyze("text", "Axis").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Transport(_)));
}
