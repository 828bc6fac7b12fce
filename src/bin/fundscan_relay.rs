//! fundscan relay - forwards analysis requests to the LLM provider
//!
//! Keeps the provider credential off the client. Usage:
//!
//!   OPENAI_API_KEY=sk-... fundscan-relay --bind 127.0.0.1:3000

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fundscan::relay::{router, Relay};
use fundscan::Config;

#[derive(Parser)]
#[command(name = "fundscan-relay")]
#[command(about = "HTTP relay between fundscan and the LLM provider")]
#[command(version)]
struct Args {
    /// Address to listen on (overrides relay.bind)
    #[arg(long)]
    bind: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let config = Config::load()?;
    let bind = args.bind.unwrap_or(config.relay.bind);

    let relay = Arc::new(Relay::new(&config.relay, config.relay.api_key())?);
    if !relay.has_credential() {
        warn!(
            env = %config.relay.api_key_env,
            "No provider credential set; every request will fail"
        );
    }

    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    info!(
        addr = %listener.local_addr()?,
        model = %config.relay.model,
        "Relay listening"
    );

    axum::serve(listener, router(relay))
        .await
        .context("relay server stopped")?;

    Ok(())
}
