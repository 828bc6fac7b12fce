//! Configuration loaded from `~/.config/fundscan/config.toml`.
//!
//! Every key is optional:
//!
//! ```toml
//! endpoint = "http://localhost:3000/api/analyze"
//! timeout_secs = 60
//!
//! [relay]
//! bind = "127.0.0.1:3000"
//! provider_url = "https://api.openai.com/v1/chat/completions"
//! model = "gpt-4o-mini"
//! temperature = 0.2
//! api_key_env = "OPENAI_API_KEY"
//! ```
//!
//! `FUNDSCAN_ENDPOINT` overrides `endpoint`. The provider credential is only
//! ever read from the environment variable named by `api_key_env`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

use crate::analysis::DEFAULT_ENDPOINT;

/// Environment variable overriding the analysis endpoint.
pub const ENDPOINT_ENV: &str = "FUNDSCAN_ENDPOINT";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint: String,
    pub timeout_secs: u64,
    pub relay: RelayConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: 60,
            relay: RelayConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    pub bind: SocketAddr,
    pub provider_url: String,
    pub model: String,
    pub temperature: f64,
    pub api_key_env: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 3000)),
            provider_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

impl RelayConfig {
    pub fn provider_url(&self) -> Result<Url> {
        Url::parse(&self.provider_url)
            .with_context(|| format!("invalid relay.provider_url {:?}", self.provider_url))
    }

    /// Provider credential from the environment, if set and non-empty.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|k| !k.trim().is_empty())
    }
}

impl Config {
    /// Load from the default location, applying environment overrides.
    ///
    /// A missing file yields defaults.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&config_path())?;
        if let Ok(endpoint) = std::env::var(ENDPOINT_ENV) {
            config.endpoint = endpoint;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load a specific file without environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;

        let config: Self =
            toml::from_str(&content).with_context(|| format!("invalid TOML in {}", path.display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.endpoint_url()?;
        self.relay.provider_url()?;
        Ok(())
    }

    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).with_context(|| format!("invalid endpoint {:?}", self.endpoint))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Return the path to the config file.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("fundscan")
        .join("config.toml")
}
