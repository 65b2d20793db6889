use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Base URL of an OpenAI-compatible gateway (no trailing slash).
    #[serde(default = "default_url")]
    pub url: String,
    /// Model identifier. When unset, the first model listed by the
    /// gateway's `/v1/models` endpoint is used.
    #[serde(default)]
    pub model: Option<String>,
    /// Name of the environment variable holding the gateway API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            model: None,
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_url() -> String {
    "https://api.openai.com".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_timeout_secs() -> u64 {
    120
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.server.bind.is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    if config.provider.url.is_empty() {
        anyhow::bail!("provider.url must not be empty");
    }

    if config.provider.timeout_secs == 0 {
        anyhow::bail!("provider.timeout_secs must be > 0");
    }

    Ok(config)
}
