//! Client configuration and TOML loader.
//!
//! Reads `config.toml` (by convention from `~/.colloquy/`) and falls back
//! to defaults when the file is missing or malformed. The API key is
//! wrapped in [`secrecy::SecretString`] and never appears in Debug output.

use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;

/// Default request timeout. Long, to cover slow model generations.
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for the assistant gateway.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base URL of the gateway, without a trailing slash.
    pub base_url: String,
    /// API key sent as `Authorization: ApiKey <key>` when present.
    pub api_key: Option<SecretString>,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            api_key: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Load gateway configuration from a TOML file.
///
/// - If the file does not exist, returns [`GatewayConfig::default()`].
/// - If the file exists but cannot be read or parsed, logs a warning and
///   returns the default.
pub async fn load_config(path: &Path) -> GatewayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("no config at {}, using defaults", path.display());
            return GatewayConfig::default();
        }
        Err(err) => {
            tracing::warn!("failed to read {}: {err}, using defaults", path.display());
            return GatewayConfig::default();
        }
    };

    match toml::from_str::<GatewayConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("failed to parse {}: {err}, using defaults", path.display());
            GatewayConfig::default()
        }
    }
}
