use std::fs;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Origin of the prediction-market API. When unset every upstream call fails
    /// with a configuration error.
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Path segment used for price history (`{base}/{history_path}/{tokenId}`).
    pub history_path: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 10,
            user_agent: "marketlens/0.1".to_string(),
            history_path: "history".to_string(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    /// Period of the metrics snapshot log line; 0 disables it.
    pub metrics_log_secs: u64,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            metrics_log_secs: 60,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub monitoring: MonitoringConfig,
}

impl AppConfig {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file at {path}"))?;
        let cfg: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to deserialize TOML config at {path}"))?;
        Ok(cfg)
    }

    /// Apply command-line / environment overrides on top of file values.
    /// A blank upstream base counts as "not configured".
    pub fn with_overrides(
        mut self,
        upstream_base: Option<String>,
        host: Option<String>,
        port: Option<u16>,
    ) -> Self {
        if let Some(base) = upstream_base {
            let base = base.trim();
            self.upstream.base_url = if base.is_empty() {
                None
            } else {
                Some(base.to_string())
            };
        }
        if let Some(host) = host {
            self.server.host = host;
        }
        if let Some(port) = port {
            self.server.port = port;
        }
        self
    }
}
