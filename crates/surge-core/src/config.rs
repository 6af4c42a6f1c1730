//! surge.toml configuration parser.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration, one section per process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurgeConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub monitor: MonitorConfig,
}

/// Compute service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub listen_addr: String,
    /// Port to listen on.
    pub port: u16,
    /// Width of the request-rate window (e.g. "60s").
    pub window: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            port: 5000,
            window: "60s".to_string(),
        }
    }
}

/// Migration monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Compute service address to poll (host:port).
    pub metrics_addr: String,
    /// Path of the metrics endpoint.
    pub metrics_endpoint: String,
    /// Time between polls (e.g. "10s").
    pub poll_interval: String,
    /// Per-fetch HTTP timeout (e.g. "5s").
    pub http_timeout: String,
    /// Request rate strictly above which migration triggers.
    pub rpm_threshold: u64,
    /// Cloud instance started on trigger.
    pub instance_id: String,
    /// Region the instance lives in.
    pub region: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            metrics_addr: "127.0.0.1:5000".to_string(),
            metrics_endpoint: "/metrics".to_string(),
            poll_interval: "10s".to_string(),
            http_timeout: "5s".to_string(),
            rpm_threshold: 100,
            instance_id: "i-0123456789abcdef0".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

impl SurgeConfig {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SurgeConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Parse a duration string like "5s", "500ms", "2m". A bare number is
/// taken as seconds.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        ms.parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = s.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else {
        s.parse::<u64>().ok().map(Duration::from_secs)
    }
}
