//! Configuration Management
//!
//! Handles persistent configuration storage for tkino and resolution of the
//! backend base URL.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Backend used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://x8ki-letl-twmt.n7.xano.io/api:j6hO02gL";

/// Environment variable overriding the configured base URL
pub const BASE_URL_ENV: &str = "TKINO_BASE_URL";

const DEFAULT_TOAST_MS: u64 = 2600;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Development proxy: a base URL starting with `prefix` is sent to
/// `target` with the prefix replaced by `rewrite`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DevProxy {
    pub prefix: String,
    pub target: String,
    pub rewrite: String,
}

impl Default for DevProxy {
    fn default() -> Self {
        Self {
            prefix: "/xano".to_string(),
            target: "https://x8ki-letl-twmt.n7.xano.io".to_string(),
            rewrite: "/api:j6hO02gL".to_string(),
        }
    }
}

impl DevProxy {
    /// Rewrite `base` when it goes through the proxy prefix
    pub fn resolve(&self, base: &str) -> String {
        match base.strip_prefix(&self.prefix) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => format!(
                "{}{}{}",
                self.target.trim_end_matches('/'),
                self.rewrite,
                rest
            ),
            _ => base.to_string(),
        }
    }
}

/// User configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend base URL
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub dev_proxy: DevProxy,
    /// Last viewed resource
    #[serde(default)]
    pub last_resource: Option<String>,
    /// How long toasts stay visible
    #[serde(default)]
    pub toast_duration_ms: Option<u64>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Config {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tkino").join("config.json"))
    }

    /// Load configuration from disk
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Effective base URL (CLI > environment > config > default), passed
    /// through the dev proxy and validated.
    pub fn effective_base_url(
        &self,
        cli: Option<&str>,
        env: Option<&str>,
        dev: bool,
    ) -> Result<String> {
        let chosen = if dev {
            self.dev_proxy.prefix.as_str()
        } else {
            cli.or(env)
                .or(self.base_url.as_deref())
                .unwrap_or(DEFAULT_BASE_URL)
        };

        let resolved = self.dev_proxy.resolve(chosen.trim());
        url::Url::parse(&resolved)
            .with_context(|| format!("Invalid base URL '{}'", resolved))?;
        Ok(resolved.trim_end_matches('/').to_string())
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_millis(self.toast_duration_ms.unwrap_or(DEFAULT_TOAST_MS))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Set last viewed resource and save
    pub fn set_last_resource(&mut self, key: &str) -> Result<()> {
        if self.last_resource.as_deref() == Some(key) {
            return Ok(());
        }
        self.last_resource = Some(key.to_string());
        self.save()
    }
}
