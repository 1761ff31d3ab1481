//! Lifecycle configuration.
//!
//! Loaded from an optional TOML file, then overridden by environment
//! variables. The cloud provider is resolved once from the loaded values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

use crate::models::constants::{
    DEFAULT_BROWSERSTACK_API_BASE, DEFAULT_CAPTURE_TIMEOUT_SECS, DEFAULT_DEVICE_LOGS_DIR,
    DEFAULT_HEADSPIN_UI_BASE, DEFAULT_HTTP_CONNECT_TIMEOUT_SECS, DEFAULT_REPORT_LINK_TIMEOUT_SECS,
    DEFAULT_REPORT_ROOT, DEFAULT_SCREENSHOTS_DIR,
};
use crate::report::CloudProvider;

pub const ENV_CLOUD_NAME: &str = "CLOUD_NAME";
pub const ENV_CLOUD_EXECUTION: &str = "CLOUD_EXECUTION";
pub const ENV_CLOUD_USER: &str = "CLOUD_USER";
pub const ENV_CLOUD_KEY: &str = "CLOUD_KEY";
pub const ENV_PROXY_URL: &str = "PROXY_URL";
pub const ENV_REPORT_ROOT: &str = "REPORT_ROOT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    /// Device farm name (`pCloudy`, `Headspin`, `BrowserStack`); empty for local runs.
    pub cloud_name: String,
    pub cloud_execution: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_url: Option<String>,
    pub report_root: PathBuf,
    pub device_logs_dir: String,
    pub screenshots_dir: String,
    pub browserstack_api_base: String,
    pub headspin_ui_base: String,
    pub accept_invalid_certs: bool,
    pub capture_timeout_secs: u64,
    pub report_link_timeout_secs: u64,
    pub http_connect_timeout_secs: u64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            cloud_execution: false,
            cloud_user: None,
            cloud_key: None,
            proxy_url: None,
            report_root: PathBuf::from(DEFAULT_REPORT_ROOT),
            device_logs_dir: DEFAULT_DEVICE_LOGS_DIR.to_string(),
            screenshots_dir: DEFAULT_SCREENSHOTS_DIR.to_string(),
            browserstack_api_base: DEFAULT_BROWSERSTACK_API_BASE.to_string(),
            headspin_ui_base: DEFAULT_HEADSPIN_UI_BASE.to_string(),
            accept_invalid_certs: false,
            capture_timeout_secs: DEFAULT_CAPTURE_TIMEOUT_SECS,
            report_link_timeout_secs: DEFAULT_REPORT_LINK_TIMEOUT_SECS,
            http_connect_timeout_secs: DEFAULT_HTTP_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl LifecycleConfig {
    /// Load configuration from an optional TOML file and apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid lifecycle configuration")
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(name) = get(ENV_CLOUD_NAME) {
            self.cloud_name = name;
        }
        if let Some(flag) = get(ENV_CLOUD_EXECUTION) {
            self.cloud_execution = matches!(
                flag.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes" | "on"
            );
        }
        if let Some(user) = get(ENV_CLOUD_USER) {
            self.cloud_user = Some(user);
        }
        if let Some(key) = get(ENV_CLOUD_KEY) {
            self.cloud_key = Some(key);
        }
        if let Some(proxy) = get(ENV_PROXY_URL) {
            self.proxy_url = Some(proxy);
        }
        if let Some(root) = get(ENV_REPORT_ROOT) {
            self.report_root = PathBuf::from(root);
        }
    }

    /// Provider whose reporting link is resolved after each run.
    pub fn provider(&self) -> CloudProvider {
        if !self.cloud_execution {
            return CloudProvider::None;
        }
        let provider = CloudProvider::from_name(&self.cloud_name);
        if provider == CloudProvider::None && !self.cloud_name.trim().is_empty() {
            warn!(cloud_name = %self.cloud_name, "Unknown cloud provider, report links disabled");
        }
        provider
    }

    pub fn capture_timeout(&self) -> Duration {
        Duration::from_secs(self.capture_timeout_secs)
    }

    pub fn report_link_timeout(&self) -> Duration {
        Duration::from_secs(self.report_link_timeout_secs)
    }

    pub fn http_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.http_connect_timeout_secs)
    }

    pub fn scenario_directory(&self, normalized_name: &str) -> PathBuf {
        self.report_root.join(normalized_name)
    }

    pub fn screenshots_directory(&self, normalized_name: &str) -> PathBuf {
        self.scenario_directory(normalized_name)
            .join(&self.screenshots_dir)
    }
}
