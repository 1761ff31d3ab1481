use anyhow::{bail, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::browserstack::BrowserStackClient;
use super::provider::CloudProvider;
use crate::config::LifecycleConfig;
use crate::device::DriverHandle;
use crate::models::constants::PCLOUDY_REPORT_SCRIPT;
use crate::utils::run_with_timeout;

/// Resolves the provider's report link for a finished run.
///
/// The provider is fixed at construction. Every failure collapses to `None`.
pub struct ReportLinkResolver {
    provider: CloudProvider,
    headspin_ui_base: String,
    browserstack: Option<BrowserStackClient>,
    timeout: Duration,
}

impl ReportLinkResolver {
    pub fn from_config(config: &LifecycleConfig) -> Self {
        let provider = config.provider();
        let browserstack = match provider {
            CloudProvider::BrowserStack => match BrowserStackClient::from_config(config) {
                Ok(client) => Some(client),
                Err(e) => {
                    warn!(error = %format!("{e:#}"), "BrowserStack client unavailable, report links disabled");
                    None
                }
            },
            _ => None,
        };

        Self {
            provider,
            headspin_ui_base: config.headspin_ui_base.trim_end_matches('/').to_string(),
            browserstack,
            timeout: config.report_link_timeout(),
        }
    }

    pub fn provider(&self) -> CloudProvider {
        self.provider
    }

    /// Report link for the run driven by `driver`, if one can be obtained.
    pub fn resolve(&self, driver: &DriverHandle) -> Option<String> {
        if self.provider == CloudProvider::None {
            return None;
        }

        let udid = driver.device().udid_or_unknown().to_string();
        info!(%udid, provider = %self.provider, "Running on cloud provider");

        match self.lookup(driver) {
            Ok(link) if !link.trim().is_empty() => Some(link),
            Ok(_) => {
                debug!(provider = %self.provider, "Provider returned an empty report link");
                None
            }
            Err(e) => {
                warn!(
                    provider = %self.provider,
                    %udid,
                    error = %format!("{e:#}"),
                    "Unable to get report link"
                );
                None
            }
        }
    }

    fn lookup(&self, driver: &DriverHandle) -> Result<String> {
        match self.provider {
            CloudProvider::PCloudy => {
                let driver = Arc::clone(driver);
                let value = run_with_timeout("pcloudy-report-link", self.timeout, move || {
                    driver.execute_script(PCLOUDY_REPORT_SCRIPT)
                })?;
                Ok(match value {
                    serde_json::Value::String(link) => link,
                    serde_json::Value::Null => String::new(),
                    other => other.to_string(),
                })
            }
            CloudProvider::Headspin => {
                let session_id = live_session_id(driver)?;
                Ok(format!("{}/{session_id}/waterfall", self.headspin_ui_base))
            }
            CloudProvider::BrowserStack => {
                let session_id = live_session_id(driver)?;
                let client = self
                    .browserstack
                    .as_ref()
                    .context("BrowserStack client is not configured")?;
                client.fetch_report_link(&session_id)
            }
            CloudProvider::None => Ok(String::new()),
        }
    }
}

fn live_session_id(driver: &DriverHandle) -> Result<String> {
    match driver.session_id() {
        Some(id) => Ok(id),
        None => bail!("driver has no session id"),
    }
}
