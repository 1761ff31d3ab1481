//! BrowserStack session metadata lookup.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::LifecycleConfig;
use crate::utils::truncate;

#[derive(Deserialize)]
struct SessionEnvelope {
    automation_session: AutomationSession,
}

#[derive(Deserialize)]
struct AutomationSession {
    browser_url: String,
}

/// Extract `automation_session.browser_url` from a session metadata body.
pub fn parse_report_link(body: &str) -> Result<String> {
    let envelope: SessionEnvelope =
        serde_json::from_str(body).context("Malformed BrowserStack session response")?;
    Ok(envelope.automation_session.browser_url)
}

/// Authenticated client for the session metadata endpoint.
pub struct BrowserStackClient {
    client: Client,
    api_base: String,
    user: Option<String>,
    key: Option<String>,
}

impl BrowserStackClient {
    /// Build a client with connect and request timeouts, routed through the
    /// configured proxy if any.
    pub fn from_config(config: &LifecycleConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .connect_timeout(config.http_connect_timeout())
            .timeout(config.report_link_timeout())
            .user_agent(concat!("scenario-lifecycle/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(config.accept_invalid_certs);

        builder = match &config.proxy_url {
            Some(proxy) => builder.proxy(
                reqwest::Proxy::all(proxy.as_str())
                    .with_context(|| format!("Invalid proxy URL: {proxy}"))?,
            ),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build().context("Failed to create HTTP client")?,
            api_base: config.browserstack_api_base.trim_end_matches('/').to_string(),
            user: config.cloud_user.clone(),
            key: config.cloud_key.clone(),
        })
    }

    pub fn session_url(&self, session_id: &str) -> String {
        format!("{}/{session_id}.json", self.api_base)
    }

    pub fn fetch_report_link(&self, session_id: &str) -> Result<String> {
        let url = self.session_url(session_id);
        debug!(%url, "Requesting BrowserStack session metadata");

        let mut request = self.client.get(&url);
        if let Some(user) = &self.user {
            request = request.basic_auth(user, self.key.as_deref());
        }
        let response = request
            .send()
            .with_context(|| format!("Request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "BrowserStack session lookup: HTTP {} - {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("Unknown error")
            );
        }

        let body = response
            .text()
            .context("Failed to read BrowserStack response body")?;
        debug!(body = %truncate(&body, 512), "Response from BrowserStack");
        parse_report_link(&body)
    }
}
