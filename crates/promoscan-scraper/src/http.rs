//! Shared HTTP plumbing: client construction, site-root derivation, and the
//! form-POST helper used by both the login and bonus-sync calls.

use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::ScraperError;

/// Path of the merchant API, relative to the site root.
pub const API_PATH: &str = "/api/v1/index.php";

/// Builds the client used for every outbound call.
///
/// Certificate validation is disabled (merchant sites commonly serve
/// self-signed certificates) and environment proxies are ignored.
///
/// # Errors
///
/// Returns [`ScraperError::ClientBuild`] if the underlying `reqwest::Client`
/// cannot be constructed.
pub fn build_http_client(timeout_secs: u64, user_agent: &str) -> Result<Client, ScraperError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(user_agent)
        .danger_accept_invalid_certs(true)
        .no_proxy()
        .build()
        .map_err(ScraperError::ClientBuild)
}

/// Scheme + authority of a target site, with any path, query, or fragment
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteRoot {
    origin: String,
    authority: String,
}

impl SiteRoot {
    /// Derives the site root from a configured URL.
    ///
    /// `"https://acme.example/promo?x=1"` becomes `"https://acme.example"`.
    /// Input without a scheme is treated as `https`.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSiteUrl`] if the input does not parse
    /// or has no host.
    pub fn parse(raw: &str) -> Result<Self, ScraperError> {
        let trimmed = raw.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_owned()
        } else {
            format!("https://{trimmed}")
        };

        let url = Url::parse(&candidate).map_err(|e| ScraperError::InvalidSiteUrl {
            url: raw.to_owned(),
            reason: e.to_string(),
        })?;

        let host = url.host_str().ok_or_else(|| ScraperError::InvalidSiteUrl {
            url: raw.to_owned(),
            reason: "URL has no host".to_owned(),
        })?;

        let authority = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_owned(),
        };

        Ok(Self {
            origin: url.origin().ascii_serialization(),
            authority: authority.to_ascii_lowercase(),
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.origin
    }

    /// `host[:port]`, lowercased; the key for per-host pacing.
    #[must_use]
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// `<root>/api/v1/index.php`
    #[must_use]
    pub fn api_endpoint(&self) -> String {
        format!("{}{API_PATH}", self.origin)
    }
}

impl std::fmt::Display for SiteRoot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.origin)
    }
}

/// Sends a form-encoded POST, requires a 2xx status, and parses the body as
/// JSON.
///
/// # Errors
///
/// - [`ScraperError::Timeout`] / [`ScraperError::Connection`] on transport failure.
/// - [`ScraperError::HttpStatus`] on a non-2xx status.
/// - [`ScraperError::MalformedBody`] if the body is not valid JSON.
pub(crate) async fn post_form_json(
    client: &Client,
    url: &str,
    form: &[(&str, &str)],
    context: &str,
) -> Result<serde_json::Value, ScraperError> {
    let response = client
        .post(url)
        .form(form)
        .send()
        .await
        .map_err(|e| ScraperError::transport(url, e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(ScraperError::HttpStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| ScraperError::transport(url, e))?;

    serde_json::from_str(&body).map_err(|e| ScraperError::MalformedBody {
        context: format!("{context} response from {url}"),
        source: e,
    })
}
