//! Two-step session negotiation with a merchant site.
//!
//! 1. **Discovery**: `GET` the site root and pull the merchant id and
//!    display name out of two adjacent JavaScript variable declarations.
//! 2. **Login**: `POST` the configured credentials plus the merchant id to
//!    the site's API endpoint and read the access id and token back.
//!
//! Neither step is retried; each failure is returned as a [`ScraperError`]
//! and the caller decides what to do with the site.

use std::sync::LazyLock;

use promoscan_core::Credentials;
use regex::Regex;
use reqwest::Client;

use crate::envelope::{self, LOGIN_MODULE};
use crate::error::ScraperError;
use crate::http::{post_form_json, SiteRoot};
use crate::pacer::Pacer;

/// The discovery compatibility boundary: `var MERCHANTID = <digits>;`
/// followed (after optional whitespace) by `var MERCHANTNAME = '<name>';`,
/// matched case-insensitively with either quote style.
static MERCHANT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)var MERCHANTID = (\d+);\s*var MERCHANTNAME = ["'](.*?)["'];"#)
        .expect("valid merchant regex")
});

/// Merchant identity discovered from a site's landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantInfo {
    pub id: String,
    pub name: String,
}

/// Extracts the merchant id and name from a landing page.
///
/// Returns `None` when the two declarations are not present together.
#[must_use]
pub fn extract_merchant(html: &str) -> Option<MerchantInfo> {
    let caps = MERCHANT_RE.captures(html)?;
    Some(MerchantInfo {
        id: caps.get(1)?.as_str().to_owned(),
        name: caps.get(2)?.as_str().to_owned(),
    })
}

/// Short-lived session for one site.
///
/// Built only through [`SessionCredential::new`], which rejects empty
/// fields. It is consumed by the bonus fetch and never shared between sites.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential {
    merchant_id: String,
    merchant_name: String,
    access_id: String,
    token: String,
    api_endpoint: String,
}

impl SessionCredential {
    /// # Errors
    ///
    /// Returns [`ScraperError::CredentialInvalid`] naming the first field
    /// that is empty or whitespace-only.
    pub fn new(
        merchant_id: impl Into<String>,
        merchant_name: impl Into<String>,
        access_id: impl Into<String>,
        token: impl Into<String>,
        api_endpoint: impl Into<String>,
    ) -> Result<Self, ScraperError> {
        let credential = Self {
            merchant_id: merchant_id.into(),
            merchant_name: merchant_name.into(),
            access_id: access_id.into(),
            token: token.into(),
            api_endpoint: api_endpoint.into(),
        };

        for (field, value) in [
            ("merchant_id", &credential.merchant_id),
            ("merchant_name", &credential.merchant_name),
            ("access_id", &credential.access_id),
            ("token", &credential.token),
            ("api_endpoint", &credential.api_endpoint),
        ] {
            if value.trim().is_empty() {
                return Err(ScraperError::CredentialInvalid { field });
            }
        }

        Ok(credential)
    }

    #[must_use]
    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    #[must_use]
    pub fn merchant_name(&self) -> &str {
        &self.merchant_name
    }

    #[must_use]
    pub fn access_id(&self) -> &str {
        &self.access_id
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn api_endpoint(&self) -> &str {
        &self.api_endpoint
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCredential")
            .field("merchant_id", &self.merchant_id)
            .field("merchant_name", &self.merchant_name)
            .field("access_id", &self.access_id)
            .field("token", &"[redacted]")
            .field("api_endpoint", &self.api_endpoint)
            .finish()
    }
}

/// Performs discovery and login against merchant sites.
#[derive(Debug, Clone)]
pub struct SessionAuthenticator {
    client: Client,
}

impl SessionAuthenticator {
    /// Wraps a client built by [`crate::build_http_client`].
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches the site root and extracts the merchant identity.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Timeout`] / [`ScraperError::Connection`] on transport failure.
    /// - [`ScraperError::HttpStatus`] on a non-2xx status.
    /// - [`ScraperError::DiscoveryFailed`] if the body is empty or the
    ///   merchant declarations are missing.
    pub async fn discover(&self, root: &SiteRoot) -> Result<MerchantInfo, ScraperError> {
        let url = root.as_str();
        let response = self
            .client
            .get(url)
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

        let html = response
            .text()
            .await
            .map_err(|e| ScraperError::transport(url, e))?;

        if html.trim().is_empty() {
            tracing::warn!(url, "discovery page body is empty");
            return Err(ScraperError::DiscoveryFailed {
                url: url.to_owned(),
                reason: "empty response body".to_owned(),
            });
        }

        extract_merchant(&html).ok_or_else(|| {
            tracing::warn!(url, "merchant id/name declarations not found");
            ScraperError::DiscoveryFailed {
                url: url.to_owned(),
                reason: "merchant declarations not found".to_owned(),
            }
        })
    }

    /// Logs in with the discovered merchant id and builds the session.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Timeout`] / [`ScraperError::Connection`] on transport failure.
    /// - [`ScraperError::HttpStatus`] on a non-2xx status.
    /// - [`ScraperError::MalformedBody`] if the response is not JSON.
    /// - [`ScraperError::LoginRejected`] if `status` is not `"SUCCESS"`.
    /// - [`ScraperError::CredentialInvalid`] if `data.id` or `data.token`
    ///   is missing, empty, or not a string/integer.
    pub async fn login(
        &self,
        root: &SiteRoot,
        merchant: MerchantInfo,
        credentials: &Credentials,
    ) -> Result<SessionCredential, ScraperError> {
        let endpoint = root.api_endpoint();
        let form = [
            ("module", LOGIN_MODULE),
            ("mobile", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("merchantId", merchant.id.as_str()),
        ];

        let body = post_form_json(&self.client, &endpoint, &form, "login").await?;

        if let Err(status) = envelope::check_status(&body) {
            tracing::warn!(url = %endpoint, status = %status, "login rejected");
            return Err(ScraperError::LoginRejected {
                url: endpoint,
                status,
            });
        }

        let access_id = envelope::data_field(&body, "id")
            .and_then(envelope::id_text)
            .unwrap_or_default();
        let token = envelope::data_field(&body, "token")
            .and_then(envelope::id_text)
            .unwrap_or_default();

        let credential =
            SessionCredential::new(merchant.id, merchant.name, access_id, token, endpoint)
                .inspect_err(|e| {
                    tracing::error!(url = %root, error = %e, "login returned unusable session data");
                })?;

        tracing::debug!(url = %root, merchant_id = credential.merchant_id(), "login succeeded");
        Ok(credential)
    }

    /// Runs discovery then login, pacing before the login call.
    ///
    /// The caller is expected to have paced before discovery.
    ///
    /// # Errors
    ///
    /// Any error from [`Self::discover`] or [`Self::login`].
    pub async fn authenticate(
        &self,
        root: &SiteRoot,
        credentials: &Credentials,
        pacer: &Pacer,
    ) -> Result<SessionCredential, ScraperError> {
        let merchant = self.discover(root).await?;
        tracing::debug!(
            url = %root,
            merchant_id = %merchant.id,
            merchant_name = %merchant.name,
            "merchant discovered"
        );
        pacer.pace().await;
        self.login(root, merchant, credentials).await
    }
}
