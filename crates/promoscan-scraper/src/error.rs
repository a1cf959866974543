use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("connection error for {url}: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("merchant discovery failed for {url}: {reason}")]
    DiscoveryFailed { url: String, reason: String },

    #[error("login rejected by {url} (status {status})")]
    LoginRejected { url: String, status: String },

    #[error("session credential invalid: {field} is missing or empty")]
    CredentialInvalid { field: &'static str },

    #[error("bonus sync rejected by {url} (status {status})")]
    FetchRejected { url: String, status: String },

    #[error("malformed response body for {context}: {source}")]
    MalformedBody {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid site URL \"{url}\": {reason}")]
    InvalidSiteUrl { url: String, reason: String },
}

/// Coarse failure classes reported per site.
///
/// Every class is recoverable at site scope: the site is recorded as failed
/// and the run moves on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NetworkTimeout,
    NetworkConnectionError,
    HttpStatusError,
    AuthDiscoveryFailed,
    AuthCredentialRejected,
    AuthDataInvalid,
    FetchRejected,
    MalformedResponseBody,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::NetworkTimeout => "network_timeout",
            FailureKind::NetworkConnectionError => "network_connection_error",
            FailureKind::HttpStatusError => "http_status_error",
            FailureKind::AuthDiscoveryFailed => "auth_discovery_failed",
            FailureKind::AuthCredentialRejected => "auth_credential_rejected",
            FailureKind::AuthDataInvalid => "auth_data_invalid",
            FailureKind::FetchRejected => "fetch_rejected",
            FailureKind::MalformedResponseBody => "malformed_response_body",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ScraperError {
    /// Classifies a `reqwest` transport error for the request sent to `url`.
    pub(crate) fn transport(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return ScraperError::Timeout {
                url: url.to_owned(),
            };
        }
        if let Some(status) = err.status() {
            return ScraperError::HttpStatus {
                status: status.as_u16(),
                url: url.to_owned(),
            };
        }
        ScraperError::Connection {
            url: url.to_owned(),
            source: err,
        }
    }

    /// Maps this error onto the per-site failure class.
    ///
    /// Client construction and site URL problems never reach the network, so
    /// they report as connection errors.
    #[must_use]
    pub fn kind(&self) -> FailureKind {
        match self {
            ScraperError::Timeout { .. } => FailureKind::NetworkTimeout,
            ScraperError::Connection { .. }
            | ScraperError::ClientBuild(_)
            | ScraperError::InvalidSiteUrl { .. } => FailureKind::NetworkConnectionError,
            ScraperError::HttpStatus { .. } => FailureKind::HttpStatusError,
            ScraperError::DiscoveryFailed { .. } => FailureKind::AuthDiscoveryFailed,
            ScraperError::LoginRejected { .. } => FailureKind::AuthCredentialRejected,
            ScraperError::CredentialInvalid { .. } => FailureKind::AuthDataInvalid,
            ScraperError::FetchRejected { .. } => FailureKind::FetchRejected,
            ScraperError::MalformedBody { .. } => FailureKind::MalformedResponseBody,
        }
    }
}
