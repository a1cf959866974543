use reqwest::Client;
use serde_json::Value;

use crate::envelope::{self, SYNC_MODULE};
use crate::error::ScraperError;
use crate::http::post_form_json;
use crate::session::SessionCredential;

/// Retrieves raw bonus and promotion records with an authenticated session.
#[derive(Debug, Clone)]
pub struct BonusFetcher {
    client: Client,
}

impl BonusFetcher {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Issues the sync call and returns bonuses followed by promotions.
    ///
    /// The credential is consumed; a session never outlives its fetch.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Timeout`] / [`ScraperError::Connection`] on transport failure.
    /// - [`ScraperError::HttpStatus`] on a non-2xx status.
    /// - [`ScraperError::MalformedBody`] if the response is not JSON.
    /// - [`ScraperError::FetchRejected`] if `status` is not `"SUCCESS"`.
    pub async fn fetch(&self, credential: SessionCredential) -> Result<Vec<Value>, ScraperError> {
        let endpoint = credential.api_endpoint();
        let form = [
            ("module", SYNC_MODULE),
            ("merchantId", credential.merchant_id()),
            ("domainId", "0"),
            ("accessId", credential.access_id()),
            ("accessToken", credential.token()),
            ("walletIsAdmin", ""),
        ];

        let body = post_form_json(&self.client, endpoint, &form, "bonus sync").await?;

        if let Err(status) = envelope::check_status(&body) {
            tracing::warn!(url = endpoint, status = %status, "bonus sync rejected");
            return Err(ScraperError::FetchRejected {
                url: endpoint.to_owned(),
                status,
            });
        }

        let records = extract_records(body);
        tracing::debug!(
            url = endpoint,
            merchant_id = credential.merchant_id(),
            count = records.len(),
            "bonus sync returned records"
        );
        Ok(records)
    }
}

/// Concatenates `data.bonus` and `data.promotions`, in that order. A key that
/// is missing or not an array contributes nothing.
pub(crate) fn extract_records(mut body: Value) -> Vec<Value> {
    let Some(data) = body.get_mut("data") else {
        return Vec::new();
    };

    let mut take = |key: &str| match data.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };

    let mut records = take("bonus");
    records.extend(take("promotions"));
    records
}
