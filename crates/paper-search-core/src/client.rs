use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::{debug, warn};

use crate::error::BackendError;
use crate::protocol::{RawReply, RequestBody};
use crate::variant::Variant;

#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Client for the fixed endpoint of `variant`
    pub fn for_variant(variant: Variant) -> Self {
        Self::new(variant.base_url())
    }

    /// Like [`BackendClient::new`], with a whole-request timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, BackendError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST `body` to the route of `variant` and return status and body text.
    ///
    /// A non-success status is not an error here; the body is handed back
    /// so the backend's own `error` field can still be shown.
    pub async fn post(&self, variant: Variant, body: &RequestBody) -> Result<RawReply, BackendError> {
        let url = format!("{}{}", self.base_url, variant.path());
        debug!(%url, variant = variant.as_str(), "posting request");

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "backend returned non-success status");
        }

        let body = response.text().await?;
        Ok(RawReply {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = BackendClient::new("http://localhost:8000/");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_for_variant_uses_fixed_origin() {
        assert_eq!(
            BackendClient::for_variant(Variant::Chat).base_url(),
            "http://localhost:3000"
        );
        assert_eq!(
            BackendClient::for_variant(Variant::Papers).base_url(),
            "http://localhost:8000"
        );
    }
}
