use crate::ports::outbound::{HttpClient, HttpReply};
use crate::shared::{Result, ScanError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// ReqwestHttpClient adapter for the CI provider's JSON API
///
/// This adapter implements the HttpClient port on top of an async reqwest
/// client. It never retries; a failed request is reported to the caller as
/// is.
pub struct ReqwestHttpClient {
    client: reqwest::Client,
}

impl ReqwestHttpClient {
    const TIMEOUT_SECONDS: u64 = 60;

    /// Creates a new client with default configuration
    pub fn new() -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("ci-failure-scan/{}", version);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(Self::TIMEOUT_SECONDS))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }
}

// Note: no Default implementation. Client construction can fail and
// Default::default() would have to panic.

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> std::result::Result<HttpReply, ScanError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| ScanError::fetch_failure(format!("GET {}", url), e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| ScanError::fetch_failure(format!("GET {}", url), e))?;

        Ok(HttpReply::new(status, body))
    }
}
