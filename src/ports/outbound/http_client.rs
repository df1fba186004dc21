use crate::shared::ScanError;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Raw HTTP reply: status code and body text
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

/// A validated JSON response.
///
/// `body` is kept verbatim so it can be written to the disk cache.
#[derive(Debug, Clone)]
pub struct FetchedJson {
    pub body: String,
    pub value: Value,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Validates the JSON envelope.
    ///
    /// Non-2xx statuses and unparseable bodies fail with `failure_message`.
    pub fn into_json(self, failure_message: &str) -> Result<FetchedJson, ScanError> {
        if !self.is_success() {
            return Err(ScanError::fetch_failure(
                failure_message,
                format!("HTTP status {}", self.status),
            ));
        }

        let value: Value = serde_json::from_str(&self.body)
            .map_err(|e| ScanError::fetch_failure(failure_message, format!("invalid JSON: {}", e)))?;

        Ok(FetchedJson {
            body: self.body,
            value,
        })
    }
}

/// HttpClient port for GET requests against the CI provider
///
/// # Async Support
/// Implementations must be `Send + Sync`; one client is shared by every
/// worker of the scan pool.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Performs a GET request
    ///
    /// # Errors
    /// Transport failures (DNS, connect, timeout, body read) are returned as
    /// `ScanError::FetchFailure`. HTTP error statuses are not errors here.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, ScanError>;

    /// GETs `url` and validates the reply as JSON.
    ///
    /// No retry: a failure here is final for the calling operation.
    async fn get_json_or_fail(
        &self,
        url: &str,
        query: &[(&str, String)],
        failure_message: &str,
    ) -> Result<FetchedJson, ScanError> {
        let reply = self.get(url, query).await.map_err(|e| match e {
            ScanError::FetchFailure { reason, .. } => {
                ScanError::fetch_failure(failure_message, reason)
            }
            other => other,
        })?;
        reply.into_json(failure_message)
    }
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<HttpReply, ScanError> {
        (**self).get(url, query).await
    }
}
