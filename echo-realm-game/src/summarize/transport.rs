//! Minimal HTTP seam used by the remote summarizers.
use async_trait::async_trait;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    /// Parsed body, `Value::Null` if the body was empty or not JSON
    pub body: Value,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("network error: {0}")]
    Network(String),
    #[error("request timed out")]
    Timeout,
}

/// JSON-over-HTTP client provided by the host platform.
#[async_trait(?Send)]
pub trait HttpTransport {
    /// # Errors
    ///
    /// Returns an error if the request could not be completed.
    async fn get_json(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// # Errors
    ///
    /// Returns an error if the request could not be completed.
    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<HttpResponse, TransportError>;
}
