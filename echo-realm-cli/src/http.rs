//! `reqwest`-backed HTTP transport and keyword-config sources.
use async_trait::async_trait;
use echo_realm_game::{ConfigSource, HttpResponse, HttpTransport, KeywordConfig, TransportError};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReqwestTransport {
    #[must_use]
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
        }
    }

    async fn into_response(
        result: reqwest::Result<reqwest::Response>,
    ) -> Result<HttpResponse, TransportError> {
        let response = result.map_err(map_error)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(map_error)?;
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Ok(HttpResponse { status, body })
    }
}

fn map_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err.to_string())
    }
}

#[async_trait(?Send)]
impl HttpTransport for ReqwestTransport {
    async fn get_json(&self, url: &str) -> Result<HttpResponse, TransportError> {
        log::debug!("GET {url}");
        Self::into_response(self.client.get(url).send().await).await
    }

    async fn post_json(
        &self,
        url: &str,
        bearer: Option<&str>,
        body: &Value,
    ) -> Result<HttpResponse, TransportError> {
        log::debug!("POST {url}");
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        Self::into_response(request.send().await).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigFetchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("config request returned HTTP {0}")]
    Status(u16),
    #[error("config is not a keyword document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Where the keyword config comes from, as given by `--config-source`.
#[derive(Debug, Clone)]
pub enum ConfigLocation {
    Bundled,
    File(PathBuf),
    Url(String),
}

impl ConfigLocation {
    /// `http(s)://` sources are fetched, anything else is a file path.
    #[must_use]
    pub fn parse(source: Option<&str>) -> Self {
        match source.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::Bundled,
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                Self::Url(url.to_string())
            }
            Some(path) => Self::File(PathBuf::from(path)),
        }
    }
}

pub struct ConfigFetcher<'a> {
    pub location: ConfigLocation,
    pub transport: &'a ReqwestTransport,
}

#[async_trait(?Send)]
impl ConfigSource for ConfigFetcher<'_> {
    type Error = ConfigFetchError;

    async fn fetch_config(&self) -> Result<KeywordConfig, Self::Error> {
        match &self.location {
            ConfigLocation::Bundled => Ok(KeywordConfig::from_json(include_str!(
                "../assets/config.json"
            ))?),
            ConfigLocation::File(path) => {
                let raw = tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| ConfigFetchError::Read {
                        path: path.clone(),
                        source,
                    })?;
                Ok(KeywordConfig::from_json(&raw)?)
            }
            ConfigLocation::Url(url) => {
                let response = self.transport.get_json(url).await?;
                if !response.is_success() {
                    return Err(ConfigFetchError::Status(response.status));
                }
                Ok(serde_json::from_value(response.body)?)
            }
        }
    }
}
