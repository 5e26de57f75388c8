use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, info};

use super::DocumentSource;
use crate::errors::{AppError, AppResult, SourceError, SourceResult};
use crate::utils::UrlUtils;

/// Dataset document downloaded from a remote file host
///
/// The payload is returned as received; a gzip body is not decoded here
/// even when the server omits `Content-Encoding`.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    fetch_timeout: Duration,
}

impl HttpSource {
    /// Create a source with a connect timeout and a whole-download timeout
    pub fn new(
        url: impl Into<String>,
        connect_timeout: Duration,
        fetch_timeout: Duration,
    ) -> AppResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("edgar-lookup/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            url: url.into(),
            fetch_timeout,
        })
    }

    fn transport_error(&self, source: reqwest::Error) -> SourceError {
        SourceError::Http {
            url: UrlUtils::obfuscate_credentials(&self.url),
            source: source.without_url(),
        }
    }
}

#[async_trait]
impl DocumentSource for HttpSource {
    fn describe(&self) -> String {
        UrlUtils::obfuscate_credentials(&self.url)
    }

    async fn fetch(&self) -> SourceResult<Bytes> {
        info!("Downloading dataset from {}", self.describe());

        let response = self
            .client
            .get(&self.url)
            .timeout(self.fetch_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url: self.describe(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        debug!("Fetched {} bytes of raw content", bytes.len());
        Ok(bytes)
    }
}
