//! URL shortening.

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::{check_status, FetchError};

/// Service that turns a long URL into a short one.
#[async_trait]
pub trait LinkShortener: Send + Sync {
    fn name(&self) -> &'static str;

    async fn shorten(&self, long_url: &str) -> Result<String, FetchError>;
}

/// is.gd shortener (`create.php?format=simple`), answers with plain text.
pub struct IsGdShortener {
    client: Client,
    endpoint: Url,
}

impl IsGdShortener {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn request_url(&self, long_url: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "simple")
            .append_pair("url", long_url);
        url
    }
}

#[async_trait]
impl LinkShortener for IsGdShortener {
    fn name(&self) -> &'static str {
        "is.gd"
    }

    async fn shorten(&self, long_url: &str) -> Result<String, FetchError> {
        let url = self.request_url(long_url);
        debug!("Shortening via {}", url);

        let response = self.client.get(url).send().await?;
        check_status(&response)?;

        let short = response.text().await?.trim().to_string();
        if short.is_empty() {
            return Err(FetchError::MalformedPayload(
                "shortener returned an empty body".to_string(),
            ));
        }
        Ok(short)
    }
}

/// Deterministic shortener for tests: `https://short.test/<n>` where `n` is
/// the length of the long URL. Fails for URLs containing `fail_on`.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockShortener {
    fail_on: Option<String>,
}

#[cfg(test)]
impl MockShortener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl LinkShortener for MockShortener {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn shorten(&self, long_url: &str) -> Result<String, FetchError> {
        if let Some(pattern) = &self.fail_on {
            if long_url.contains(pattern.as_str()) {
                return Err(FetchError::HttpStatus {
                    status: 502,
                    message: "Bad Gateway".to_string(),
                });
            }
        }
        Ok(format!("https://short.test/{}", long_url.len()))
    }
}
