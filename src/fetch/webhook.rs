//! Webhook posting.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;
use url::Url;

use super::FetchError;
use crate::models::PostStatus;

/// Destination for composed reports.
#[async_trait]
pub trait Webhook: Send + Sync {
    fn name(&self) -> &'static str;

    /// Post `content` to the channel identified by `webhook_key`.
    ///
    /// Any HTTP answer is returned as a status, including non-success ones.
    async fn post(&self, webhook_key: &str, content: &str) -> Result<PostStatus, FetchError>;
}

#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    content: &'a str,
}

/// Discord webhook client.
pub struct DiscordWebhook {
    client: Client,
    base_url: Url,
}

impl DiscordWebhook {
    pub fn new(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// `{base}/{key}?wait=true`. The key may itself contain `/`
    /// (`{id}/{token}`), each part becomes its own path segment.
    fn post_url(&self, webhook_key: &str) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(webhook_key.split('/').filter(|s| !s.is_empty()));
        url.query_pairs_mut().append_pair("wait", "true");
        Ok(url)
    }
}

#[async_trait]
impl Webhook for DiscordWebhook {
    fn name(&self) -> &'static str {
        "discord"
    }

    async fn post(&self, webhook_key: &str, content: &str) -> Result<PostStatus, FetchError> {
        let url = self.post_url(webhook_key)?;
        debug!("Posting {} bytes to webhook", content.len());

        let response = self
            .client
            .post(url)
            .json(&WebhookMessage { content })
            .send()
            .await?;

        let status = response.status();
        Ok(PostStatus {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        })
    }
}

/// Records every post; answers 200, or fails for content containing `fail_on`.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockWebhook {
    pub posts: std::sync::Mutex<Vec<(String, String)>>,
    fail_on: Option<String>,
}

#[cfg(test)]
impl MockWebhook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &str) -> Self {
        Self {
            fail_on: Some(pattern.to_string()),
            ..Default::default()
        }
    }

    pub fn posted(&self) -> Vec<(String, String)> {
        self.posts.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl Webhook for MockWebhook {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn post(&self, webhook_key: &str, content: &str) -> Result<PostStatus, FetchError> {
        if let Some(pattern) = &self.fail_on {
            if content.contains(pattern.as_str()) {
                return Err(FetchError::HttpStatus {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                });
            }
        }

        self.posts
            .lock()
            .unwrap()
            .push((webhook_key.to_string(), content.to_string()));
        Ok(PostStatus {
            status: 200,
            status_text: "OK".to_string(),
        })
    }
}
