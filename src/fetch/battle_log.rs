//! Battle log API client.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;
use url::Url;

use super::{decode_battles, status_error, FetchError};
use crate::models::Battle;

/// Source of battle records.
#[async_trait]
pub trait BattleLog: Send + Sync {
    /// Source name for logging.
    fn name(&self) -> &'static str;

    /// Recent war battles of every member of a clan.
    async fn clan_war_battles(&self, clan_id: &str) -> Result<Vec<Battle>, FetchError>;

    /// Recent battles of one player, from that player's perspective.
    ///
    /// Returns `FetchError::MalformedPayload` when the API answers with
    /// anything other than a list, including JSON error objects sent
    /// with a non-success status.
    async fn player_battles(&self, tag: &str) -> Result<Vec<Battle>, FetchError>;
}

/// RoyaleAPI implementation, authenticated with a static key header.
pub struct RoyaleApiClient {
    client: Client,
    base_url: Url,
    api_key: String,
}

impl RoyaleApiClient {
    pub fn new(client: Client, base_url: Url, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// Append path segments to the base URL, escaping each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Fetch and decode a battle list.
    ///
    /// The body is read whatever the status. A JSON body that is not a list
    /// is `MalformedPayload`; a non-success status without one is `HttpStatus`.
    async fn get_battles(&self, url: Url) -> Result<Vec<Battle>, FetchError> {
        debug!("Fetching {}", url);

        let response = self
            .client
            .get(url)
            .header("auth", &self.api_key)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        let payload: Value = match serde_json::from_slice(&body) {
            Ok(payload) => payload,
            Err(_) if !status.is_success() => return Err(status_error(status)),
            Err(e) => return Err(e.into()),
        };

        if !status.is_success() && payload.is_array() {
            return Err(status_error(status));
        }

        decode_battles(payload).map_err(|e| match e {
            FetchError::MalformedPayload(reason) if !status.is_success() => {
                FetchError::MalformedPayload(format!("HTTP {}: {}", status.as_u16(), reason))
            }
            other => other,
        })
    }
}

#[async_trait]
impl BattleLog for RoyaleApiClient {
    fn name(&self) -> &'static str {
        "royaleapi"
    }

    async fn clan_war_battles(&self, clan_id: &str) -> Result<Vec<Battle>, FetchError> {
        let mut url = self.endpoint(&["clan", clan_id, "battles"])?;
        url.query_pairs_mut().append_pair("type", "war");

        self.get_battles(url).await
    }

    async fn player_battles(&self, tag: &str) -> Result<Vec<Battle>, FetchError> {
        let url = self.endpoint(&["player", tag, "battles"])?;
        self.get_battles(url).await
    }
}

/// Canned player history for [`MockBattleLog`].
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockHistory {
    Battles(Vec<Battle>),
    Malformed,
    Unavailable,
}

/// In-memory battle log for tests.
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct MockBattleLog {
    clan_battles: Vec<Battle>,
    clan_unavailable: bool,
    histories: std::collections::HashMap<String, MockHistory>,
}

#[cfg(test)]
impl MockBattleLog {
    pub fn new(clan_battles: Vec<Battle>) -> Self {
        Self {
            clan_battles,
            ..Default::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            clan_unavailable: true,
            ..Default::default()
        }
    }

    pub fn with_history(mut self, tag: &str, history: MockHistory) -> Self {
        self.histories.insert(tag.to_string(), history);
        self
    }
}

#[cfg(test)]
#[async_trait]
impl BattleLog for MockBattleLog {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn clan_war_battles(&self, _clan_id: &str) -> Result<Vec<Battle>, FetchError> {
        if self.clan_unavailable {
            return Err(FetchError::HttpStatus {
                status: 503,
                message: "Service Unavailable".to_string(),
            });
        }
        Ok(self.clan_battles.clone())
    }

    async fn player_battles(&self, tag: &str) -> Result<Vec<Battle>, FetchError> {
        match self.histories.get(tag) {
            Some(MockHistory::Battles(battles)) => Ok(battles.clone()),
            Some(MockHistory::Malformed) => decode_battles(serde_json::json!({
                "error": true,
                "message": "Not found"
            })),
            Some(MockHistory::Unavailable) => Err(FetchError::HttpStatus {
                status: 500,
                message: "Internal Server Error".to_string(),
            }),
            None => Ok(Vec::new()),
        }
    }
}
