//! HTTP clients for the external services.
//!
//! - **battle_log**: clan and player battle logs (RoyaleAPI)
//! - **shortener**: URL shortening (is.gd)
//! - **webhook**: message posting (Discord)
//!
//! Each service sits behind a trait so the pipeline can run against mocks.
//! Every call is attempted once; failures are returned to the caller.

pub mod battle_log;
pub mod shortener;
pub mod webhook;

pub use battle_log::{BattleLog, RoyaleApiClient};
pub use shortener::{IsGdShortener, LinkShortener};
pub use webhook::{DiscordWebhook, Webhook};

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::models::Battle;

/// Errors that can occur while talking to an external service.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings shared by all HTTP clients.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("warlog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Build a reqwest client with the shared settings.
pub fn build_client(config: &HttpClientConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .unwrap_or_else(|_| HeaderValue::from_static("warlog")),
    );

    Ok(Client::builder()
        .timeout(config.timeout)
        .default_headers(headers)
        .build()?)
}

/// Turn a non-success status into an error.
pub(crate) fn check_status(response: &reqwest::Response) -> Result<(), FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    Err(status_error(status))
}

pub(crate) fn status_error(status: StatusCode) -> FetchError {
    FetchError::HttpStatus {
        status: status.as_u16(),
        message: status.canonical_reason().unwrap_or("Unknown").to_string(),
    }
}

/// Decode a battle log payload.
///
/// The top level must be a JSON array. Records that do not decode as a
/// battle are dropped with a warning so one odd entry cannot hide the rest.
pub fn decode_battles(payload: Value) -> Result<Vec<Battle>, FetchError> {
    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(FetchError::MalformedPayload(format!(
                "expected a list of battles, got {}",
                describe(&other)
            )))
        }
    };

    let mut battles = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Battle>(item) {
            Ok(battle) => battles.push(battle),
            Err(e) => warn!(index, error = %e, "Skipping undecodable battle record"),
        }
    }

    Ok(battles)
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "a list".to_string(),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => format!("an object ({})", message),
            None => "an object".to_string(),
        },
    }
}
