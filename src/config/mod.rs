//! Configuration loading and validation.
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual fields. Validation runs before any battle is
//! processed so missing credentials fail the invocation up front.

use std::path::Path;
use std::time::Duration;

use chrono::Locale;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::compose::ReportFormat;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Battle log API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoyaleApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,

    /// Sent in the `auth` header (env: `ROYALE_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// Player profile pages, the tag is appended
    #[serde(default = "default_profile_base_url")]
    pub profile_base_url: String,
}

fn default_api_base_url() -> String {
    "https://api.royaleapi.com".to_string()
}

fn default_profile_base_url() -> String {
    "https://royaleapi.com/player".to_string()
}

impl Default for RoyaleApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            api_key: String::new(),
            profile_base_url: default_profile_base_url(),
        }
    }
}

/// Deck image configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Cloudinary cloud name (env: `CLOUDINARY_NAME`)
    #[serde(default)]
    pub cloud_name: String,

    /// env: `CLOUDINARY_KEY`
    #[serde(default)]
    pub api_key: Option<String>,

    /// env: `CLOUDINARY_SECRET_KEY`
    #[serde(default)]
    pub api_secret: Option<String>,

    /// Folder with one image per card key
    #[serde(default = "default_card_folder")]
    pub card_folder: String,
}

fn default_card_folder() -> String {
    "CR".to_string()
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: None,
            api_secret: None,
            card_folder: default_card_folder(),
        }
    }
}

/// Endpoints of the shortener and the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_shortener_url")]
    pub shortener_url: String,

    #[serde(default = "default_webhook_base_url")]
    pub webhook_base_url: String,

    /// Timeout in seconds for every outgoing request
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_shortener_url() -> String {
    "https://is.gd/create.php".to_string()
}

fn default_webhook_base_url() -> String {
    "https://discordapp.com/api/webhooks".to_string()
}

fn default_timeout() -> u64 {
    10
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            shortener_url: default_shortener_url(),
            webhook_base_url: default_webhook_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Report rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// POSIX locale name, e.g. "nb_NO" (env: `REPORT_LOCALE`)
    #[serde(default = "default_locale")]
    pub locale: String,

    /// IANA time zone (env: `TIME_ZONE`)
    #[serde(default = "default_time_zone")]
    pub time_zone: String,

    /// strftime pattern (env: `REPORT_DATETIME_FORMAT`)
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,

    /// Look-back window when the invocation does not give one
    #[serde(default = "default_window_minutes")]
    pub default_window_minutes: u32,
}

fn default_locale() -> String {
    "nb_NO".to_string()
}

fn default_time_zone() -> String {
    "Europe/Oslo".to_string()
}

fn default_datetime_format() -> String {
    "%-d. %b %Y %H:%M".to_string()
}

fn default_window_minutes() -> u32 {
    15
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            time_zone: default_time_zone(),
            datetime_format: default_datetime_format(),
            default_window_minutes: default_window_minutes(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub royale_api: RoyaleApiConfig,

    #[serde(default)]
    pub images: ImageConfig,

    #[serde(default)]
    pub endpoints: EndpointsConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

/// Immutable settings handed to the orchestrator.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub default_window_minutes: u32,
    pub profile_base_url: String,
    pub report_format: ReportFormat,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Load from `path` (or defaults), apply the process environment and
    /// validate.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override fields from environment variables, looked up through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let set = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = set("ROYALE_API_KEY") {
            self.royale_api.api_key = v;
        }
        if let Some(v) = set("CLOUDINARY_NAME") {
            self.images.cloud_name = v;
        }
        if let Some(v) = set("CLOUDINARY_KEY") {
            self.images.api_key = Some(v);
        }
        if let Some(v) = set("CLOUDINARY_SECRET_KEY") {
            self.images.api_secret = Some(v);
        }
        if let Some(v) = set("REPORT_LOCALE") {
            self.report.locale = v;
        }
        if let Some(v) = set("TIME_ZONE") {
            self.report.time_zone = v;
        }
        if let Some(v) = set("REPORT_DATETIME_FORMAT") {
            self.report.datetime_format = v;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.royale_api.api_key.trim().is_empty() {
            return Err(ConfigError::Missing("royale_api.api_key (ROYALE_API_KEY)"));
        }

        if self.images.cloud_name.trim().is_empty() {
            return Err(ConfigError::Missing("images.cloud_name (CLOUDINARY_NAME)"));
        }

        for (field, value) in [
            ("royale_api.base_url", &self.royale_api.base_url),
            ("royale_api.profile_base_url", &self.royale_api.profile_base_url),
            ("endpoints.shortener_url", &self.endpoints.shortener_url),
            ("endpoints.webhook_base_url", &self.endpoints.webhook_base_url),
        ] {
            parse_url(field, value)?;
        }

        if self.endpoints.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Request timeout must be greater than 0".to_string(),
            ));
        }

        if self.report.default_window_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "Default window must be greater than 0 minutes".to_string(),
            ));
        }

        self.report_format()?;

        Ok(())
    }

    /// Parsed locale, time zone and pattern for report timestamps.
    pub fn report_format(&self) -> Result<ReportFormat, ConfigError> {
        let locale = Locale::try_from(self.report.locale.as_str()).map_err(|_| {
            ConfigError::ValidationError(format!("Unknown locale: {}", self.report.locale))
        })?;

        let time_zone: Tz = self.report.time_zone.parse().map_err(|_| {
            ConfigError::ValidationError(format!("Unknown time zone: {}", self.report.time_zone))
        })?;

        if self.report.datetime_format.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Report datetime format must not be empty".to_string(),
            ));
        }

        Ok(ReportFormat::new(
            locale,
            time_zone,
            self.report.datetime_format.clone(),
        ))
    }

    pub fn pipeline_settings(&self) -> Result<PipelineSettings, ConfigError> {
        Ok(PipelineSettings {
            default_window_minutes: self.report.default_window_minutes,
            profile_base_url: self.royale_api.profile_base_url.clone(),
            report_format: self.report_format()?,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.endpoints.timeout_seconds)
    }

    pub fn api_base_url(&self) -> Result<Url, ConfigError> {
        parse_url("royale_api.base_url", &self.royale_api.base_url)
    }

    pub fn shortener_url(&self) -> Result<Url, ConfigError> {
        parse_url("endpoints.shortener_url", &self.endpoints.shortener_url)
    }

    pub fn webhook_base_url(&self) -> Result<Url, ConfigError> {
        parse_url("endpoints.webhook_base_url", &self.endpoints.webhook_base_url)
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |s: &str| if s.is_empty() { String::new() } else { "***".to_string() };

        let mut config = self.clone();
        config.royale_api.api_key = mask(&config.royale_api.api_key);
        config.images.api_key = config.images.api_key.as_deref().map(mask);
        config.images.api_secret = config.images.api_secret.as_deref().map(mask);
        config
    }
}

fn parse_url(field: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value)
        .map_err(|e| ConfigError::ValidationError(format!("{} is not a valid URL: {}", field, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.royale_api.api_key = "key".to_string();
        config.images.cloud_name = "demo".to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.royale_api.base_url, "https://api.royaleapi.com");
        assert_eq!(config.endpoints.shortener_url, "https://is.gd/create.php");
        assert_eq!(config.report.locale, "nb_NO");
        assert_eq!(config.report.time_zone, "Europe/Oslo");
        assert_eq!(config.report.default_window_minutes, 15);
        assert_eq!(config.images.card_folder, "CR");
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_config_validation_missing_api_key() {
        let mut config = valid_config();
        config.royale_api.api_key = "  ".to_string();

        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_config_validation_missing_cloud_name() {
        let mut config = valid_config();
        config.images.cloud_name.clear();

        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_config_validation_bad_time_zone() {
        let mut config = valid_config();
        config.report.time_zone = "Mars/Olympus".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_locale() {
        let mut config = valid_config();
        config.report.locale = "xx_YY".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = valid_config();
        config.endpoints.webhook_base_url = "not a url".to_string();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_window() {
        let mut config = valid_config();
        config.report.default_window_minutes = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_apply_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ROYALE_API_KEY", "from-env"),
            ("CLOUDINARY_NAME", "cloud"),
            ("CLOUDINARY_SECRET_KEY", "s3cret"),
            ("TIME_ZONE", "UTC"),
            ("REPORT_LOCALE", ""),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.royale_api.api_key, "from-env");
        assert_eq!(config.images.cloud_name, "cloud");
        assert_eq!(config.images.api_secret.as_deref(), Some("s3cret"));
        assert_eq!(config.report.time_zone, "UTC");
        // Empty values do not override
        assert_eq!(config.report.locale, "nb_NO");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[royale_api]
api_key = "file-key"

[images]
cloud_name = "file-cloud"

[report]
default_window_minutes = 30
"#
        )
        .unwrap();

        let config = AppConfig::from_file(file.path()).unwrap();

        assert_eq!(config.royale_api.api_key, "file-key");
        assert_eq!(config.royale_api.base_url, "https://api.royaleapi.com");
        assert_eq!(config.report.default_window_minutes, 30);
        assert_eq!(config.report.time_zone, "Europe/Oslo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_missing() {
        let result = AppConfig::from_file(Path::new("/nonexistent/warlog.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }

    #[test]
    fn test_pipeline_settings() {
        let settings = valid_config().pipeline_settings().unwrap();

        assert_eq!(settings.default_window_minutes, 15);
        assert_eq!(settings.profile_base_url, "https://royaleapi.com/player");
        assert_eq!(settings.report_format.time_zone, chrono_tz::Europe::Oslo);
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let mut config = valid_config();
        config.images.api_secret = Some("s3cret".to_string());

        let redacted = config.redacted();
        assert_eq!(redacted.royale_api.api_key, "***");
        assert_eq!(redacted.images.api_secret.as_deref(), Some("***"));
        assert_eq!(redacted.images.cloud_name, "demo");
    }

    #[test]
    fn test_config_serialization() {
        let config = valid_config();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.royale_api.api_key, parsed.royale_api.api_key);
    }
}
