//! War log orchestrator.
//!
//! Coordinates one invocation:
//! 1. Fetch the clan's war battles
//! 2. Keep war day battles from the look-back window
//! 3. Run one battle pipeline per battle, concurrently
//! 4. Post each report to the webhook and collect the outcomes
//!
//! Every battle resolves to exactly one outcome. Errors are caught inside the
//! battle's own future so they never reach sibling battles.

pub mod battle;

pub use battle::BattlePipeline;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::calculate::recent_war_battles;
use crate::config::{AppConfig, ConfigError, PipelineSettings};
use crate::fetch::{
    build_client, BattleLog, DiscordWebhook, FetchError, HttpClientConfig, IsGdShortener,
    LinkShortener, RoyaleApiClient, Webhook,
};
use crate::links::{CloudinaryRenderer, DeckImageRenderer, LinkError};
use crate::models::{Battle, DispatchOutcome, Invocation};

/// Errors that can occur while processing an invocation or a battle.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid invocation: {0}")]
    InvalidInvocation(String),

    #[error("Failed to fetch clan battles: {0}")]
    ClanBattles(#[source] FetchError),

    #[error("Failed to fetch player history: {0}")]
    History(#[source] FetchError),

    #[error("Link resolution failed: {0}")]
    Links(#[from] LinkError),

    #[error("Battle has no {0} record")]
    MissingParticipant(&'static str),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Client(#[from] FetchError),
}

/// External collaborators of the pipeline.
#[derive(Clone)]
pub struct Services {
    pub battle_log: Arc<dyn BattleLog>,
    pub shortener: Arc<dyn LinkShortener>,
    pub renderer: Arc<dyn DeckImageRenderer>,
    pub webhook: Arc<dyn Webhook>,
}

impl Services {
    /// Production services built from validated configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        let client = build_client(&HttpClientConfig {
            timeout: config.request_timeout(),
            ..Default::default()
        })?;

        Ok(Self {
            battle_log: Arc::new(RoyaleApiClient::new(
                client.clone(),
                config.api_base_url()?,
                config.royale_api.api_key.clone(),
            )),
            shortener: Arc::new(IsGdShortener::new(client.clone(), config.shortener_url()?)),
            renderer: Arc::new(CloudinaryRenderer::new(
                config.images.cloud_name.clone(),
                config.images.card_folder.clone(),
            )),
            webhook: Arc::new(DiscordWebhook::new(client, config.webhook_base_url()?)),
        })
    }
}

/// Fan-out orchestrator for war log invocations.
pub struct WarlogOrchestrator {
    services: Services,
    settings: PipelineSettings,
}

impl WarlogOrchestrator {
    pub fn new(services: Services, settings: PipelineSettings) -> Self {
        Self { services, settings }
    }

    /// Build the orchestrator with production services.
    pub fn from_config(config: &AppConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(
            Services::from_config(config)?,
            config.pipeline_settings()?,
        ))
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run an invocation against the current time.
    pub async fn run(&self, invocation: &Invocation) -> Result<Vec<DispatchOutcome>, PipelineError> {
        self.run_at(invocation, Utc::now()).await
    }

    /// Run an invocation with `now` as the end of the look-back window.
    pub async fn run_at(
        &self,
        invocation: &Invocation,
        now: DateTime<Utc>,
    ) -> Result<Vec<DispatchOutcome>, PipelineError> {
        validate_invocation(invocation)?;

        let minutes = invocation
            .minutes
            .unwrap_or(self.settings.default_window_minutes);

        info!(
            clan = %invocation.clan_id,
            minutes,
            "Fetching war battles from {}",
            self.services.battle_log.name()
        );

        let battles = self
            .services
            .battle_log
            .clan_war_battles(&invocation.clan_id)
            .await
            .map_err(PipelineError::ClanBattles)?;
        let fetched = battles.len();

        let recent = recent_war_battles(battles, now, minutes);
        info!(
            "{} of {} battles are war day battles from the last {} minutes",
            recent.len(),
            fetched,
            minutes
        );

        let pipeline = BattlePipeline::new(&self.services, &self.settings);
        let jobs = recent
            .iter()
            .map(|battle| self.dispatch(&pipeline, battle, &invocation.discord_key));
        let outcomes = join_all(jobs).await;

        for outcome in &outcomes {
            match outcome {
                DispatchOutcome::Posted {
                    player_tag,
                    status,
                    status_text,
                } => info!(tag = %player_tag, "Posted report: {} {}", status, status_text),
                DispatchOutcome::Skipped { player_tag, reason } => {
                    warn!(tag = %player_tag, "Skipped battle: {}", reason)
                }
                DispatchOutcome::Failed { player_tag, error } => {
                    error!(tag = %player_tag, "Battle failed: {}", error)
                }
            }
        }

        Ok(outcomes)
    }

    /// Run the pipeline for one battle and post its report.
    async fn dispatch(
        &self,
        pipeline: &BattlePipeline<'_>,
        battle: &Battle,
        webhook_key: &str,
    ) -> DispatchOutcome {
        let player_tag = battle
            .player()
            .map(|p| p.tag.clone())
            .unwrap_or_default();

        let report = match pipeline.run(battle).await {
            Ok(Some(report)) => report,
            Ok(None) => {
                return DispatchOutcome::Skipped {
                    player_tag,
                    reason: "player history was not a list of battles".to_string(),
                }
            }
            Err(e) => {
                return DispatchOutcome::Failed {
                    player_tag,
                    error: e.to_string(),
                }
            }
        };

        match self.services.webhook.post(webhook_key, &report.content).await {
            Ok(status) => DispatchOutcome::Posted {
                player_tag,
                status: status.status,
                status_text: status.status_text,
            },
            Err(e) => DispatchOutcome::Failed {
                player_tag,
                error: format!("Webhook post failed: {}", e),
            },
        }
    }
}

fn validate_invocation(invocation: &Invocation) -> Result<(), PipelineError> {
    if invocation.clan_id.trim().is_empty() {
        return Err(PipelineError::InvalidInvocation(
            "clan_id must not be empty".to_string(),
        ));
    }
    if invocation.discord_key.trim().is_empty() {
        return Err(PipelineError::InvalidInvocation(
            "discord_key must not be empty".to_string(),
        ));
    }
    if invocation.minutes == Some(0) {
        return Err(PipelineError::InvalidInvocation(
            "minutes must be greater than 0".to_string(),
        ));
    }
    Ok(())
}
