//! Per-battle pipeline.
//!
//! For one war battle: fetch the player's history while resolving links,
//! classify the history against the war deck, then compose the report.

use tracing::{debug, warn};

use super::{PipelineError, Services};
use crate::calculate::classify_training;
use crate::compose::compose_report;
use crate::config::PipelineSettings;
use crate::fetch::FetchError;
use crate::links::resolve_links;
use crate::models::{Battle, Report};

/// Runs the pipeline for single war battles.
pub struct BattlePipeline<'a> {
    services: &'a Services,
    settings: &'a PipelineSettings,
}

impl<'a> BattlePipeline<'a> {
    pub fn new(services: &'a Services, settings: &'a PipelineSettings) -> Self {
        Self { services, settings }
    }

    /// Produce the report for `battle`.
    ///
    /// Returns `Ok(None)` when the player's history is not a list: that
    /// battle is reported as skipped rather than failed.
    pub async fn run(&self, battle: &Battle) -> Result<Option<Report>, PipelineError> {
        let player = battle
            .player()
            .ok_or(PipelineError::MissingParticipant("team"))?;
        let rival = battle
            .rival()
            .ok_or(PipelineError::MissingParticipant("opponent"))?;

        debug!(tag = %player.tag, "Fetching history and resolving links");

        let (history, links) = tokio::join!(
            self.services.battle_log.player_battles(&player.tag),
            resolve_links(
                player,
                self.services.renderer.as_ref(),
                self.services.shortener.as_ref(),
                &self.settings.profile_base_url,
            ),
        );

        let history = match history {
            Ok(history) => history,
            Err(FetchError::MalformedPayload(reason)) => {
                warn!(tag = %player.tag, %reason, "Player history is not a list, no report");
                return Ok(None);
            }
            Err(e) => return Err(PipelineError::History(e)),
        };
        let links = links?;

        let stats = classify_training(&history, player);
        debug!(
            tag = %player.tag,
            total = stats.total(),
            friendlies = stats.all_friendlies,
            "Classified training battles"
        );

        let content = compose_report(
            battle,
            player,
            rival,
            &stats,
            &links,
            &self.settings.report_format,
        );

        Ok(Some(Report {
            player_tag: player.tag.clone(),
            player_name: player.name.clone(),
            content,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::battle_log::{MockBattleLog, MockHistory};
    use crate::fetch::shortener::MockShortener;
    use crate::fetch::test_server::serve_fixed;
    use crate::fetch::{BattleLog, RoyaleApiClient};
    use axum::http::StatusCode;
    use std::sync::Arc;
    use crate::links::LinkError;
    use crate::models::BattleType;
    use crate::pipeline::tests::{fixture_battle, test_services, test_settings};

    #[tokio::test]
    async fn test_run_produces_report() {
        let war = fixture_battle("2PP", BattleType::WarDay, 0);
        let mut friendly = fixture_battle("2PP", BattleType::ClanMate, 0);
        friendly.team[0].deck.reverse();

        let log = MockBattleLog::new(vec![])
            .with_history("2PP", MockHistory::Battles(vec![friendly, war.clone()]));
        let services = test_services(log, MockShortener::new());
        let settings = test_settings();

        let report = BattlePipeline::new(&services, &settings)
            .run(&war)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(report.player_tag, "2PP");
        assert_eq!(report.player_name, "Player 2PP");
        assert!(report.content.starts_with("Victory! :raised_hands:\n"));
        assert!(report.content.contains("trained a total of 1 times"));
        assert!(report.content.contains("(1 friendlies, 0 in challenges"));
        assert!(report.content.contains("A total of 1 friendlies during the last 2 battles."));
        assert!(report.content.contains("RoyaleApi profile: <https://short.test/"));
    }

    #[tokio::test]
    async fn test_run_malformed_history_yields_none() {
        let war = fixture_battle("2PP", BattleType::WarDay, 0);
        let log = MockBattleLog::new(vec![]).with_history("2PP", MockHistory::Malformed);
        let services = test_services(log, MockShortener::new());
        let settings = test_settings();

        let result = BattlePipeline::new(&services, &settings).run(&war).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_run_error_object_with_not_found_yields_none() {
        let base = serve_fixed(
            StatusCode::NOT_FOUND,
            r#"{"error":true,"message":"Not found"}"#,
        )
        .await;
        let war = fixture_battle("2PP", BattleType::WarDay, 0);
        let battle_log: Arc<dyn BattleLog> = Arc::new(RoyaleApiClient::new(
            reqwest::Client::new(),
            base,
            "secret".to_string(),
        ));
        let mut services = test_services(MockBattleLog::new(vec![]), MockShortener::new());
        services.battle_log = battle_log;
        let settings = test_settings();

        let result = BattlePipeline::new(&services, &settings).run(&war).await;
        assert!(matches!(result, Ok(None)));
    }

    #[tokio::test]
    async fn test_run_history_failure() {
        let war = fixture_battle("2PP", BattleType::WarDay, 0);
        let log = MockBattleLog::new(vec![]).with_history("2PP", MockHistory::Unavailable);
        let services = test_services(log, MockShortener::new());
        let settings = test_settings();

        let result = BattlePipeline::new(&services, &settings).run(&war).await;
        assert!(matches!(result, Err(PipelineError::History(_))));
    }

    #[tokio::test]
    async fn test_run_link_failure() {
        let war = fixture_battle("2PP", BattleType::WarDay, 0);
        let services = test_services(MockBattleLog::new(vec![]), MockShortener::failing_on("2PP"));
        let settings = test_settings();

        let result = BattlePipeline::new(&services, &settings).run(&war).await;
        assert!(matches!(
            result,
            Err(PipelineError::Links(LinkError::Shorten(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_missing_opponent() {
        let mut war = fixture_battle("2PP", BattleType::WarDay, 0);
        war.opponent.clear();
        let services = test_services(MockBattleLog::new(vec![]), MockShortener::new());
        let settings = test_settings();

        let result = BattlePipeline::new(&services, &settings).run(&war).await;
        assert!(matches!(
            result,
            Err(PipelineError::MissingParticipant("opponent"))
        ));
    }
}
