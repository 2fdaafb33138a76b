use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::{DispatchOutcome, Invocation};

#[derive(Debug, Serialize)]
pub struct InvokeResponse {
    /// Number of reports the webhook accepted
    pub posted: usize,
    pub outcomes: Vec<DispatchOutcome>,
}

/// Run one invocation and return its outcomes.
pub async fn invoke(
    State(state): State<AppState>,
    Json(invocation): Json<Invocation>,
) -> Result<Json<InvokeResponse>, ApiError> {
    info!(clan = %invocation.clan_id, "Invocation received");

    let outcomes = state.orchestrator.run(&invocation).await?;
    let posted = outcomes.iter().filter(|o| o.is_posted()).count();

    Ok(Json(InvokeResponse { posted, outcomes }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::build_router;
    use crate::fetch::battle_log::{MockBattleLog, MockHistory};
    use crate::fetch::shortener::MockShortener;
    use crate::models::BattleType;
    use crate::pipeline::tests::{fixture_battle, test_services, test_settings};
    use crate::pipeline::WarlogOrchestrator;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn setup_state(log: MockBattleLog) -> AppState {
        AppState {
            orchestrator: Arc::new(WarlogOrchestrator::new(
                test_services(log, MockShortener::new()),
                test_settings(),
            )),
        }
    }

    fn recent_war_battle(tag: &str) -> crate::models::Battle {
        let mut battle = fixture_battle(tag, BattleType::WarDay, 0);
        battle.utc_time = Utc::now() - Duration::minutes(1);
        battle
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    async fn post_json(app: axum::Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(setup_state(MockBattleLog::new(vec![])));
        let (status, json) = get_json(app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_invoke_returns_outcomes() {
        let log = MockBattleLog::new(vec![recent_war_battle("AAA"), recent_war_battle("BBB")])
            .with_history("BBB", MockHistory::Unavailable);
        let app = build_router(setup_state(log));

        let (status, json) = post_json(
            app,
            "/api/invoke",
            r#"{"clan_id": "9PJ82CRC", "discord_key": "1/token", "minutes": 15}"#,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["posted"], 1);
        assert_eq!(json["outcomes"].as_array().unwrap().len(), 2);
        assert_eq!(json["outcomes"][0]["outcome"], "posted");
        assert_eq!(json["outcomes"][1]["outcome"], "failed");
        assert_eq!(json["outcomes"][1]["player_tag"], "BBB");
    }

    #[tokio::test]
    async fn test_invoke_bad_request() {
        let app = build_router(setup_state(MockBattleLog::new(vec![])));

        let (status, json) = post_json(
            app,
            "/api/invoke",
            r#"{"clan_id": "", "discord_key": "1/token"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_invoke_upstream_failure() {
        let app = build_router(setup_state(MockBattleLog::unavailable()));

        let (status, json) = post_json(
            app,
            "/api/invoke",
            r#"{"clan_id": "9PJ82CRC", "discord_key": "1/token"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    }
}
