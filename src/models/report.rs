//! Invocation input, composed reports and webhook dispatch outcomes.

use serde::{Deserialize, Serialize};

/// Input of one invocation, as produced by the external trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Clan to report on
    pub clan_id: String,

    /// Webhook path segment (`{id}/{token}`) of the target channel
    pub discord_key: String,

    /// Look-back window in minutes; the configured default applies when absent
    #[serde(default)]
    pub minutes: Option<u32>,
}

/// Shortened links shown at the bottom of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedLinks {
    pub deck_image: String,
    pub deck_copy: String,
    pub profile: String,
}

/// A composed message for one war battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub player_tag: String,
    pub player_name: String,
    pub content: String,
}

/// Status returned by the webhook for one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostStatus {
    pub status: u16,
    pub status_text: String,
}

/// What happened to one qualifying war battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The report was posted; the webhook answered with `status`
    Posted {
        player_tag: String,
        status: u16,
        status_text: String,
    },

    /// No report was produced, nothing was posted
    Skipped { player_tag: String, reason: String },

    /// The pipeline or the post failed
    Failed { player_tag: String, error: String },
}

impl DispatchOutcome {
    pub fn player_tag(&self) -> &str {
        match self {
            DispatchOutcome::Posted { player_tag, .. }
            | DispatchOutcome::Skipped { player_tag, .. }
            | DispatchOutcome::Failed { player_tag, .. } => player_tag,
        }
    }

    pub fn is_posted(&self) -> bool {
        matches!(self, DispatchOutcome::Posted { .. })
    }
}
