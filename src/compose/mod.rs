//! Report text composition.
//!
//! Turns one war battle, its training statistics and the resolved links into
//! the message posted to the webhook. Pure string assembly.

use chrono::{DateTime, Locale, Utc};
use chrono_tz::Tz;

use crate::models::{Battle, Participant, ResolvedLinks, TrainingStats};

/// How battle timestamps are rendered.
#[derive(Debug, Clone)]
pub struct ReportFormat {
    pub locale: Locale,
    pub time_zone: Tz,
    /// strftime pattern
    pub datetime_format: String,
}

impl ReportFormat {
    pub fn new(locale: Locale, time_zone: Tz, datetime_format: impl Into<String>) -> Self {
        Self {
            locale,
            time_zone,
            datetime_format: datetime_format.into(),
        }
    }

    /// Render an instant in the configured zone and locale.
    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.time_zone)
            .format_localized(&self.datetime_format, self.locale)
            .to_string()
    }
}

fn outcome_line(battle: &Battle) -> &'static str {
    if battle.is_victory() {
        "Victory! :raised_hands:"
    } else {
        "Loss :crying_cat_face:"
    }
}

/// Compose the webhook message for one war battle.
pub fn compose_report(
    battle: &Battle,
    player: &Participant,
    rival: &Participant,
    stats: &TrainingStats,
    links: &ResolvedLinks,
    format: &ReportFormat,
) -> String {
    let mut text = String::new();

    text.push_str(outcome_line(battle));
    text.push('\n');

    text.push_str(&format!(
        "{} vs {} at {}.\n",
        player.name,
        rival.name,
        format.format_time(battle.utc_time)
    ));

    text.push_str(&format!(
        "{} trained a total of {} times with the war deck \
         ({} friendlies, {} in challenges and {} on ladder and {} in tournaments). \
         A total of {} friendlies during the last {} battles.\n",
        player.name,
        stats.total(),
        stats.clan_mate,
        stats.challenge,
        stats.ladder,
        stats.tournament,
        stats.all_friendlies,
        stats.history_len,
    ));

    text.push_str(&format!(
        "Deck: {}. Copy deck: {}. RoyaleApi profile: <{}>.",
        links.deck_image, links.deck_copy, links.profile
    ));

    text
}
