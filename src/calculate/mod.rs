//! Training statistics engine.
//!
//! Pure functions over fetched battle records:
//! - Deck equality (multiset of card keys, levels ignored)
//! - Training classification of a player's history against a war deck
//! - Selection of recent war day battles

use chrono::{DateTime, Duration, Utc};

use crate::models::{deck_signature, Battle, BattleType, Card, Participant, TrainingStats};

/// Whether two decks hold the same cards, regardless of order and level.
pub fn equal_deck(a: &[Card], b: &[Card]) -> bool {
    deck_signature(a) == deck_signature(b)
}

/// Whether `side` is the reference player using the reference deck.
fn is_reference_side(side: Option<&Participant>, reference: &Participant) -> bool {
    side.is_some_and(|p| p.tag == reference.tag && equal_deck(&p.deck, &reference.deck))
}

/// Count how often the reference player used their war deck in `history`.
///
/// The player may be recorded on either side of a history battle, so both
/// `team[0]` and `opponent[0]` are checked.
pub fn classify_training(history: &[Battle], reference: &Participant) -> TrainingStats {
    let mut stats = TrainingStats {
        history_len: history.len() as u32,
        ..Default::default()
    };

    for battle in history {
        if battle.battle_type == BattleType::ClanMate {
            stats.all_friendlies += 1;
        }

        let matched = is_reference_side(battle.player(), reference)
            || is_reference_side(battle.rival(), reference);
        if !matched {
            continue;
        }

        match battle.battle_type {
            BattleType::ClanMate => stats.clan_mate += 1,
            BattleType::Challenge => stats.challenge += 1,
            BattleType::Ladder => stats.ladder += 1,
            BattleType::Tournament => stats.tournament += 1,
            _ => {}
        }
    }

    stats
}

/// Whether a battle is a war day battle played strictly after `now - window`.
pub fn is_recent_war_battle(battle: &Battle, now: DateTime<Utc>, window: Duration) -> bool {
    battle.battle_type == BattleType::WarDay && battle.utc_time > now - window
}

/// War day battles from the last `minutes` minutes, in input order.
pub fn recent_war_battles(battles: Vec<Battle>, now: DateTime<Utc>, minutes: u32) -> Vec<Battle> {
    let window = Duration::minutes(i64::from(minutes));
    battles
        .into_iter()
        .filter(|battle| is_recent_war_battle(battle, now, window))
        .collect()
}
