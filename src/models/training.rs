//! Training statistics derived from a player's battle history.

use serde::{Deserialize, Serialize};

use super::BattleType;

/// How often a war deck was used outside the war, per battle type.
///
/// Computed once per war battle and discarded after the report is composed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingStats {
    /// Friendly battles against clan mates with the war deck
    pub clan_mate: u32,

    /// Challenge battles with the war deck
    pub challenge: u32,

    /// Ladder battles with the war deck
    pub ladder: u32,

    /// Tournament battles with the war deck
    pub tournament: u32,

    /// All friendly battles in the history, whatever the deck
    pub all_friendlies: u32,

    /// Number of battles in the inspected history
    pub history_len: u32,
}

impl TrainingStats {
    /// Total number of training battles across the four tracked types.
    pub fn total(&self) -> u32 {
        BattleType::TRAINING
            .iter()
            .map(|battle_type| self.count_for(*battle_type))
            .sum()
    }

    /// Matching battles of a given type. War and untracked types are always 0.
    pub fn count_for(&self, battle_type: BattleType) -> u32 {
        match battle_type {
            BattleType::ClanMate => self.clan_mate,
            BattleType::Challenge => self.challenge,
            BattleType::Ladder => self.ladder,
            BattleType::Tournament => self.tournament,
            _ => 0,
        }
    }
}
