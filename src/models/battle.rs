//! Battle records as returned by the battle log API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Deck;

/// Kind of battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BattleType {
    /// Clan war day battle
    #[serde(rename = "clanWarWarDay")]
    WarDay,

    /// Clan war collection day battle
    #[serde(rename = "clanWarCollectionDay")]
    CollectionDay,

    /// Friendly battle against a clan mate
    #[serde(rename = "clanMate")]
    ClanMate,

    #[serde(rename = "challenge")]
    Challenge,

    /// Ladder battle
    #[serde(rename = "PvP")]
    Ladder,

    #[serde(rename = "tournament")]
    Tournament,

    /// Any battle type this crate does not track
    #[serde(other)]
    Other,
}

impl BattleType {
    /// Battle types that count as training with a war deck.
    pub const TRAINING: [BattleType; 4] = [
        BattleType::ClanMate,
        BattleType::Challenge,
        BattleType::Ladder,
        BattleType::Tournament,
    ];
}

/// One side of a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    #[serde(default)]
    pub tag: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub deck: Deck,

    /// Link that opens the deck in the game client
    #[serde(default)]
    pub deck_link: String,
}

/// A single battle record.
///
/// Battles are read-only snapshots fetched fresh on every invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Battle {
    #[serde(rename = "type")]
    pub battle_type: BattleType,

    /// When the battle was played (unix seconds on the wire)
    #[serde(with = "chrono::serde::ts_seconds")]
    pub utc_time: DateTime<Utc>,

    /// Positive when `team` won
    #[serde(default)]
    pub winner: i32,

    #[serde(default)]
    pub team: Vec<Participant>,

    #[serde(default)]
    pub opponent: Vec<Participant>,
}

impl Battle {
    /// The recorded player (`team[0]`).
    pub fn player(&self) -> Option<&Participant> {
        self.team.first()
    }

    /// The opposing player (`opponent[0]`).
    pub fn rival(&self) -> Option<&Participant> {
        self.opponent.first()
    }

    pub fn is_victory(&self) -> bool {
        self.winner >= 1
    }
}
