//! Card and deck models.

use serde::{Deserialize, Serialize};

/// Number of cards in a complete battle deck.
pub const DECK_SIZE: usize = 8;

/// A single card in a deck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card identifier (e.g., "hog-rider")
    #[serde(default)]
    pub key: String,

    /// Card level at the time of the battle
    #[serde(default)]
    pub level: u32,
}

impl Card {
    pub fn new(key: impl Into<String>, level: u32) -> Self {
        Self {
            key: key.into(),
            level,
        }
    }
}

/// A deck as supplied by the battle log, in API order.
pub type Deck = Vec<Card>;

/// Sorted card identifiers of a deck. Two decks are the same deck exactly
/// when their signatures are equal.
pub fn deck_signature(deck: &[Card]) -> Vec<&str> {
    let mut keys: Vec<&str> = deck.iter().map(|card| card.key.as_str()).collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_deserialize_ignores_extra_fields() {
        let json = r#"{"key": "knight", "level": 12, "name": "Knight", "elixir": 3}"#;
        let card: Card = serde_json::from_str(json).unwrap();

        assert_eq!(card, Card::new("knight", 12));
    }

    #[test]
    fn test_card_deserialize_missing_level() {
        let card: Card = serde_json::from_str(r#"{"key": "zap"}"#).unwrap();
        assert_eq!(card.level, 0);
    }

    #[test]
    fn test_deck_signature_sorted() {
        let deck = vec![Card::new("zap", 1), Card::new("arrows", 2), Card::new("knight", 3)];
        assert_eq!(deck_signature(&deck), vec!["arrows", "knight", "zap"]);
    }

    #[test]
    fn test_deck_signature_keeps_duplicates() {
        let deck = vec![Card::new("zap", 1), Card::new("zap", 1)];
        assert_eq!(deck_signature(&deck), vec!["zap", "zap"]);
    }
}
