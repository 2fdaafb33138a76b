//! Link resolution for a war battle.
//!
//! Builds the deck image, deck copy and profile URLs for the recorded player
//! and shortens all three concurrently.

pub mod render;

pub use render::{CloudinaryRenderer, DeckImageRenderer};

use thiserror::Error;
use tracing::debug;

use crate::fetch::{FetchError, LinkShortener};
use crate::models::{Participant, ResolvedLinks};

/// Errors that can occur while resolving links.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Deck has {0} cards, expected 8")]
    IncompleteDeck(usize),

    #[error("Shortening failed: {0}")]
    Shorten(#[from] FetchError),
}

/// Deck copy link flagged as a war deck.
pub fn deck_copy_url(player: &Participant) -> String {
    format!("{}&war=1", player.deck_link)
}

/// Public profile page of a player.
pub fn profile_url(profile_base_url: &str, tag: &str) -> String {
    format!("{}/{}", profile_base_url.trim_end_matches('/'), tag)
}

/// Resolve the three shortened links for `player`.
///
/// Completes once every shortening call has answered; the first failure is
/// returned. Nothing is retried.
pub async fn resolve_links(
    player: &Participant,
    renderer: &dyn DeckImageRenderer,
    shortener: &dyn LinkShortener,
    profile_base_url: &str,
) -> Result<ResolvedLinks, LinkError> {
    let deck_image = renderer.render_url(&player.deck)?;
    let deck_copy = deck_copy_url(player);
    let profile = profile_url(profile_base_url, &player.tag);

    debug!(tag = %player.tag, "Shortening links via {}", shortener.name());

    let (deck_image, deck_copy, profile) = tokio::try_join!(
        shortener.shorten(&deck_image),
        shortener.shorten(&deck_copy),
        shortener.shorten(&profile),
    )?;

    Ok(ResolvedLinks {
        deck_image,
        deck_copy,
        profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::shortener::MockShortener;
    use crate::models::Card;
    use super::render::MockRenderer;

    fn player() -> Participant {
        Participant {
            tag: "2PP".to_string(),
            name: "Alice".to_string(),
            deck: (1..=8).map(|i| Card::new(format!("c{}", i), 9)).collect(),
            deck_link: "https://link.clashroyale.com/deck/en?deck=1;2;3".to_string(),
        }
    }

    #[test]
    fn test_deck_copy_url() {
        assert_eq!(
            deck_copy_url(&player()),
            "https://link.clashroyale.com/deck/en?deck=1;2;3&war=1"
        );
    }

    #[test]
    fn test_profile_url() {
        assert_eq!(
            profile_url("https://royaleapi.com/player/", "2PP"),
            "https://royaleapi.com/player/2PP"
        );
        assert_eq!(
            profile_url("https://royaleapi.com/player", "2PP"),
            "https://royaleapi.com/player/2PP"
        );
    }

    #[tokio::test]
    async fn test_resolve_links() {
        let links = resolve_links(
            &player(),
            &MockRenderer,
            &MockShortener::new(),
            "https://royaleapi.com/player",
        )
        .await
        .unwrap();

        let image = MockRenderer.render_url(&player().deck).unwrap();
        assert_eq!(links.deck_image, format!("https://short.test/{}", image.len()));
        assert_eq!(links.deck_copy, "https://short.test/53");
        assert_eq!(links.profile, "https://short.test/32");
    }

    #[tokio::test]
    async fn test_resolve_links_shortener_failure() {
        let result = resolve_links(
            &player(),
            &MockRenderer,
            &MockShortener::failing_on("war=1"),
            "https://royaleapi.com/player",
        )
        .await;

        assert!(matches!(result, Err(LinkError::Shorten(_))));
    }

    #[tokio::test]
    async fn test_resolve_links_incomplete_deck() {
        let mut player = player();
        player.deck.truncate(7);

        let result = resolve_links(
            &player,
            &CloudinaryRenderer::new("demo", "CR"),
            &MockShortener::new(),
            "https://royaleapi.com/player",
        )
        .await;

        assert!(matches!(result, Err(LinkError::IncompleteDeck(7))));
    }
}
