//! Deck image rendering through Cloudinary URL transformations.
//!
//! No request is made here: the renderer only builds the delivery URL, and
//! Cloudinary composes the image when the URL is first opened.

use crate::models::{Card, DECK_SIZE};

use super::LinkError;

/// Builds an image URL showing a whole deck.
pub trait DeckImageRenderer: Send + Sync {
    fn render_url(&self, deck: &[Card]) -> Result<String, LinkError>;
}

/// Card tile size in pixels.
const TILE_WIDTH: u32 = 100;
const TILE_HEIGHT: u32 = 120;

/// Overlay offsets `(x, y)` for cards 2..=8 relative to the first card,
/// followed by the x offset of each card's level caption.
const OVERLAYS: [(i32, Option<i32>, i32); DECK_SIZE - 1] = [
    (100, None, 50),
    (150, None, 100),
    (200, None, 150),
    (-150, Some(120), -150),
    (-50, Some(60), -50),
    (50, Some(60), 50),
    (150, Some(60), 150),
];

/// Cloudinary renderer laying a deck out in two rows of four card images,
/// each captioned with its level.
pub struct CloudinaryRenderer {
    cloud_name: String,
    /// Folder holding one image per card key
    folder: String,
}

impl CloudinaryRenderer {
    pub fn new(cloud_name: impl Into<String>, folder: impl Into<String>) -> Self {
        Self {
            cloud_name: cloud_name.into(),
            folder: folder.into(),
        }
    }

    fn level_caption(level: u32, x: Option<i32>) -> String {
        let mut step = format!("g_south,l_text:Arial_20_bold:Level%20{},co_white", level);
        if let Some(x) = x {
            step.push_str(&format!(",x_{}", x));
        }
        step
    }
}

impl DeckImageRenderer for CloudinaryRenderer {
    fn render_url(&self, deck: &[Card]) -> Result<String, LinkError> {
        if deck.len() != DECK_SIZE {
            return Err(LinkError::IncompleteDeck(deck.len()));
        }

        let mut steps = vec![
            format!("c_scale,h_{},w_{},x_0,y_0", TILE_HEIGHT, TILE_WIDTH),
            Self::level_caption(deck[0].level, None),
        ];

        for (card, (x, y, caption_x)) in deck[1..].iter().zip(OVERLAYS) {
            let mut step = format!(
                "c_scale,h_{},l_{}:{},w_{},x_{}",
                TILE_HEIGHT, self.folder, card.key, TILE_WIDTH, x
            );
            if let Some(y) = y {
                step.push_str(&format!(",y_{}", y));
            }
            steps.push(step);
            steps.push(Self::level_caption(card.level, Some(caption_x)));
        }

        Ok(format!(
            "https://res.cloudinary.com/{}/image/upload/{}/{}/{}",
            self.cloud_name,
            steps.join("/"),
            self.folder,
            deck[0].key
        ))
    }
}

/// Renders `https://img.test/<keys joined by '+'>`.
#[cfg(test)]
pub struct MockRenderer;

#[cfg(test)]
impl DeckImageRenderer for MockRenderer {
    fn render_url(&self, deck: &[Card]) -> Result<String, LinkError> {
        let keys: Vec<&str> = deck.iter().map(|c| c.key.as_str()).collect();
        Ok(format!("https://img.test/{}", keys.join("+")))
    }
}
