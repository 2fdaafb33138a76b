//! # Warlog
//!
//! Reports a clan's recent war battles to Discord, together with how often
//! each player trained with their war deck beforehand.
//!
//! ## Architecture
//!
//! - **models**: Battle records, training statistics, reports and outcomes
//! - **calculate**: Deck matching, training classification, window filtering
//! - **compose**: Report text
//! - **links**: Deck image, deck copy and profile links
//! - **fetch**: HTTP clients for the battle log, shortener and webhook
//! - **pipeline**: Per-battle pipeline and the fan-out orchestrator
//! - **api**: HTTP trigger endpoint
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod compose;
pub mod config;
pub mod fetch;
pub mod links;
pub mod models;
pub mod pipeline;

pub use models::*;
