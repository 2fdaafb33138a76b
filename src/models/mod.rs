//! Core data models for the war log reporter.

mod battle;
mod card;
mod report;
mod training;

pub use battle::*;
pub use card::*;
pub use report::*;
pub use training::*;
