// Player domain module
// Contains the player aggregate, the statistics engine, and tournament summaries

#![allow(clippy::module_inception)]

pub mod player;
pub mod stats;
pub mod summary;

// Re-export main types for convenience
pub use player::{Player, PlayerDraft, PlayerField, PlayerPatch, PlayerProfile};
pub use stats::{compute_derived_stats, DerivedStats, Rate, RawStats};
pub use summary::TournamentSummary;

/// Conjunctive filter over player fields
pub type PlayerFilter = crate::domain::filter::Filter<PlayerField>;
