// Team domain module
// Contains the team aggregate root and its roster rules

#![allow(clippy::module_inception)]

pub mod team;

// Re-export main types for convenience
pub use team::{Team, TeamDraft, TeamField, MAX_ROSTER_SIZE};

/// Conjunctive filter over team fields
pub type TeamFilter = crate::domain::filter::Filter<TeamField>;
