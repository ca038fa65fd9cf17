use chrono::{DateTime, Utc};

use super::stats::{compute_derived_stats, DerivedStats, RawStats};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::filter::{FieldKind, FilterField, FilterValue, Filterable};

/// Descriptive attributes of a player, independent of performance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerProfile {
    pub name: String,
    pub university: String,
    pub category: String,
}

impl PlayerProfile {
    fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("player name cannot be empty"));
        }
        Ok(())
    }
}

/// A player that has not been persisted yet
///
/// Derived stats are computed at construction so the store never receives
/// a player without them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerDraft {
    profile: PlayerProfile,
    raw: RawStats,
    derived: DerivedStats,
}

impl PlayerDraft {
    /// Validates input and computes derived stats
    pub fn new(profile: PlayerProfile, raw: RawStats) -> DomainResult<Self> {
        profile.validate()?;
        let derived = compute_derived_stats(&raw)?;

        Ok(Self {
            profile,
            raw,
            derived,
        })
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn raw(&self) -> &RawStats {
        &self.raw
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }
}

/// Partial update of a player; absent fields keep their current value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerPatch {
    pub name: Option<String>,
    pub university: Option<String>,
    pub category: Option<String>,
    pub total_runs: Option<i64>,
    pub balls_faced: Option<i64>,
    pub innings_played: Option<i64>,
    pub wickets: Option<i64>,
    pub overs_bowled: Option<f64>,
    pub runs_conceded: Option<i64>,
}

/// Player aggregate
///
/// # Invariants
/// - Derived stats always match the current raw counters
/// - Derived stats have no setter; every mutation path recomputes them
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    id: i64,
    profile: PlayerProfile,
    raw: RawStats,
    derived: DerivedStats,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Player {
    /// Applies a patch and recomputes derived stats
    ///
    /// Leaves the player untouched when the merged input is invalid.
    pub fn apply(&mut self, patch: PlayerPatch) -> DomainResult<()> {
        let profile = PlayerProfile {
            name: patch.name.unwrap_or_else(|| self.profile.name.clone()),
            university: patch
                .university
                .unwrap_or_else(|| self.profile.university.clone()),
            category: patch
                .category
                .unwrap_or_else(|| self.profile.category.clone()),
        };

        let raw = RawStats {
            total_runs: patch.total_runs.unwrap_or(self.raw.total_runs),
            balls_faced: patch.balls_faced.unwrap_or(self.raw.balls_faced),
            innings_played: patch.innings_played.unwrap_or(self.raw.innings_played),
            wickets: patch.wickets.unwrap_or(self.raw.wickets),
            overs_bowled: patch.overs_bowled.unwrap_or(self.raw.overs_bowled),
            runs_conceded: patch.runs_conceded.unwrap_or(self.raw.runs_conceded),
        };

        let draft = PlayerDraft::new(profile, raw)?;
        self.profile = draft.profile;
        self.raw = draft.raw;
        self.derived = draft.derived;
        self.updated_at = Utc::now();

        Ok(())
    }

    // ===== Getters =====

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn name(&self) -> &str {
        &self.profile.name
    }

    pub fn raw(&self) -> &RawStats {
        &self.raw
    }

    pub fn derived(&self) -> &DerivedStats {
        &self.derived
    }

    pub fn points(&self) -> i64 {
        self.derived.points
    }

    pub fn value(&self) -> i64 {
        self.derived.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Materialises a stored draft under its assigned id
    pub fn from_draft(id: i64, draft: PlayerDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            profile: draft.profile,
            raw: draft.raw,
            derived: draft.derived,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a Player from persistence layer data
    ///
    /// Derived stats are recomputed from the stored raw counters rather
    /// than trusted from storage, so out-of-range rows fail with
    /// `Validation`.
    ///
    /// # Note
    /// Only to be used by repository implementations for data reconstruction.
    pub fn from_persistence(
        id: i64,
        profile: PlayerProfile,
        raw: RawStats,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            profile,
            raw,
            derived: compute_derived_stats(&raw)?,
            created_at,
            updated_at,
        })
    }
}

/// Fields a player listing may be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerField {
    TotalRuns,
    BallsFaced,
    InningsPlayed,
    Wickets,
    OversBowled,
    RunsConceded,
    Points,
    Value,
    Name,
    University,
    Category,
}

impl FilterField for PlayerField {
    fn column(self) -> &'static str {
        match self {
            PlayerField::TotalRuns => "total_runs",
            PlayerField::BallsFaced => "balls_faced",
            PlayerField::InningsPlayed => "innings_played",
            PlayerField::Wickets => "wickets",
            PlayerField::OversBowled => "overs_bowled",
            PlayerField::RunsConceded => "runs_conceded",
            PlayerField::Points => "points",
            PlayerField::Value => "value",
            PlayerField::Name => "name",
            PlayerField::University => "university",
            PlayerField::Category => "category",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            PlayerField::OversBowled => FieldKind::Float,
            PlayerField::Name | PlayerField::University | PlayerField::Category => FieldKind::Text,
            _ => FieldKind::Integer,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        let field = match name {
            "total_runs" => PlayerField::TotalRuns,
            "balls_faced" => PlayerField::BallsFaced,
            "innings_played" => PlayerField::InningsPlayed,
            "wickets" => PlayerField::Wickets,
            "overs_bowled" => PlayerField::OversBowled,
            "runs_conceded" => PlayerField::RunsConceded,
            "points" => PlayerField::Points,
            "value" => PlayerField::Value,
            "name" => PlayerField::Name,
            "university" => PlayerField::University,
            "category" => PlayerField::Category,
            _ => return None,
        };
        Some(field)
    }
}

impl Filterable<PlayerField> for Player {
    fn field_value(&self, field: PlayerField) -> FilterValue {
        match field {
            PlayerField::TotalRuns => FilterValue::Int(self.raw.total_runs),
            PlayerField::BallsFaced => FilterValue::Int(self.raw.balls_faced),
            PlayerField::InningsPlayed => FilterValue::Int(self.raw.innings_played),
            PlayerField::Wickets => FilterValue::Int(self.raw.wickets),
            PlayerField::OversBowled => FilterValue::Float(self.raw.overs_bowled),
            PlayerField::RunsConceded => FilterValue::Int(self.raw.runs_conceded),
            PlayerField::Points => FilterValue::Int(self.derived.points),
            PlayerField::Value => FilterValue::Int(self.derived.value),
            PlayerField::Name => FilterValue::Text(self.profile.name.clone()),
            PlayerField::University => FilterValue::Text(self.profile.university.clone()),
            PlayerField::Category => FilterValue::Text(self.profile.category.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{Comparison, Filter};
    use crate::domain::player::stats::Rate;

    fn profile() -> PlayerProfile {
        PlayerProfile {
            name: "Danushka Jayawickrama".to_string(),
            university: "University of Moratuwa".to_string(),
            category: "Batsman".to_string(),
        }
    }

    fn raw() -> RawStats {
        RawStats {
            total_runs: 500,
            balls_faced: 400,
            innings_played: 10,
            ..RawStats::default()
        }
    }

    #[test]
    fn draft_computes_derived_stats() {
        let draft = PlayerDraft::new(profile(), raw()).unwrap();

        assert_eq!(draft.derived().points, 65);
        assert_eq!(draft.derived().value, 700_000);
    }

    #[test]
    fn draft_rejects_blank_name() {
        let result = PlayerDraft::new(
            PlayerProfile {
                name: "  ".to_string(),
                ..profile()
            },
            raw(),
        );

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn patch_recomputes_derived_stats() {
        let mut player = Player::from_draft(1, PlayerDraft::new(profile(), raw()).unwrap());

        player
            .apply(PlayerPatch {
                balls_faced: Some(500),
                ..PlayerPatch::default()
            })
            .unwrap();

        assert_eq!(player.raw().balls_faced, 500);
        assert_eq!(player.derived().batting_strike_rate, Rate::Defined(100.0));
        // 100/5 + 50*0.8 = 60
        assert_eq!(player.points(), 60);
        assert_eq!(player.value(), 650_000);
    }

    #[test]
    fn invalid_patch_leaves_player_unchanged() {
        let mut player = Player::from_draft(1, PlayerDraft::new(profile(), raw()).unwrap());
        let before = player.clone();

        let result = player.apply(PlayerPatch {
            runs_conceded: Some(-5),
            ..PlayerPatch::default()
        });

        assert!(result.is_err());
        assert_eq!(player, before);
    }

    #[test]
    fn oversized_patch_is_rejected() {
        let mut player = Player::from_draft(1, PlayerDraft::new(profile(), raw()).unwrap());
        let before = player.clone();

        let result = player.apply(PlayerPatch {
            total_runs: Some(100_000_000_000_000),
            balls_faced: Some(1),
            ..PlayerPatch::default()
        });

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(player, before);
    }

    #[test]
    fn from_persistence_recomputes_derived_stats() {
        let now = Utc::now();
        let player = Player::from_persistence(7, profile(), raw(), now, now).unwrap();

        assert_eq!(player.id(), 7);
        assert_eq!(player.points(), 65);
    }

    #[test]
    fn filter_matches_player_fields() {
        let player = Player::from_draft(1, PlayerDraft::new(profile(), raw()).unwrap());

        let filter = Filter::all()
            .and(PlayerField::TotalRuns, Comparison::Gt, FilterValue::Int(400))
            .unwrap()
            .and(
                PlayerField::Category,
                Comparison::Eq,
                FilterValue::Text("Batsman".to_string()),
            )
            .unwrap();
        assert!(filter.matches(&player));

        let filter = Filter::all()
            .and(PlayerField::Wickets, Comparison::Gt, FilterValue::Int(0))
            .unwrap();
        assert!(!filter.matches(&player));
    }
}
