use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::filter::{FieldKind, FilterField, FilterValue, Filterable};
use crate::domain::player::Player;

/// Most players a roster may hold
pub const MAX_ROSTER_SIZE: usize = 11;

/// A team that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamDraft {
    user_id: i64,
    name: String,
}

impl TeamDraft {
    /// Creates an empty team owned by `user_id`
    pub fn new(user_id: i64, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { user_id, name })
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Team aggregate root
///
/// Owns the association to players, not the player records themselves.
///
/// # Invariants
/// - Roster holds at most [`MAX_ROSTER_SIZE`] distinct players
/// - Roster value never exceeds the owner's budget when assigned
/// - `points`/`value` are sums over the roster at last recompute and have no setter
///
/// # Example
/// ```
/// use fantasy_cricket_api::domain::team::{Team, TeamDraft};
///
/// let team = Team::from_draft(1, TeamDraft::new(7, "Colombo Kings").expect("valid team"));
///
/// assert_eq!(team.user_id(), 7);
/// assert!(team.player_ids().is_empty());
/// assert_eq!(team.points(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: i64,
    user_id: i64,
    name: String,
    player_ids: BTreeSet<i64>,
    points: i64,
    value: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Team {
    /// Replaces the whole roster with `players`
    ///
    /// # Business Rules Enforced
    /// - At most [`MAX_ROSTER_SIZE`] distinct players
    /// - Summed player value must not exceed `budget`
    /// - On rejection the team is left untouched
    pub fn replace_roster(&mut self, players: &[Player], budget: i64) -> DomainResult<()> {
        let mut player_ids = BTreeSet::new();
        let unique: Vec<&Player> = players
            .iter()
            .filter(|p| player_ids.insert(p.id()))
            .collect();

        if unique.len() > MAX_ROSTER_SIZE {
            return Err(DomainError::RosterSizeExceeded {
                max: MAX_ROSTER_SIZE,
                excess: unique.len() - MAX_ROSTER_SIZE,
            });
        }

        let total = unique
            .iter()
            .try_fold(0i64, |sum, p| sum.checked_add(p.value()))
            .ok_or_else(|| DomainError::validation("roster value is out of range"))?;

        if total > budget {
            return Err(DomainError::BudgetExceeded { total, budget });
        }

        let previous = std::mem::replace(&mut self.player_ids, player_ids);
        if let Err(e) = self.recompute_aggregates(players) {
            self.player_ids = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Empties the roster; aggregates drop to zero
    pub fn clear_roster(&mut self) {
        self.player_ids.clear();
        self.points = 0;
        self.value = 0;
        self.updated_at = Utc::now();
    }

    /// Re-sums points and value from the roster's current player stats
    ///
    /// Players outside the roster are ignored, as are roster ids with no
    /// matching player. A sum that overflows fails with `Validation` and
    /// leaves the aggregates untouched.
    pub fn recompute_aggregates(&mut self, players: &[Player]) -> DomainResult<()> {
        let mut seen = BTreeSet::new();
        let (points, value) = players
            .iter()
            .filter(|p| self.player_ids.contains(&p.id()) && seen.insert(p.id()))
            .try_fold((0i64, 0i64), |(points, value), p| {
                Some((points.checked_add(p.points())?, value.checked_add(p.value())?))
            })
            .ok_or_else(|| DomainError::validation("team aggregates are out of range"))?;

        self.points = points;
        self.value = value;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Renames the team
    pub fn rename(&mut self, name: impl Into<String>) -> DomainResult<()> {
        let name = name.into();
        validate_name(&name)?;
        self.name = name;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Moves ownership to another user
    pub fn transfer_to(&mut self, user_id: i64) {
        self.user_id = user_id;
        self.updated_at = Utc::now();
    }

    // ===== Getters =====

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn player_ids(&self) -> &BTreeSet<i64> {
        &self.player_ids
    }

    pub fn contains(&self, player_id: i64) -> bool {
        self.player_ids.contains(&player_id)
    }

    pub fn points(&self) -> i64 {
        self.points
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Materialises a stored draft under its assigned id
    pub fn from_draft(id: i64, draft: TeamDraft) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id: draft.user_id,
            name: draft.name,
            player_ids: BTreeSet::new(),
            points: 0,
            value: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// This method bypasses business rules validation since the data
    /// is already validated and stored in the database.
    ///
    /// # Note
    /// Only to be used by repository implementations for data reconstruction.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: i64,
        user_id: i64,
        name: String,
        player_ids: impl IntoIterator<Item = i64>,
        points: i64,
        value: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            player_ids: player_ids.into_iter().collect(),
            points,
            value,
            created_at,
            updated_at,
        }
    }

    /// Drops a player from the roster without touching aggregates
    ///
    /// Used by stores when a player record is deleted; the next recompute
    /// refreshes the totals.
    pub fn detach(&mut self, player_id: i64) -> bool {
        self.player_ids.remove(&player_id)
    }

    /// Writes aggregates computed elsewhere
    ///
    /// Only for repository implementations applying an aggregate-only update.
    pub fn store_aggregates(&mut self, points: i64, value: i64) {
        self.points = points;
        self.value = value;
    }
}

fn validate_name(name: &str) -> DomainResult<()> {
    if name.trim().is_empty() {
        return Err(DomainError::validation("team name cannot be empty"));
    }
    Ok(())
}

/// Fields a team listing may be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeamField {
    UserId,
    Points,
    Value,
    Name,
}

impl FilterField for TeamField {
    fn column(self) -> &'static str {
        match self {
            TeamField::UserId => "user_id",
            TeamField::Points => "points",
            TeamField::Value => "value",
            TeamField::Name => "name",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            TeamField::Name => FieldKind::Text,
            _ => FieldKind::Integer,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "user_id" => Some(TeamField::UserId),
            "points" => Some(TeamField::Points),
            "value" => Some(TeamField::Value),
            "name" => Some(TeamField::Name),
            _ => None,
        }
    }
}

impl Filterable<TeamField> for Team {
    fn field_value(&self, field: TeamField) -> FilterValue {
        match field {
            TeamField::UserId => FilterValue::Int(self.user_id),
            TeamField::Points => FilterValue::Int(self.points),
            TeamField::Value => FilterValue::Int(self.value),
            TeamField::Name => FilterValue::Text(self.name.clone()),
        }
    }
}
