use std::collections::BTreeSet;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::{Action, Entity};
use crate::domain::player::Player;
use crate::domain::repositories::Stores;
use crate::domain::team::{Team, TeamDraft, TeamFilter};
use crate::domain::user::User;

use super::aggregates::AggregateRecalculator;
use super::locks::KeyedLocks;

/// Metadata a caller may change on a team
///
/// Points and value are deliberately absent; they are always recomputed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamMetadata {
    pub name: Option<String>,
    pub user_id: Option<i64>,
}

/// A team together with the players on its roster
#[derive(Debug, Clone, PartialEq)]
pub struct TeamRoster {
    pub team: Team,
    pub players: Vec<Player>,
}

/// Enforces roster-size and budget rules on team mutations
///
/// Every mutation of a team runs under its owner's lock and is followed by
/// a full aggregate recompute plus a change event.
pub struct TeamComposition {
    stores: Stores,
    owner_locks: Arc<KeyedLocks>,
    aggregates: Arc<AggregateRecalculator>,
}

impl TeamComposition {
    pub fn new(
        stores: Stores,
        owner_locks: Arc<KeyedLocks>,
        aggregates: Arc<AggregateRecalculator>,
    ) -> Self {
        Self {
            stores,
            owner_locks,
            aggregates,
        }
    }

    async fn user(&self, user_id: i64) -> DomainResult<User> {
        self.stores
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))
    }

    async fn team(&self, team_id: i64) -> DomainResult<Team> {
        self.stores
            .teams
            .find_by_id(team_id)
            .await?
            .ok_or_else(|| DomainError::not_found("team", team_id))
    }

    /// Resolves every id or fails on the first one missing
    async fn resolve_players(&self, ids: &[i64]) -> DomainResult<Vec<Player>> {
        let players = self.stores.players.find_by_ids(ids).await?;
        if let Some(missing) = ids
            .iter()
            .find(|id| !players.iter().any(|p| p.id() == **id))
        {
            return Err(DomainError::not_found("player", *missing));
        }
        Ok(players)
    }

    /// Replaces `user_id`'s roster with `player_ids`
    ///
    /// # Business Rules Enforced
    /// - Creates an empty team for the user when none exists
    /// - An empty list clears the roster
    /// - Every id must resolve to a player
    /// - At most 11 distinct players, summed value within the user's budget
    /// - On rejection the stored roster is unchanged
    pub async fn assign_roster(&self, user_id: i64, player_ids: &[i64]) -> DomainResult<Team> {
        let team = {
            let _guard = self.owner_locks.lock(user_id).await;

            let user = self.user(user_id).await?;
            let mut team = match self.stores.teams.find_by_user(user_id).await? {
                Some(team) => team,
                None => {
                    let draft = TeamDraft::new(user_id, format!("{}'s XI", user.username))?;
                    self.stores.teams.insert(&draft).await?
                }
            };

            if player_ids.is_empty() {
                team.clear_roster();
            } else {
                let ids: Vec<i64> = player_ids
                    .iter()
                    .copied()
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                let players = self.resolve_players(&ids).await?;
                team.replace_roster(&players, user.budget())?;
            }

            self.stores.teams.save(&team).await?;
            team
        };

        tracing::info!(
            team_id = team.id(),
            user_id,
            players = team.player_ids().len(),
            value = team.value(),
            "Roster assigned"
        );

        self.aggregates
            .propagate(Entity::Team, Action::Update, Some(team.id()))
            .await?;

        Ok(team)
    }

    /// Creates an empty team for `user_id`
    pub async fn create_team(&self, user_id: i64, name: String) -> DomainResult<Team> {
        let team = {
            let _guard = self.owner_locks.lock(user_id).await;
            self.user(user_id).await?;
            self.stores
                .teams
                .insert(&TeamDraft::new(user_id, name)?)
                .await?
        };

        tracing::info!(team_id = team.id(), user_id, "Team created");
        self.aggregates
            .propagate(Entity::Team, Action::Add, Some(team.id()))
            .await?;

        Ok(team)
    }

    /// Renames a team or moves it to another owner
    ///
    /// Aggregates are recomputed from the roster before the team is saved.
    pub async fn update_team_metadata(
        &self,
        team_id: i64,
        metadata: TeamMetadata,
    ) -> DomainResult<Team> {
        let mut owner = self.team(team_id).await?.user_id();

        let team = loop {
            let target = metadata.user_id.unwrap_or(owner);
            let _guards = self.owner_locks.lock_pair(owner, target).await;

            let mut team = self.team(team_id).await?;
            if team.user_id() != owner {
                owner = team.user_id();
                continue;
            }

            let ids: Vec<i64> = team.player_ids().iter().copied().collect();
            let players = self.stores.players.find_by_ids(&ids).await?;
            team.recompute_aggregates(&players)?;

            if target != owner {
                let new_owner = self.user(target).await?;
                if self.stores.teams.find_by_user(target).await?.is_some() {
                    return Err(DomainError::Conflict(format!(
                        "user {} already has a team",
                        target
                    )));
                }
                if team.value() > new_owner.budget() {
                    return Err(DomainError::BudgetExceeded {
                        total: team.value(),
                        budget: new_owner.budget(),
                    });
                }
                team.transfer_to(target);
            }

            if let Some(name) = &metadata.name {
                team.rename(name.clone())?;
            }

            self.stores.teams.save(&team).await?;
            break team;
        };

        tracing::info!(team_id, user_id = team.user_id(), "Team updated");
        self.aggregates
            .propagate(Entity::Team, Action::Update, Some(team_id))
            .await?;

        Ok(team)
    }

    /// Renames the team owned by `user_id`
    pub async fn rename_my_team(&self, user_id: i64, name: String) -> DomainResult<Team> {
        let team = self
            .stores
            .teams
            .find_by_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("team", format!("user {}", user_id)))?;

        self.update_team_metadata(
            team.id(),
            TeamMetadata {
                name: Some(name),
                user_id: None,
            },
        )
        .await
    }

    /// Deletes a team; its roster association goes with it
    pub async fn delete_team(&self, team_id: i64) -> DomainResult<()> {
        let mut owner = self.team(team_id).await?.user_id();
        loop {
            let _guard = self.owner_locks.lock(owner).await;

            let team = self.team(team_id).await?;
            if team.user_id() != owner {
                owner = team.user_id();
                continue;
            }

            self.stores.teams.delete(team_id).await?;
            break;
        }

        tracing::info!(team_id, user_id = owner, "Team deleted");
        self.aggregates
            .propagate(Entity::Team, Action::Delete, Some(team_id))
            .await
    }

    /// The user's team with its players, if they have one
    pub async fn my_team(&self, user_id: i64) -> DomainResult<Option<TeamRoster>> {
        let team = match self.stores.teams.find_by_user(user_id).await? {
            Some(team) => team,
            None => return Ok(None),
        };
        let ids: Vec<i64> = team.player_ids().iter().copied().collect();
        let players = self.stores.players.find_by_ids(&ids).await?;

        Ok(Some(TeamRoster { team, players }))
    }

    /// A team with its players
    pub async fn get_team(&self, team_id: i64) -> DomainResult<TeamRoster> {
        let team = self.team(team_id).await?;
        let ids: Vec<i64> = team.player_ids().iter().copied().collect();
        let players = self.stores.players.find_by_ids(&ids).await?;

        Ok(TeamRoster { team, players })
    }

    /// Teams matching `filter`, ordered by id
    pub async fn list_teams(&self, filter: &TeamFilter) -> DomainResult<Vec<Team>> {
        self.stores.teams.list(filter).await
    }
}
