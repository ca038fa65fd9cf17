use std::cmp::Reverse;
use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::{Action, ChangeEvent, Entity};
use crate::domain::repositories::Stores;
use crate::domain::team::{Team, TeamFilter};

use super::locks::KeyedLocks;
use super::notifier::ChangeNotifier;

/// Keeps team aggregates in step with player stats and announces changes
pub struct AggregateRecalculator {
    stores: Stores,
    owner_locks: Arc<KeyedLocks>,
    notifier: Arc<ChangeNotifier>,
}

impl AggregateRecalculator {
    pub fn new(stores: Stores, owner_locks: Arc<KeyedLocks>, notifier: Arc<ChangeNotifier>) -> Self {
        Self {
            stores,
            owner_locks,
            notifier,
        }
    }

    /// Re-sums `team` from its roster's current player stats and persists
    /// the aggregates
    ///
    /// Caller must hold the owner's lock.
    pub async fn recompute_team_aggregates(&self, team: &mut Team) -> DomainResult<()> {
        let ids: Vec<i64> = team.player_ids().iter().copied().collect();
        let players = self.stores.players.find_by_ids(&ids).await?;
        team.recompute_aggregates(&players)?;

        self.stores
            .teams
            .update_aggregates(team.id(), team.points(), team.value())
            .await
    }

    /// Recomputes every team, one owner lock at a time
    ///
    /// Teams deleted while the walk is running are skipped. Returns the
    /// number of teams rewritten.
    pub async fn recompute_all_teams(&self) -> DomainResult<usize> {
        let teams = self.stores.teams.list(&TeamFilter::all()).await?;
        let mut rewritten = 0;

        for team in teams {
            if self.recompute_locked(team.id(), team.user_id()).await? {
                rewritten += 1;
            }
        }

        tracing::debug!(teams = rewritten, "Recomputed team aggregates");
        Ok(rewritten)
    }

    async fn recompute_locked(&self, team_id: i64, mut owner: i64) -> DomainResult<bool> {
        loop {
            let _guard = self.owner_locks.lock(owner).await;

            let mut team = match self.stores.teams.find_by_id(team_id).await? {
                Some(team) => team,
                None => return Ok(false),
            };

            // ownership moved before we got the lock; lock the new owner instead
            if team.user_id() != owner {
                owner = team.user_id();
                continue;
            }

            return match self.recompute_team_aggregates(&mut team).await {
                Ok(()) => Ok(true),
                Err(DomainError::NotFound { .. }) => Ok(false),
                Err(e) => Err(e),
            };
        }
    }

    /// Recomputes all teams, then announces the change
    ///
    /// The event goes out even when the recompute fails, since the
    /// triggering write is already committed.
    pub async fn propagate(&self, entity: Entity, action: Action, id: Option<i64>) -> DomainResult<()> {
        let recomputed = self.recompute_all_teams().await;
        if let Err(e) = &recomputed {
            tracing::warn!(error = %e, ?entity, ?action, "Aggregate recompute failed");
        }

        self.notify(ChangeEvent::new(entity, action, id));
        recomputed.map(|_| ())
    }

    /// Publishes `event` off the caller's path
    pub fn notify(&self, event: ChangeEvent) {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            notifier.publish(event);
        });
    }

    /// All teams ordered by points descending, ties by team id ascending
    pub async fn leaderboard(&self) -> DomainResult<Vec<Team>> {
        let mut teams = self.stores.teams.list(&TeamFilter::all()).await?;
        teams.sort_by_key(|t| (Reverse(t.points()), t.id()));
        Ok(teams)
    }
}
