use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::{Action, Entity};
use crate::domain::player::{Player, PlayerDraft, PlayerFilter, PlayerPatch, TournamentSummary};
use crate::domain::repositories::Stores;

use super::aggregates::AggregateRecalculator;
use super::locks::KeyedLocks;

/// Admin-facing player maintenance
///
/// Every write is followed by a recompute of all teams, since any player
/// may sit on any number of rosters.
pub struct PlayerService {
    stores: Stores,
    player_locks: KeyedLocks,
    aggregates: Arc<AggregateRecalculator>,
}

impl PlayerService {
    pub fn new(stores: Stores, aggregates: Arc<AggregateRecalculator>) -> Self {
        Self {
            stores,
            player_locks: KeyedLocks::new(),
            aggregates,
        }
    }

    pub async fn add_player(&self, draft: PlayerDraft) -> DomainResult<Player> {
        let player = self.stores.players.insert(&draft).await?;

        tracing::info!(
            player_id = player.id(),
            points = player.points(),
            value = player.value(),
            "Player added"
        );
        self.aggregates
            .propagate(Entity::Player, Action::Add, Some(player.id()))
            .await?;

        Ok(player)
    }

    /// Merges `patch` into the stored player and recomputes derived stats
    pub async fn update_player(&self, id: i64, patch: PlayerPatch) -> DomainResult<Player> {
        let player = {
            let _guard = self.player_locks.lock(id).await;
            let mut player = self.get_player(id).await?;
            player.apply(patch)?;
            self.stores.players.save(&player).await?;
            player
        };

        tracing::info!(
            player_id = id,
            points = player.points(),
            value = player.value(),
            "Player updated"
        );
        self.aggregates
            .propagate(Entity::Player, Action::Update, Some(id))
            .await?;

        Ok(player)
    }

    /// Deletes a player and detaches it from every roster
    pub async fn delete_player(&self, id: i64) -> DomainResult<()> {
        {
            let _guard = self.player_locks.lock(id).await;
            self.stores.players.delete(id).await?;
        }

        tracing::info!(player_id = id, "Player deleted");
        self.aggregates
            .propagate(Entity::Player, Action::Delete, Some(id))
            .await
    }

    pub async fn get_player(&self, id: i64) -> DomainResult<Player> {
        self.stores
            .players
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("player", id))
    }

    pub async fn list_players(&self, filter: &PlayerFilter) -> DomainResult<Vec<Player>> {
        self.stores.players.list(filter).await
    }

    pub async fn tournament_summary(&self) -> DomainResult<TournamentSummary> {
        let players = self.stores.players.list(&PlayerFilter::all()).await?;
        Ok(TournamentSummary::from_players(&players))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::player::{PlayerProfile, RawStats};
    use crate::domain::team::TeamDraft;
    use crate::domain::user::{NewUser, Role, Username};
    use crate::infrastructure::repositories::InMemoryStore;
    use crate::services::notifier::ChangeNotifier;

    fn service() -> (Stores, PlayerService) {
        let store = Arc::new(InMemoryStore::new());
        let stores = Stores::new(store.clone(), store.clone(), store);
        let aggregates = Arc::new(AggregateRecalculator::new(
            stores.clone(),
            Arc::new(KeyedLocks::new()),
            Arc::new(ChangeNotifier::new()),
        ));
        (stores.clone(), PlayerService::new(stores, aggregates))
    }

    fn draft(name: &str, total_runs: i64, wickets: i64) -> PlayerDraft {
        PlayerDraft::new(
            PlayerProfile {
                name: name.to_string(),
                university: "Eastern University".to_string(),
                category: "All-Rounder".to_string(),
            },
            RawStats {
                total_runs,
                balls_faced: 400,
                innings_played: 10,
                wickets,
                overs_bowled: if wickets > 0 { 30.0 } else { 0.0 },
                runs_conceded: if wickets > 0 { 150 } else { 0 },
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn add_player_computes_derived_stats() {
        let (_, service) = service();

        let player = service.add_player(draft("Alpha", 500, 0)).await.unwrap();

        assert_eq!(player.points(), 65);
        assert_eq!(player.value(), 700_000);
        assert!(!player.derived().bowling_strike_rate.is_defined());
    }

    #[tokio::test]
    async fn update_player_ripples_into_teams() {
        let (stores, service) = service();
        let player = service.add_player(draft("Alpha", 500, 0)).await.unwrap();
        let user = stores
            .users
            .create(&NewUser {
                username: Username::new("captaincool").unwrap(),
                name: "Captain".to_string(),
                password_hash: "hash".to_string(),
                role: Role::User,
                approved: true,
                budget: 9_000_000,
            })
            .await
            .unwrap();
        let mut team = stores
            .teams
            .insert(&TeamDraft::new(user.id, "XI").unwrap())
            .await
            .unwrap();
        team.replace_roster(std::slice::from_ref(&player), user.budget())
            .unwrap();
        stores.teams.save(&team).await.unwrap();

        let updated = service
            .update_player(
                player.id(),
                PlayerPatch {
                    total_runs: Some(1_000),
                    ..PlayerPatch::default()
                },
            )
            .await
            .unwrap();

        let team = stores.teams.find_by_id(team.id()).await.unwrap().unwrap();
        assert_eq!(team.points(), updated.points());
        assert_eq!(team.value(), updated.value());
    }

    #[tokio::test]
    async fn invalid_update_is_rejected() {
        let (_, service) = service();
        let player = service.add_player(draft("Alpha", 500, 0)).await.unwrap();

        let result = service
            .update_player(
                player.id(),
                PlayerPatch {
                    balls_faced: Some(-1),
                    ..PlayerPatch::default()
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(service.get_player(player.id()).await.unwrap(), player);
    }

    #[tokio::test]
    async fn missing_player_is_not_found() {
        let (_, service) = service();

        assert_eq!(
            service.delete_player(7).await,
            Err(DomainError::not_found("player", 7))
        );
        assert!(service
            .update_player(7, PlayerPatch::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn summary_totals_runs_and_wickets() {
        let (_, service) = service();
        service.add_player(draft("Alpha", 500, 0)).await.unwrap();
        service.add_player(draft("Bravo", 120, 6)).await.unwrap();

        let summary = service.tournament_summary().await.unwrap();

        assert_eq!(summary.overall_runs, 620);
        assert_eq!(summary.overall_wickets, 6);
        assert_eq!(summary.highest_run_scorers[0].name, "Alpha");
        assert_eq!(summary.highest_wicket_takers[0].name, "Bravo");
    }
}
