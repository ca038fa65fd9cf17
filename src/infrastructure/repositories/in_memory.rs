use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::player::{Player, PlayerDraft, PlayerFilter};
use crate::domain::repositories::{PlayerRepository, TeamRepository, UserRepository};
use crate::domain::team::{Team, TeamDraft, TeamFilter};
use crate::domain::user::{NewUser, User};

#[derive(Default)]
struct State {
    players: BTreeMap<i64, Player>,
    teams: BTreeMap<i64, Team>,
    users: BTreeMap<i64, User>,
    next_player_id: i64,
    next_team_id: i64,
    next_user_id: i64,
}

impl State {
    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }

    fn team_of(&self, user_id: i64) -> Option<&Team> {
        self.teams.values().find(|t| t.user_id() == user_id)
    }
}

/// In-process store implementing every repository trait
///
/// Enforces the same relational constraints as the PostgreSQL schema
/// (one team per user, rosters reference existing players, cascades on
/// delete) so services behave identically against either backend.
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryStore {
    async fn insert(&self, draft: &PlayerDraft) -> DomainResult<Player> {
        let mut state = self.state.write().await;
        let id = State::next_id(&mut state.next_player_id);
        let player = Player::from_draft(id, draft.clone());
        state.players.insert(id, player.clone());
        Ok(player)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Player>> {
        Ok(self.state.read().await.players.get(&id).cloned())
    }

    async fn find_by_ids(&self, ids: &[i64]) -> DomainResult<Vec<Player>> {
        let state = self.state.read().await;
        Ok(state
            .players
            .values()
            .filter(|p| ids.contains(&p.id()))
            .cloned()
            .collect())
    }

    async fn list(&self, filter: &PlayerFilter) -> DomainResult<Vec<Player>> {
        let state = self.state.read().await;
        Ok(state
            .players
            .values()
            .filter(|p| filter.matches(*p))
            .cloned()
            .collect())
    }

    async fn save(&self, player: &Player) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let slot = state
            .players
            .get_mut(&player.id())
            .ok_or_else(|| DomainError::not_found("player", player.id()))?;
        *slot = player.clone();
        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut state = self.state.write().await;
        if state.players.remove(&id).is_none() {
            return Err(DomainError::not_found("player", id));
        }
        for team in state.teams.values_mut() {
            team.detach(id);
        }
        Ok(())
    }
}

#[async_trait]
impl TeamRepository for InMemoryStore {
    async fn insert(&self, draft: &TeamDraft) -> DomainResult<Team> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&draft.user_id()) {
            return Err(DomainError::not_found("user", draft.user_id()));
        }
        if state.team_of(draft.user_id()).is_some() {
            return Err(DomainError::Conflict(format!(
                "user {} already has a team",
                draft.user_id()
            )));
        }

        let id = State::next_id(&mut state.next_team_id);
        let team = Team::from_draft(id, draft.clone());
        state.teams.insert(id, team.clone());
        Ok(team)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Team>> {
        Ok(self.state.read().await.teams.get(&id).cloned())
    }

    async fn find_by_user(&self, user_id: i64) -> DomainResult<Option<Team>> {
        Ok(self.state.read().await.team_of(user_id).cloned())
    }

    async fn list(&self, filter: &TeamFilter) -> DomainResult<Vec<Team>> {
        let state = self.state.read().await;
        Ok(state
            .teams
            .values()
            .filter(|t| filter.matches(*t))
            .cloned()
            .collect())
    }

    async fn save(&self, team: &Team) -> DomainResult<()> {
        let mut state = self.state.write().await;
        if !state.teams.contains_key(&team.id()) {
            return Err(DomainError::not_found("team", team.id()));
        }
        if !state.users.contains_key(&team.user_id()) {
            return Err(DomainError::not_found("user", team.user_id()));
        }
        if let Some(other) = state.team_of(team.user_id()) {
            if other.id() != team.id() {
                return Err(DomainError::Conflict(format!(
                    "user {} already has a team",
                    team.user_id()
                )));
            }
        }
        if let Some(missing) = team
            .player_ids()
            .iter()
            .find(|id| !state.players.contains_key(id))
        {
            return Err(DomainError::not_found("player", *missing));
        }

        state.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn update_aggregates(&self, id: i64, points: i64, value: i64) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let team = state
            .teams
            .get_mut(&id)
            .ok_or_else(|| DomainError::not_found("team", id))?;
        team.store_aggregates(points, value);
        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut state = self.state.write().await;
        state
            .teams
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("team", id))
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> DomainResult<User> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.username == user.username)
        {
            return Err(DomainError::Conflict(format!(
                "username {} is already taken",
                user.username
            )));
        }

        let id = State::next_id(&mut state.next_user_id);
        let created = User::from_new(id, user.clone());
        state.users.insert(id, created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.username.as_str() == username)
            .cloned())
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        Ok(self.state.read().await.users.values().cloned().collect())
    }

    async fn save(&self, user: &User) -> DomainResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .users
            .get_mut(&user.id)
            .ok_or_else(|| DomainError::not_found("user", user.id))?;
        stored.name = user.name.clone();
        stored.role = user.role;
        stored.approved = user.approved;
        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let mut state = self.state.write().await;
        if state.users.remove(&id).is_none() {
            return Err(DomainError::not_found("user", id));
        }
        state.teams.retain(|_, team| team.user_id() != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::{Comparison, FilterValue};
    use crate::domain::player::{PlayerField, PlayerProfile, RawStats};
    use crate::domain::user::{Role, Username};

    fn draft(name: &str, total_runs: i64) -> PlayerDraft {
        PlayerDraft::new(
            PlayerProfile {
                name: name.to_string(),
                university: "University of Moratuwa".to_string(),
                category: "Batsman".to_string(),
            },
            RawStats {
                total_runs,
                balls_faced: 100,
                innings_played: 5,
                ..RawStats::default()
            },
        )
        .unwrap()
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: Username::new(username).unwrap(),
            name: "Test User".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            approved: true,
            budget: 9_000_000,
        }
    }

    #[tokio::test]
    async fn player_ids_are_sequential() {
        let store = InMemoryStore::new();
        let a = PlayerRepository::insert(&store, &draft("Alpha", 10)).await.unwrap();
        let b = PlayerRepository::insert(&store, &draft("Bravo", 20)).await.unwrap();

        assert_eq!(a.id(), 1);
        assert_eq!(b.id(), 2);
    }

    #[tokio::test]
    async fn list_applies_filter() {
        let store = InMemoryStore::new();
        PlayerRepository::insert(&store, &draft("Alpha", 10)).await.unwrap();
        PlayerRepository::insert(&store, &draft("Bravo", 300)).await.unwrap();

        let filter = PlayerFilter::all()
            .and(PlayerField::TotalRuns, Comparison::Gt, FilterValue::Int(100))
            .unwrap();
        let players = PlayerRepository::list(&store, &filter).await.unwrap();

        assert_eq!(players.len(), 1);
        assert_eq!(players[0].name(), "Bravo");
    }

    #[tokio::test]
    async fn second_team_for_user_conflicts() {
        let store = InMemoryStore::new();
        let user = store.create(&new_user("captaincool")).await.unwrap();

        TeamRepository::insert(&store, &TeamDraft::new(user.id, "First").unwrap())
            .await
            .unwrap();
        let second =
            TeamRepository::insert(&store, &TeamDraft::new(user.id, "Second").unwrap()).await;

        assert!(matches!(second, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn team_for_unknown_user_is_not_found() {
        let store = InMemoryStore::new();
        let result = TeamRepository::insert(&store, &TeamDraft::new(42, "Ghosts").unwrap()).await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "user", .. })));
    }

    #[tokio::test]
    async fn deleting_player_detaches_from_rosters() {
        let store = InMemoryStore::new();
        let user = store.create(&new_user("captaincool")).await.unwrap();
        let player = PlayerRepository::insert(&store, &draft("Alpha", 10)).await.unwrap();
        let mut team = TeamRepository::insert(&store, &TeamDraft::new(user.id, "XI").unwrap())
            .await
            .unwrap();
        team.replace_roster(std::slice::from_ref(&player), user.budget())
            .unwrap();
        TeamRepository::save(&store, &team).await.unwrap();

        PlayerRepository::delete(&store, player.id()).await.unwrap();

        let team = TeamRepository::find_by_id(&store, team.id())
            .await
            .unwrap()
            .unwrap();
        assert!(team.player_ids().is_empty());
    }

    #[tokio::test]
    async fn saving_roster_with_unknown_player_fails() {
        let store = InMemoryStore::new();
        let user = store.create(&new_user("captaincool")).await.unwrap();
        let player = PlayerRepository::insert(&store, &draft("Alpha", 10)).await.unwrap();
        let mut team = TeamRepository::insert(&store, &TeamDraft::new(user.id, "XI").unwrap())
            .await
            .unwrap();
        team.replace_roster(std::slice::from_ref(&player), user.budget())
            .unwrap();
        PlayerRepository::delete(&store, player.id()).await.unwrap();

        let result = TeamRepository::save(&store, &team).await;

        assert!(matches!(result, Err(DomainError::NotFound { entity: "player", .. })));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = InMemoryStore::new();
        store.create(&new_user("captaincool")).await.unwrap();

        let result = store.create(&new_user("captaincool")).await;

        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_team() {
        let store = InMemoryStore::new();
        let user = store.create(&new_user("captaincool")).await.unwrap();
        TeamRepository::insert(&store, &TeamDraft::new(user.id, "XI").unwrap())
            .await
            .unwrap();

        UserRepository::delete(&store, user.id).await.unwrap();

        assert!(store.find_by_user(user.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_user_keeps_budget() {
        let store = InMemoryStore::new();
        let mut user = store.create(&new_user("captaincool")).await.unwrap();
        user.name = "Renamed".to_string();
        user.approved = false;

        UserRepository::save(&store, &user).await.unwrap();

        let stored = UserRepository::find_by_id(&store, user.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.name, "Renamed");
        assert!(!stored.approved);
        assert_eq!(stored.budget(), 9_000_000);
    }
}
