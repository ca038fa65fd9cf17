use std::sync::Arc;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::events::{Action, ChangeEvent, Entity};
use crate::domain::repositories::Stores;
use crate::domain::team::Team;
use crate::domain::user::{NewUser, Role, User, Username};

use super::aggregates::AggregateRecalculator;

/// Fields an admin may change on an account; the budget is not one of them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub approved: Option<bool>,
}

/// An account with its team, if any
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user: User,
    pub team: Option<Team>,
}

impl UserProfile {
    /// Budget left after the current roster's value
    pub fn available_budget(&self) -> i64 {
        self.user.budget() - self.team.as_ref().map_or(0, Team::value)
    }
}

/// Account registration and administration
///
/// Takes password hashes, never plaintext; hashing happens at the HTTP edge.
pub struct AccountService {
    stores: Stores,
    aggregates: Arc<AggregateRecalculator>,
    default_budget: i64,
}

impl AccountService {
    pub fn new(stores: Stores, aggregates: Arc<AggregateRecalculator>, default_budget: i64) -> Self {
        Self {
            stores,
            aggregates,
            default_budget,
        }
    }

    /// Self-service sign-up: an approved regular user with the default budget
    pub async fn register(
        &self,
        username: &str,
        name: String,
        password_hash: String,
    ) -> DomainResult<User> {
        self.create_user(username, name, password_hash, Role::User, true)
            .await
    }

    /// Creates an account with an explicit role and approval
    pub async fn create_user(
        &self,
        username: &str,
        name: String,
        password_hash: String,
        role: Role,
        approved: bool,
    ) -> DomainResult<User> {
        let user = self
            .stores
            .users
            .create(&NewUser {
                username: Username::new(username)?,
                name,
                password_hash,
                role,
                approved,
                budget: self.default_budget,
            })
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User created");
        self.aggregates
            .notify(ChangeEvent::new(Entity::User, Action::Add, Some(user.id)));

        Ok(user)
    }

    /// Creates the configured admin unless the username is already taken
    pub async fn bootstrap_admin(&self, username: &str, password_hash: String) -> DomainResult<()> {
        if self.stores.users.find_by_username(username).await?.is_some() {
            tracing::debug!(username, "Bootstrap admin already present");
            return Ok(());
        }

        self.create_user(username, "Administrator".to_string(), password_hash, Role::Admin, true)
            .await?;
        tracing::info!(username, "Bootstrap admin created");
        Ok(())
    }

    pub async fn get_user(&self, id: i64) -> DomainResult<User> {
        self.stores
            .users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("user", id))
    }

    pub async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        self.stores.users.find_by_username(username).await
    }

    pub async fn list_users(&self) -> DomainResult<Vec<User>> {
        self.stores.users.list().await
    }

    pub async fn update_user(&self, id: i64, update: UserUpdate) -> DomainResult<User> {
        let mut user = self.get_user(id).await?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
            user.name = name;
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(approved) = update.approved {
            user.approved = approved;
        }

        self.stores.users.save(&user).await?;

        tracing::info!(user_id = id, "User updated");
        self.aggregates
            .notify(ChangeEvent::new(Entity::User, Action::Update, Some(id)));

        Ok(user)
    }

    /// Deletes an account; its team goes with it
    pub async fn delete_user(&self, id: i64) -> DomainResult<()> {
        self.stores.users.delete(id).await?;

        tracing::info!(user_id = id, "User deleted");
        self.aggregates
            .propagate(Entity::User, Action::Delete, Some(id))
            .await
    }

    pub async fn profile(&self, user_id: i64) -> DomainResult<UserProfile> {
        let user = self.get_user(user_id).await?;
        let team = self.stores.teams.find_by_user(user_id).await?;
        Ok(UserProfile { user, team })
    }
}
