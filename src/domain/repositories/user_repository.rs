use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::user::{NewUser, User};

/// Repository trait for User aggregate
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user; a taken username is a `Conflict`
    async fn create(&self, user: &NewUser) -> DomainResult<User>;

    /// Find a user by ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>>;

    /// Find a user by username
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>>;

    /// List all users ordered by id
    async fn list(&self) -> DomainResult<Vec<User>>;

    /// Update name, role and approval; the budget is never written
    async fn save(&self, user: &User) -> DomainResult<()>;

    /// Delete a user together with their team
    async fn delete(&self, id: i64) -> DomainResult<()>;
}
