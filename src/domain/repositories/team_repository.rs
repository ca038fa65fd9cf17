use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::team::{Team, TeamDraft, TeamFilter};

/// Repository trait for the Team aggregate
///
/// Defines the contract for persisting and retrieving teams.
/// Implementations should handle database-specific details.
#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Persist a new, empty team
    ///
    /// Fails with `Conflict` when the owner already has a team and with
    /// `NotFound` when the owner does not exist.
    async fn insert(&self, draft: &TeamDraft) -> DomainResult<Team>;

    /// Find a team by its ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Team>>;

    /// Find the team owned by `user_id`
    async fn find_by_user(&self, user_id: i64) -> DomainResult<Option<Team>>;

    /// List teams matching `filter`, ordered by id
    async fn list(&self, filter: &TeamFilter) -> DomainResult<Vec<Team>>;

    /// Overwrite name, owner, roster and aggregates in one atomic write
    async fn save(&self, team: &Team) -> DomainResult<()>;

    /// Write only the aggregate columns of a team
    async fn update_aggregates(&self, id: i64, points: i64, value: i64) -> DomainResult<()>;

    /// Delete a team by ID
    async fn delete(&self, id: i64) -> DomainResult<()>;
}
