use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::player::{Player, PlayerDraft, PlayerFilter};

/// Repository trait for the Player aggregate
///
/// Stores players exactly as handed over; derived stats are computed by the
/// domain before a player reaches the store.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Persist a new player and return it with its assigned id
    async fn insert(&self, draft: &PlayerDraft) -> DomainResult<Player>;

    /// Find a player by its ID
    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Player>>;

    /// Find every player whose id is in `ids`; unknown ids are skipped
    async fn find_by_ids(&self, ids: &[i64]) -> DomainResult<Vec<Player>>;

    /// List players matching `filter`, ordered by id
    async fn list(&self, filter: &PlayerFilter) -> DomainResult<Vec<Player>>;

    /// Overwrite an existing player's profile, raw counters and derived stats
    async fn save(&self, player: &Player) -> DomainResult<()>;

    /// Delete a player and detach it from every roster
    async fn delete(&self, id: i64) -> DomainResult<()>;
}
