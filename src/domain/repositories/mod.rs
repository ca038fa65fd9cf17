// Repository ports (interfaces)
// Adapters live in crate::infrastructure::repositories

pub mod player_repository;
pub mod team_repository;
pub mod user_repository;

pub use player_repository::PlayerRepository;
pub use team_repository::TeamRepository;
pub use user_repository::UserRepository;

use std::sync::Arc;

/// The three aggregate stores a service works against
///
/// Every field may point at the same adapter; the in-memory store
/// implements all three traits.
#[derive(Clone)]
pub struct Stores {
    pub players: Arc<dyn PlayerRepository>,
    pub teams: Arc<dyn TeamRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Stores {
    pub fn new(
        players: Arc<dyn PlayerRepository>,
        teams: Arc<dyn TeamRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            players,
            teams,
            users,
        }
    }
}
