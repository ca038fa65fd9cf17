// Application services
// Orchestrate domain rules over the repository ports

pub mod account_service;
pub mod aggregates;
pub mod locks;
pub mod notifier;
pub mod player_service;
pub mod team_composition;

pub use account_service::{AccountService, UserProfile, UserUpdate};
pub use aggregates::AggregateRecalculator;
pub use locks::KeyedLocks;
pub use notifier::{ChangeNotifier, Subscription};
pub use player_service::PlayerService;
pub use team_composition::{TeamComposition, TeamMetadata, TeamRoster};

use std::sync::Arc;

use crate::domain::repositories::Stores;

/// All services wired over one set of stores
///
/// Team composition and aggregate recompute share a single owner-lock
/// registry so a recompute never interleaves with a roster write.
#[derive(Clone)]
pub struct Services {
    pub players: Arc<PlayerService>,
    pub teams: Arc<TeamComposition>,
    pub accounts: Arc<AccountService>,
    pub aggregates: Arc<AggregateRecalculator>,
    pub notifier: Arc<ChangeNotifier>,
}

impl Services {
    pub fn new(stores: Stores, default_budget: i64) -> Self {
        let owner_locks = Arc::new(KeyedLocks::new());
        let notifier = Arc::new(ChangeNotifier::new());
        let aggregates = Arc::new(AggregateRecalculator::new(
            stores.clone(),
            Arc::clone(&owner_locks),
            Arc::clone(&notifier),
        ));

        Self {
            players: Arc::new(PlayerService::new(stores.clone(), Arc::clone(&aggregates))),
            teams: Arc::new(TeamComposition::new(
                stores.clone(),
                owner_locks,
                Arc::clone(&aggregates),
            )),
            accounts: Arc::new(AccountService::new(
                stores,
                Arc::clone(&aggregates),
                default_budget,
            )),
            aggregates,
            notifier,
        }
    }
}
