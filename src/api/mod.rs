// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use handlers::{auth, players, teams, users, ws};
pub use state::AppState;

/// Builds the full router over shared state
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health check
        .route("/health", get(auth::health_check))
        // Auth routes
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/admin/login", post(auth::admin_login))
        .route("/auth/validate", get(auth::validate))
        // Change feed
        .route("/ws", get(ws::ws_handler))
        // Player routes (admin)
        .route(
            "/players",
            post(players::create_player).get(players::list_players),
        )
        .route(
            "/players/:id",
            get(players::get_player)
                .put(players::update_player)
                .delete(players::delete_player),
        )
        // Player routes (user)
        .route("/v1/players", get(players::list_players_for_user))
        .route("/v1/players/:id", get(players::get_player_for_user))
        .route("/tournament/summary", get(players::tournament_summary))
        // Team routes (admin)
        .route("/teams", post(teams::create_team).get(teams::list_teams))
        .route(
            "/teams/:id",
            get(teams::get_team)
                .put(teams::update_team)
                .delete(teams::delete_team),
        )
        // Team routes (user)
        .route("/v1/teams/players/assign", post(teams::assign_players))
        .route("/v1/teams/my", get(teams::my_team).put(teams::update_my_team))
        .route("/v1/teams/leaderboard", get(teams::leaderboard))
        // User routes (admin)
        .route("/users", post(users::create_user).get(users::list_users))
        .route(
            "/users/:id",
            get(users::get_user)
                .put(users::update_user)
                .delete(users::delete_user),
        )
        // User routes (self)
        .route("/v1/users/my", get(users::my_profile))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Shared state
        .with_state(state)
}
