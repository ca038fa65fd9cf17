use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::auth::{AdminAuth, JwtAuth};
use crate::api::state::AppState;
use crate::domain::player::{
    Player, PlayerDraft, PlayerFilter, PlayerPatch, PlayerProfile, Rate, RawStats,
    TournamentSummary,
};

/// Request body for adding a player
///
/// Derived fields are computed server-side; supplying one is rejected.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePlayerRequest {
    pub name: String,
    #[serde(default)]
    pub university: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub total_runs: i64,
    #[serde(default)]
    pub balls_faced: i64,
    #[serde(default)]
    pub innings_played: i64,
    #[serde(default)]
    pub wickets: i64,
    #[serde(default)]
    pub overs_bowled: f64,
    #[serde(default)]
    pub runs_conceded: i64,
}

/// Request body for a partial player update
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatePlayerRequest {
    pub name: Option<String>,
    pub university: Option<String>,
    pub category: Option<String>,
    pub total_runs: Option<i64>,
    pub balls_faced: Option<i64>,
    pub innings_played: Option<i64>,
    pub wickets: Option<i64>,
    pub overs_bowled: Option<f64>,
    pub runs_conceded: Option<i64>,
}

impl From<UpdatePlayerRequest> for PlayerPatch {
    fn from(req: UpdatePlayerRequest) -> Self {
        PlayerPatch {
            name: req.name,
            university: req.university,
            category: req.category,
            total_runs: req.total_runs,
            balls_faced: req.balls_faced,
            innings_played: req.innings_played,
            wickets: req.wickets,
            overs_bowled: req.overs_bowled,
            runs_conceded: req.runs_conceded,
        }
    }
}

/// Full player view for admins
#[derive(Debug, Serialize)]
pub struct PlayerResponse {
    pub id: i64,
    pub name: String,
    pub university: String,
    pub category: String,
    #[serde(flatten)]
    pub raw: RawStats,
    pub batting_strike_rate: Rate,
    pub batting_average: Rate,
    pub bowling_strike_rate: Rate,
    pub economy_rate: Rate,
    pub points: i64,
    pub value: i64,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        let profile = player.profile();
        let derived = player.derived();
        Self {
            id: player.id(),
            name: profile.name.clone(),
            university: profile.university.clone(),
            category: profile.category.clone(),
            raw: *player.raw(),
            batting_strike_rate: derived.batting_strike_rate,
            batting_average: derived.batting_average,
            bowling_strike_rate: derived.bowling_strike_rate,
            economy_rate: derived.economy_rate,
            points: derived.points,
            value: derived.value,
        }
    }
}

/// Player view for regular users: points stay hidden
#[derive(Debug, Serialize)]
pub struct UserPlayerResponse {
    pub id: i64,
    pub name: String,
    pub university: String,
    pub category: String,
    #[serde(flatten)]
    pub raw: RawStats,
    pub batting_strike_rate: Rate,
    pub batting_average: Rate,
    pub bowling_strike_rate: Rate,
    pub economy_rate: Rate,
    pub value: i64,
}

impl From<&Player> for UserPlayerResponse {
    fn from(player: &Player) -> Self {
        let full = PlayerResponse::from(player);
        Self {
            id: full.id,
            name: full.name,
            university: full.university,
            category: full.category,
            raw: full.raw,
            batting_strike_rate: full.batting_strike_rate,
            batting_average: full.batting_average,
            bowling_strike_rate: full.bowling_strike_rate,
            economy_rate: full.economy_rate,
            value: full.value,
        }
    }
}

/// Add a player
///
/// POST /players
pub async fn create_player(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<CreatePlayerRequest>,
) -> Result<(StatusCode, Json<PlayerResponse>), ApiError> {
    let draft = PlayerDraft::new(
        PlayerProfile {
            name: req.name,
            university: req.university,
            category: req.category,
        },
        RawStats {
            total_runs: req.total_runs,
            balls_faced: req.balls_faced,
            innings_played: req.innings_played,
            wickets: req.wickets,
            overs_bowled: req.overs_bowled,
            runs_conceded: req.runs_conceded,
        },
    )?;

    let player = state.services.players.add_player(draft).await?;

    Ok((StatusCode::CREATED, Json(PlayerResponse::from(&player))))
}

/// List players, optionally filtered (`total_runs_gt=100&category=Batsman`)
///
/// GET /players
pub async fn list_players(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<PlayerResponse>>, ApiError> {
    let filter = PlayerFilter::from_params(&params)?;
    let players = state.services.players.list_players(&filter).await?;

    Ok(Json(players.iter().map(PlayerResponse::from).collect()))
}

/// Get a player by ID
///
/// GET /players/:id
pub async fn get_player(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = state.services.players.get_player(id).await?;
    Ok(Json(PlayerResponse::from(&player)))
}

/// Update a player's profile or raw counters
///
/// PUT /players/:id
pub async fn update_player(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePlayerRequest>,
) -> Result<Json<PlayerResponse>, ApiError> {
    let player = state
        .services
        .players
        .update_player(id, req.into())
        .await?;

    Ok(Json(PlayerResponse::from(&player)))
}

/// Delete a player
///
/// DELETE /players/:id
pub async fn delete_player(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.players.delete_player(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List players for team building
///
/// GET /v1/players
pub async fn list_players_for_user(
    _user: JwtAuth,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<UserPlayerResponse>>, ApiError> {
    if params.keys().any(|k| k.starts_with("points")) {
        return Err(ApiError::bad_request("unknown filter: points"));
    }

    let filter = PlayerFilter::from_params(&params)?;
    let players = state.services.players.list_players(&filter).await?;

    Ok(Json(players.iter().map(UserPlayerResponse::from).collect()))
}

/// Get a player for team building
///
/// GET /v1/players/:id
pub async fn get_player_for_user(
    _user: JwtAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserPlayerResponse>, ApiError> {
    let player = state.services.players.get_player(id).await?;
    Ok(Json(UserPlayerResponse::from(&player)))
}

/// Tournament totals and leaders
///
/// GET /tournament/summary
pub async fn tournament_summary(
    _user: JwtAuth,
    State(state): State<AppState>,
) -> Result<Json<TournamentSummary>, ApiError> {
    Ok(Json(state.services.players.tournament_summary().await?))
}
