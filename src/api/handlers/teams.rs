use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::handlers::players::{PlayerResponse, UserPlayerResponse};
use crate::api::middleware::auth::{AdminAuth, JwtAuth};
use crate::api::state::AppState;
use crate::domain::team::{Team, TeamFilter};
use crate::services::{TeamMetadata, TeamRoster};

/// Request body for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub user_id: i64,
    pub name: String,
}

/// Request body for updating a team; points and value are not accepted
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTeamRequest {
    pub name: Option<String>,
    pub user_id: Option<i64>,
}

/// Request body for renaming one's own team
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateMyTeamRequest {
    pub name: String,
}

/// Request body for roster assignment; replaces the whole roster
#[derive(Debug, Deserialize)]
pub struct AssignPlayersRequest {
    pub player_ids: Vec<i64>,
}

/// Team summary
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub player_ids: Vec<i64>,
    pub points: i64,
    pub value: i64,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            user_id: team.user_id(),
            name: team.name().to_string(),
            player_ids: team.player_ids().iter().copied().collect(),
            points: team.points(),
            value: team.value(),
        }
    }
}

/// Team with resolved players, admin view
#[derive(Debug, Serialize)]
pub struct TeamDetailResponse {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub players: Vec<PlayerResponse>,
}

impl From<&TeamRoster> for TeamDetailResponse {
    fn from(roster: &TeamRoster) -> Self {
        Self {
            team: TeamResponse::from(&roster.team),
            players: roster.players.iter().map(PlayerResponse::from).collect(),
        }
    }
}

/// The caller's own team
#[derive(Debug, Serialize)]
pub struct MyTeamResponse {
    #[serde(flatten)]
    pub team: TeamResponse,
    pub players: Vec<UserPlayerResponse>,
}

/// One leaderboard row
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub team_id: i64,
    pub team_name: String,
    pub user_id: i64,
    pub points: i64,
    pub value: i64,
}

/// Create a team for a user
///
/// POST /teams
pub async fn create_team(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let team = state
        .services
        .teams
        .create_team(req.user_id, req.name)
        .await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// List teams, optionally filtered (`points_gt=100`)
///
/// GET /teams
pub async fn list_teams(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<TeamResponse>>, ApiError> {
    let filter = TeamFilter::from_params(&params)?;
    let teams = state.services.teams.list_teams(&filter).await?;

    Ok(Json(teams.iter().map(TeamResponse::from).collect()))
}

/// Get a team by ID
///
/// GET /teams/:id
pub async fn get_team(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<TeamDetailResponse>, ApiError> {
    let roster = state.services.teams.get_team(id).await?;
    Ok(Json(TeamDetailResponse::from(&roster)))
}

/// Rename a team or move it to another user
///
/// PUT /teams/:id
pub async fn update_team(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .services
        .teams
        .update_team_metadata(
            id,
            TeamMetadata {
                name: req.name,
                user_id: req.user_id,
            },
        )
        .await?;

    Ok(Json(TeamResponse::from(&team)))
}

/// Delete a team
///
/// DELETE /teams/:id
pub async fn delete_team(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.teams.delete_team(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Replace the caller's roster
///
/// POST /v1/teams/players/assign
pub async fn assign_players(
    JwtAuth(claims): JwtAuth,
    State(state): State<AppState>,
    Json(req): Json<AssignPlayersRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .services
        .teams
        .assign_roster(claims.sub, &req.player_ids)
        .await?;

    Ok(Json(TeamResponse::from(&team)))
}

/// The caller's team with its players
///
/// GET /v1/teams/my
pub async fn my_team(
    JwtAuth(claims): JwtAuth,
    State(state): State<AppState>,
) -> Result<Json<MyTeamResponse>, ApiError> {
    let roster = state
        .services
        .teams
        .my_team(claims.sub)
        .await?
        .ok_or_else(|| ApiError::not_found("You have no team yet"))?;

    Ok(Json(MyTeamResponse {
        team: TeamResponse::from(&roster.team),
        players: roster.players.iter().map(UserPlayerResponse::from).collect(),
    }))
}

/// Rename the caller's team
///
/// PUT /v1/teams/my
pub async fn update_my_team(
    JwtAuth(claims): JwtAuth,
    State(state): State<AppState>,
    Json(req): Json<UpdateMyTeamRequest>,
) -> Result<Json<TeamResponse>, ApiError> {
    let team = state
        .services
        .teams
        .rename_my_team(claims.sub, req.name)
        .await?;

    Ok(Json(TeamResponse::from(&team)))
}

/// Teams ranked by points
///
/// GET /v1/teams/leaderboard
pub async fn leaderboard(
    _user: JwtAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let teams = state.services.aggregates.leaderboard().await?;

    Ok(Json(
        teams
            .iter()
            .enumerate()
            .map(|(i, team)| LeaderboardEntry {
                rank: i + 1,
                team_id: team.id(),
                team_name: team.name().to_string(),
                user_id: team.user_id(),
                points: team.points(),
                value: team.value(),
            })
            .collect(),
    ))
}
