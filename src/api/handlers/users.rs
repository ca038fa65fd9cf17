use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::handlers::auth::hash_new_password;
use crate::api::middleware::auth::{AdminAuth, JwtAuth};
use crate::api::state::AppState;
use crate::domain::user::{Role, User};
use crate::services::UserUpdate;

/// Request body for an admin-created account
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub name: String,
    pub password: String,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_approved")]
    pub approved: bool,
}

fn default_role() -> Role {
    Role::User
}

fn default_approved() -> bool {
    true
}

/// Request body for updating an account; the budget is not accepted
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub role: Option<Role>,
    pub approved: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub approved: bool,
    pub budget: i64,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.to_string(),
            name: user.name.clone(),
            role: user.role,
            approved: user.approved,
            budget: user.budget(),
            created_at: user.created_at,
        }
    }
}

/// The caller's own profile
#[derive(Debug, Serialize)]
pub struct MyProfileResponse {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub role: Role,
    pub budget: i64,
    pub available_budget: i64,
    pub team_name: Option<String>,
}

/// Create an account
///
/// POST /users
pub async fn create_user(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    let password_hash = hash_new_password(&req.password, state.config.bcrypt_cost)?;

    let user = state
        .services
        .accounts
        .create_user(&req.username, req.name, password_hash, req.role, req.approved)
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// List accounts
///
/// GET /users
pub async fn list_users(
    _admin: AdminAuth,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.services.accounts.list_users().await?;
    Ok(Json(users.iter().map(UserResponse::from).collect()))
}

/// Get an account by ID
///
/// GET /users/:id
pub async fn get_user(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.services.accounts.get_user(id).await?;
    Ok(Json(UserResponse::from(&user)))
}

/// Update name, role or approval
///
/// PUT /users/:id
pub async fn update_user(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .services
        .accounts
        .update_user(
            id,
            UserUpdate {
                name: req.name,
                role: req.role,
                approved: req.approved,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(&user)))
}

/// Delete an account and its team
///
/// DELETE /users/:id
pub async fn delete_user(
    _admin: AdminAuth,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.services.accounts.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// The caller's profile with remaining budget
///
/// GET /v1/users/my
pub async fn my_profile(
    JwtAuth(claims): JwtAuth,
    State(state): State<AppState>,
) -> Result<Json<MyProfileResponse>, ApiError> {
    let profile = state.services.accounts.profile(claims.sub).await?;
    let available_budget = profile.available_budget();

    Ok(Json(MyProfileResponse {
        id: profile.user.id,
        username: profile.user.username.to_string(),
        name: profile.user.name.clone(),
        role: profile.user.role,
        budget: profile.user.budget(),
        available_budget,
        team_name: profile.team.as_ref().map(|t| t.name().to_string()),
    }))
}
