use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::auth::JwtAuth;
use crate::api::state::AppState;
use crate::auth::jwt::create_token;
use crate::auth::password::{hash_password, verify_password};
use crate::domain::user::{validate_password, Role, User};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub name: String,
    pub password: String,
}

/// Response from successful registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: i64,
    pub message: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub role: Role,
}

/// Claims echoed back by the validate endpoint
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub user_id: i64,
    pub role: Role,
}

/// Validates password strength and hashes it with the configured cost
pub(crate) fn hash_new_password(password: &str, cost: u32) -> Result<String, ApiError> {
    validate_password(password)?;
    hash_password(password, cost)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to hash password: {}", e)))
}

/// Register a new user
///
/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let password_hash = hash_new_password(&req.password, state.config.bcrypt_cost)?;

    let user = state
        .services
        .accounts
        .register(&req.username, req.name, password_hash)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id: user.id,
            message: "User registered successfully".to_string(),
        }),
    ))
}

async fn authenticate(state: &AppState, req: &LoginRequest) -> Result<User, ApiError> {
    let user = state
        .services
        .accounts
        .find_by_username(&req.username)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    // Verify password
    let valid = verify_password(&req.password, &user.password_hash).map_err(|e| {
        ApiError::internal_server_error(format!("Password verification failed: {}", e))
    })?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.approved {
        return Err(ApiError::unauthorized("Account is not approved"));
    }

    Ok(user)
}

fn issue_token(state: &AppState, user: &User) -> Result<Json<LoginResponse>, ApiError> {
    let token = create_token(
        user.id,
        user.role,
        &state.config.jwt_secret,
        state.config.jwt_ttl_hours,
    )
    .map_err(|e| ApiError::internal_server_error(format!("Failed to create token: {}", e)))?;

    tracing::info!(user_id = user.id, role = %user.role, "Token issued");

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}

/// Login with username and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = authenticate(&state, &req).await?;
    issue_token(&state, &user)
}

/// Login restricted to admins
///
/// POST /auth/admin/login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = authenticate(&state, &req).await?;

    if !user.is_admin() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    issue_token(&state, &user)
}

/// Checks the bearer token
///
/// GET /auth/validate
pub async fn validate(JwtAuth(claims): JwtAuth) -> Json<ValidateResponse> {
    Json(ValidateResponse {
        user_id: claims.sub,
        role: claims.role,
    })
}

/// Health check endpoint
///
/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}
