use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::api::state::AppState;
use crate::auth::jwt::{verify_token, Claims};
use crate::domain::user::Role;

/// JWT authentication extractor for protected routes
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(claims): JwtAuth,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello user {}", claims.sub))
/// }
/// ```
pub struct JwtAuth(pub Claims);

/// Like [`JwtAuth`] but only admits admins (403 otherwise)
pub struct AdminAuth(pub Claims);

fn bearer_claims(parts: &Parts, secret: &str) -> Result<Claims, ApiError> {
    // Extract the authorization header
    let auth_header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

    // Extract bearer token
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>"))?;

    verify_token(token, secret).map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))
}

#[async_trait]
impl<S> FromRequestParts<S> for JwtAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        bearer_claims(parts, &state.config.jwt_secret).map(JwtAuth)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let claims = bearer_claims(parts, &state.config.jwt_secret)?;

        if claims.role != Role::Admin {
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(AdminAuth(claims))
    }
}
