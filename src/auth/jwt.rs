// JWT token creation and verification
// Handles authentication tokens with a configurable expiry

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::user::Role;

/// JWT claims structure
///
/// # Fields
/// * `sub` - Subject (user_id)
/// * `role` - Account role at issue time
/// * `exp` - Expiry time (seconds since epoch)
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// User ID (subject)
    pub sub: i64,
    /// Role of the user when the token was issued
    pub role: Role,
    /// Expiry timestamp (seconds since epoch)
    pub exp: usize,
}

/// Creates a JWT token for a user
///
/// # Arguments
/// * `user_id` - The user's ID to include in the token
/// * `role` - The user's role
/// * `secret` - The secret key for signing
/// * `ttl_hours` - Hours until the token expires
///
/// # Token Properties
/// - Signed with HS256 algorithm
/// - Contains user_id in 'sub' claim
///
/// # Example
/// ```
/// use fantasy_cricket_api::auth::jwt::create_token;
/// use fantasy_cricket_api::domain::user::Role;
///
/// let token = create_token(1, Role::User, "your-secret-key", 8).expect("valid token");
/// ```
pub fn create_token(user_id: i64, role: Role, secret: &str, ttl_hours: i64) -> Result<String, String> {
    let expiry = Utc::now() + Duration::hours(ttl_hours);
    let claims = Claims {
        sub: user_id,
        role,
        exp: expiry.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(|e| e.to_string())
}

/// Verifies and decodes a JWT token
///
/// # Returns
/// * `Ok(Claims)` - The decoded claims if token is valid
/// * `Err(String)` - If token is invalid or expired
///
/// # Example
/// ```
/// use fantasy_cricket_api::auth::jwt::{create_token, verify_token};
/// use fantasy_cricket_api::domain::user::Role;
///
/// let secret = "your-secret-key";
/// let token = create_token(7, Role::Admin, secret, 8).unwrap();
///
/// let claims = verify_token(&token, secret).expect("valid token");
/// assert_eq!(claims.sub, 7);
/// assert_eq!(claims.role, Role::Admin);
/// ```
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}
