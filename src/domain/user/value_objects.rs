use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::{DomainError, DomainResult};

const FORBIDDEN_USERNAME_CHARS: &str = "!@#$%^&*()_+-=[]{};':\",./<>?`~ ";
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\",./<>?`~";
const MIN_LENGTH: usize = 8;

/// Role of an account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Curates players and manages accounts
    Admin,
    /// Builds a fantasy team
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::User => write!(f, "user"),
        }
    }
}

/// Username value object
///
/// # Invariants
/// - At least 8 characters long
/// - No punctuation or whitespace
/// - Is immutable after construction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Creates a new Username value object
    ///
    /// # Example
    /// ```
    /// use fantasy_cricket_api::domain::user::value_objects::Username;
    ///
    /// let username = Username::new("spiritx2025").expect("valid username");
    /// assert_eq!(username.as_str(), "spiritx2025");
    /// assert!(Username::new("short").is_err());
    /// ```
    pub fn new(username: impl Into<String>) -> DomainResult<Self> {
        let username = username.into();

        if username.chars().count() < MIN_LENGTH {
            return Err(DomainError::validation(format!(
                "username must be at least {} characters long",
                MIN_LENGTH
            )));
        }

        if username
            .chars()
            .any(|c| FORBIDDEN_USERNAME_CHARS.contains(c) || c.is_whitespace())
        {
            return Err(DomainError::validation(
                "username contains invalid characters",
            ));
        }

        Ok(Username(username))
    }

    /// Wraps a stored username without re-validating it
    ///
    /// Accounts seeded before the rules tightened may not satisfy them.
    pub fn from_persistence(username: String) -> Self {
        Username(username)
    }

    /// Returns the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Checks password strength before hashing
///
/// # Validation Rules
/// - At least 8 characters
/// - Contains a lowercase letter, an uppercase letter, and a special character
pub fn validate_password(password: &str) -> DomainResult<()> {
    if password.chars().count() < MIN_LENGTH {
        return Err(DomainError::validation(format!(
            "password must be at least {} characters long",
            MIN_LENGTH
        )));
    }

    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    if !has_lower || !has_upper || !has_special {
        return Err(DomainError::validation(
            "password must contain at least one lowercase letter, one uppercase letter, and one special character",
        ));
    }

    Ok(())
}
