use chrono::{DateTime, Utc};

use super::value_objects::{Role, Username};

/// Account data for a user that has not been persisted yet
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub approved: bool,
    pub budget: i64,
}

/// A registered account
///
/// The budget is fixed once assigned; repositories never update it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: Username,
    pub name: String,
    pub password_hash: String,
    pub role: Role,
    pub approved: bool,
    budget: i64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn budget(&self) -> i64 {
        self.budget
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Materialises a stored account under its assigned id
    pub fn from_new(id: i64, new: NewUser) -> Self {
        Self {
            id,
            username: new.username,
            name: new.name,
            password_hash: new.password_hash,
            role: new.role,
            approved: new.approved,
            budget: new.budget,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a User from persistence layer data
    #[allow(clippy::too_many_arguments)]
    pub fn from_persistence(
        id: i64,
        username: Username,
        name: String,
        password_hash: String,
        role: Role,
        approved: bool,
        budget: i64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            username,
            name,
            password_hash,
            role,
            approved,
            budget,
            created_at,
        }
    }
}
