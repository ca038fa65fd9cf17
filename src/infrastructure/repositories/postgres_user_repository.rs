use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::store_error;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repositories::UserRepository;
use crate::domain::user::{NewUser, Role, User, Username};

const USER_COLUMNS: &str = "id, username, name, password_hash, role, approved, budget, created_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    name: String,
    password_hash: String,
    role: Role,
    approved: bool,
    budget: i64,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User::from_persistence(
            r.id,
            Username::from_persistence(r.username),
            r.name,
            r.password_hash,
            r.role,
            r.approved,
            r.budget,
            r.created_at,
        )
    }
}

/// PostgreSQL implementation of UserRepository
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: &NewUser) -> DomainResult<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (username, name, password_hash, role, approved, budget)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(user.username.as_str())
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(user.approved)
        .bind(user.budget)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("Failed to create user", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to find user by id", e))?;

        Ok(row.map(User::from))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to find user by username", e))?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> DomainResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY id",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to list users", e))?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn save(&self, user: &User) -> DomainResult<()> {
        let result =
            sqlx::query("UPDATE users SET name = $2, role = $3, approved = $4 WHERE id = $1")
                .bind(user.id)
                .bind(&user.name)
                .bind(user.role)
                .bind(user.approved)
                .execute(&self.pool)
                .await
                .map_err(|e| store_error("Failed to save user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user", user.id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete user", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("user", id));
        }

        Ok(())
    }
}
