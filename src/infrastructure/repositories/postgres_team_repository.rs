use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{push_filter, store_error};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::repositories::TeamRepository;
use crate::domain::team::{Team, TeamDraft, TeamFilter};

// Teams with their roster folded into an array
const TEAM_SELECT: &str = r#"
    SELECT
        t.id, t.user_id, t.name, t.points, t.value, t.created_at, t.updated_at,
        COALESCE(
            array_agg(tp.player_id ORDER BY tp.player_id)
                FILTER (WHERE tp.player_id IS NOT NULL),
            '{}'::BIGINT[]
        ) AS player_ids
    FROM teams t
    LEFT JOIN team_players tp ON tp.team_id = t.id
"#;

#[derive(Debug, FromRow)]
struct TeamRow {
    id: i64,
    user_id: i64,
    name: String,
    points: i64,
    value: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    player_ids: Vec<i64>,
}

impl From<TeamRow> for Team {
    fn from(r: TeamRow) -> Self {
        Team::from_persistence(
            r.id,
            r.user_id,
            r.name,
            r.player_ids,
            r.points,
            r.value,
            r.created_at,
            r.updated_at,
        )
    }
}

/// PostgreSQL implementation of TeamRepository
///
/// The roster lives in `team_players`; `save` rewrites it inside a single
/// transaction so a failed write leaves the previous roster in place.
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    /// Creates a new PostgresTeamRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, column: &str, id: i64) -> DomainResult<Option<Team>> {
        let mut builder = QueryBuilder::<Postgres>::new(TEAM_SELECT);
        builder.push(" WHERE t.");
        builder.push(column);
        builder.push(" = ");
        builder.push_bind(id);
        builder.push(" GROUP BY t.id");

        let row = builder
            .build_query_as::<TeamRow>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| store_error("Failed to find team", e))?;

        Ok(row.map(Team::from))
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    async fn insert(&self, draft: &TeamDraft) -> DomainResult<Team> {
        let row = sqlx::query_as::<_, TeamRow>(
            r#"
            INSERT INTO teams (user_id, name)
            VALUES ($1, $2)
            RETURNING id, user_id, name, points, value, created_at, updated_at,
                      '{}'::BIGINT[] AS player_ids
            "#,
        )
        .bind(draft.user_id())
        .bind(draft.name())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("Failed to insert team", e))?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Team>> {
        self.fetch_one_where("id", id).await
    }

    async fn find_by_user(&self, user_id: i64) -> DomainResult<Option<Team>> {
        self.fetch_one_where("user_id", user_id).await
    }

    async fn list(&self, filter: &TeamFilter) -> DomainResult<Vec<Team>> {
        let mut builder = QueryBuilder::<Postgres>::new(TEAM_SELECT);
        push_filter(&mut builder, filter, "t.");
        builder.push(" GROUP BY t.id ORDER BY t.id");

        let rows = builder
            .build_query_as::<TeamRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to list teams", e))?;

        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn save(&self, team: &Team) -> DomainResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| store_error("Failed to begin transaction", e))?;

        let result = sqlx::query(
            r#"
            UPDATE teams
            SET user_id = $2, name = $3, points = $4, value = $5, updated_at = $6
            WHERE id = $1
            "#,
        )
        .bind(team.id())
        .bind(team.user_id())
        .bind(team.name())
        .bind(team.points())
        .bind(team.value())
        .bind(team.updated_at())
        .execute(&mut *tx)
        .await
        .map_err(|e| store_error("Failed to save team", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("team", team.id()));
        }

        sqlx::query("DELETE FROM team_players WHERE team_id = $1")
            .bind(team.id())
            .execute(&mut *tx)
            .await
            .map_err(|e| store_error("Failed to clear roster", e))?;

        let player_ids: Vec<i64> = team.player_ids().iter().copied().collect();
        if !player_ids.is_empty() {
            sqlx::query(
                "INSERT INTO team_players (team_id, player_id) SELECT $1, UNNEST($2::BIGINT[])",
            )
            .bind(team.id())
            .bind(&player_ids)
            .execute(&mut *tx)
            .await
            .map_err(|e| store_error("Failed to write roster", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| store_error("Failed to commit team", e))?;

        Ok(())
    }

    async fn update_aggregates(&self, id: i64, points: i64, value: i64) -> DomainResult<()> {
        let result = sqlx::query(
            "UPDATE teams SET points = $2, value = $3 WHERE id = $1",
        )
        .bind(id)
        .bind(points)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to update team aggregates", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("team", id));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete team", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("team", id));
        }

        Ok(())
    }
}
