use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

use super::{push_filter, store_error};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::player::{
    Player, PlayerDraft, PlayerFilter, PlayerProfile, Rate, RawStats,
};
use crate::domain::repositories::PlayerRepository;

const PLAYER_COLUMNS: &str = "id, name, university, category, total_runs, balls_faced, \
     innings_played, wickets, overs_bowled, runs_conceded, created_at, updated_at";

#[derive(Debug, FromRow)]
struct PlayerRow {
    id: i64,
    name: String,
    university: String,
    category: String,
    total_runs: i64,
    balls_faced: i64,
    innings_played: i64,
    wickets: i64,
    overs_bowled: f64,
    runs_conceded: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PlayerRow> for Player {
    type Error = DomainError;

    fn try_from(r: PlayerRow) -> DomainResult<Self> {
        Player::from_persistence(
            r.id,
            PlayerProfile {
                name: r.name,
                university: r.university,
                category: r.category,
            },
            RawStats {
                total_runs: r.total_runs,
                balls_faced: r.balls_faced,
                innings_played: r.innings_played,
                wickets: r.wickets,
                overs_bowled: r.overs_bowled,
                runs_conceded: r.runs_conceded,
            },
            r.created_at,
            r.updated_at,
        )
    }
}

/// Stored form of a rate; NULL when undefined
fn rate_column(rate: Rate) -> Option<Decimal> {
    rate.value()
        .and_then(Decimal::from_f64_retain)
        .map(|d| d.round_dp(2))
}

/// PostgreSQL implementation of PlayerRepository
///
/// Derived columns are written on every insert/update so that SQL readers
/// see them, but reads recompute them from the raw counters.
pub struct PostgresPlayerRepository {
    pool: PgPool,
}

impl PostgresPlayerRepository {
    /// Creates a new PostgresPlayerRepository
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlayerRepository for PostgresPlayerRepository {
    async fn insert(&self, draft: &PlayerDraft) -> DomainResult<Player> {
        let profile = draft.profile();
        let raw = draft.raw();
        let derived = draft.derived();

        let row = sqlx::query_as::<_, PlayerRow>(&format!(
            r#"
            INSERT INTO players (
                name, university, category,
                total_runs, balls_faced, innings_played,
                wickets, overs_bowled, runs_conceded,
                batting_strike_rate, batting_average, bowling_strike_rate, economy_rate,
                points, value
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            PLAYER_COLUMNS
        ))
        .bind(&profile.name)
        .bind(&profile.university)
        .bind(&profile.category)
        .bind(raw.total_runs)
        .bind(raw.balls_faced)
        .bind(raw.innings_played)
        .bind(raw.wickets)
        .bind(raw.overs_bowled)
        .bind(raw.runs_conceded)
        .bind(rate_column(derived.batting_strike_rate))
        .bind(rate_column(derived.batting_average))
        .bind(rate_column(derived.bowling_strike_rate))
        .bind(rate_column(derived.economy_rate))
        .bind(derived.points)
        .bind(derived.value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| store_error("Failed to insert player", e))?;

        Player::try_from(row)
    }

    async fn find_by_id(&self, id: i64) -> DomainResult<Option<Player>> {
        let row = sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {} FROM players WHERE id = $1",
            PLAYER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| store_error("Failed to find player by id", e))?;

        row.map(Player::try_from).transpose()
    }

    async fn find_by_ids(&self, ids: &[i64]) -> DomainResult<Vec<Player>> {
        let rows = sqlx::query_as::<_, PlayerRow>(&format!(
            "SELECT {} FROM players WHERE id = ANY($1) ORDER BY id",
            PLAYER_COLUMNS
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| store_error("Failed to find players by ids", e))?;

        rows.into_iter().map(Player::try_from).collect()
    }

    async fn list(&self, filter: &PlayerFilter) -> DomainResult<Vec<Player>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM players", PLAYER_COLUMNS));
        push_filter(&mut builder, filter, "");
        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<PlayerRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| store_error("Failed to list players", e))?;

        rows.into_iter().map(Player::try_from).collect()
    }

    async fn save(&self, player: &Player) -> DomainResult<()> {
        let profile = player.profile();
        let raw = player.raw();
        let derived = player.derived();

        let result = sqlx::query(
            r#"
            UPDATE players SET
                name = $2, university = $3, category = $4,
                total_runs = $5, balls_faced = $6, innings_played = $7,
                wickets = $8, overs_bowled = $9, runs_conceded = $10,
                batting_strike_rate = $11, batting_average = $12,
                bowling_strike_rate = $13, economy_rate = $14,
                points = $15, value = $16, updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(player.id())
        .bind(&profile.name)
        .bind(&profile.university)
        .bind(&profile.category)
        .bind(raw.total_runs)
        .bind(raw.balls_faced)
        .bind(raw.innings_played)
        .bind(raw.wickets)
        .bind(raw.overs_bowled)
        .bind(raw.runs_conceded)
        .bind(rate_column(derived.batting_strike_rate))
        .bind(rate_column(derived.batting_average))
        .bind(rate_column(derived.bowling_strike_rate))
        .bind(rate_column(derived.economy_rate))
        .bind(derived.points)
        .bind(derived.value)
        .bind(player.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| store_error("Failed to save player", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("player", player.id()));
        }

        Ok(())
    }

    async fn delete(&self, id: i64) -> DomainResult<()> {
        // team_players rows go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| store_error("Failed to delete player", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found("player", id));
        }

        Ok(())
    }
}
