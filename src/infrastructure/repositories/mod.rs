// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory;
pub mod postgres_player_repository;
pub mod postgres_team_repository;
pub mod postgres_user_repository;

pub use in_memory::InMemoryStore;
pub use postgres_player_repository::PostgresPlayerRepository;
pub use postgres_team_repository::PostgresTeamRepository;
pub use postgres_user_repository::PostgresUserRepository;

use sqlx::postgres::PgDatabaseError;
use sqlx::{Postgres, QueryBuilder};

use crate::domain::errors::DomainError;
use crate::domain::filter::{Filter, FilterField, FilterValue};

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Maps a driver error onto the domain taxonomy
///
/// Unique violations become `Conflict`, foreign-key violations `NotFound`,
/// everything else `StoreUnavailable`.
pub(crate) fn store_error(context: &str, err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => {
                return DomainError::Conflict(format!("{}: {}", context, db.message()));
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                let detail = db
                    .try_downcast_ref::<PgDatabaseError>()
                    .and_then(|pg| pg.detail())
                    .unwrap_or_default();
                return DomainError::NotFound {
                    entity: referenced_entity(db.constraint().unwrap_or_default()),
                    id: referenced_key(detail).unwrap_or("unknown").to_string(),
                };
            }
            _ => {}
        }
    }

    tracing::error!(error = %err, "{}", context);
    DomainError::StoreUnavailable(format!("{}: {}", context, err))
}

fn referenced_entity(constraint: &str) -> &'static str {
    if constraint.contains("player_id") {
        "player"
    } else if constraint.contains("user_id") {
        "user"
    } else if constraint.contains("team_id") {
        "team"
    } else {
        "record"
    }
}

// "Key (player_id)=(42) is not present in table \"players\"."
fn referenced_key(detail: &str) -> Option<&str> {
    let start = detail.find(")=(")? + 3;
    let end = start + detail[start..].find(')')?;
    Some(&detail[start..end])
}

/// Appends `WHERE a op $n AND b op $m ...` for a conjunctive filter
///
/// `qualifier` prefixes column names when the query joins other tables.
pub(crate) fn push_filter<F: FilterField>(
    builder: &mut QueryBuilder<'_, Postgres>,
    filter: &Filter<F>,
    qualifier: &str,
) {
    for (i, predicate) in filter.predicates().iter().enumerate() {
        builder.push(if i == 0 { " WHERE " } else { " AND " });
        builder.push(qualifier);
        builder.push(predicate.field.column());
        builder.push(predicate.op.sql());
        match &predicate.value {
            FilterValue::Int(v) => builder.push_bind(*v),
            FilterValue::Float(v) => builder.push_bind(*v),
            FilterValue::Text(v) => builder.push_bind(v.clone()),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::filter::Comparison;
    use crate::domain::player::{PlayerField, PlayerFilter};

    #[test]
    fn referenced_key_extracts_id() {
        let detail = "Key (player_id)=(42) is not present in table \"players\".";
        assert_eq!(referenced_key(detail), Some("42"));
        assert_eq!(referenced_key("no detail"), None);
    }

    #[test]
    fn referenced_entity_from_constraint() {
        assert_eq!(referenced_entity("team_players_player_id_fkey"), "player");
        assert_eq!(referenced_entity("teams_user_id_fkey"), "user");
        assert_eq!(referenced_entity(""), "record");
    }

    #[test]
    fn push_filter_builds_conjunction() {
        let filter = PlayerFilter::all()
            .and(PlayerField::TotalRuns, Comparison::Gt, FilterValue::Int(100))
            .unwrap()
            .and(
                PlayerField::University,
                Comparison::Eq,
                FilterValue::Text("UoM".to_string()),
            )
            .unwrap();

        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM players");
        push_filter(&mut builder, &filter, "");

        assert_eq!(
            builder.sql(),
            "SELECT * FROM players WHERE total_runs > $1 AND university = $2"
        );
    }

    #[test]
    fn empty_filter_adds_nothing() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM teams t");
        push_filter(&mut builder, &PlayerFilter::all(), "t.");

        assert_eq!(builder.sql(), "SELECT * FROM teams t");
    }
}
