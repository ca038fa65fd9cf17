//! Integration tests for repository layer
//!
//! These tests verify that the PostgreSQL adapters honour the same
//! contracts as the in-memory store: derived stats persisted on write,
//! one team per user, cascading deletes and aggregate-only updates.
//!
//! Run with `DATABASE_URL=... cargo test -- --ignored`.

use fantasy_cricket_api::domain::errors::DomainError;
use fantasy_cricket_api::domain::filter::{Comparison, FilterValue};
use fantasy_cricket_api::domain::player::{
    PlayerDraft, PlayerField, PlayerFilter, PlayerProfile, RawStats,
};
use fantasy_cricket_api::domain::repositories::{
    PlayerRepository, TeamRepository, UserRepository,
};
use fantasy_cricket_api::domain::team::{TeamDraft, TeamFilter};
use fantasy_cricket_api::domain::user::{NewUser, Role, User, Username};
use fantasy_cricket_api::infrastructure::repositories::{
    PostgresPlayerRepository, PostgresTeamRepository, PostgresUserRepository,
};
use sqlx::PgPool;
use uuid::Uuid;

/// Set up test database connection pool with the schema applied
async fn setup_test_db() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for integration tests");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Unique, valid username so tests don't collide
fn unique_username() -> String {
    format!("user{}", &Uuid::new_v4().simple().to_string()[..12])
}

/// Create a test user for team ownership
async fn create_test_user(repo: &PostgresUserRepository) -> User {
    repo.create(&NewUser {
        username: Username::new(unique_username()).expect("valid username"),
        name: "Test User".to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role: Role::User,
        approved: true,
        budget: 9_000_000,
    })
    .await
    .expect("Failed to create test user")
}

fn batter(name: &str) -> PlayerDraft {
    PlayerDraft::new(
        PlayerProfile {
            name: name.to_string(),
            university: "University of Colombo".to_string(),
            category: "Batsman".to_string(),
        },
        RawStats {
            total_runs: 500,
            balls_faced: 400,
            innings_played: 10,
            ..RawStats::default()
        },
    )
    .expect("valid draft")
}

#[tokio::test]
#[ignore]
async fn test_player_insert_persists_derived_stats() {
    let pool = setup_test_db().await;
    let repo = PostgresPlayerRepository::new(pool.clone());

    let player = repo.insert(&batter("Persisted Batter")).await.unwrap();
    let found = repo.find_by_id(player.id()).await.unwrap().unwrap();

    assert_eq!(found.points(), 65);
    assert_eq!(found.value(), 700_000);
    assert_eq!(found.derived().batting_average, player.derived().batting_average);

    let stored: (i64, i64) = sqlx::query_as("SELECT points, value FROM players WHERE id = $1")
        .bind(player.id())
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, (65, 700_000));

    repo.delete(player.id()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_player_filter_builds_valid_sql() {
    let pool = setup_test_db().await;
    let repo = PostgresPlayerRepository::new(pool);
    let name = format!("Filter {}", Uuid::new_v4());
    let player = repo.insert(&batter(&name)).await.unwrap();

    let filter = PlayerFilter::all()
        .and_param("name", &name)
        .unwrap()
        .and(PlayerField::TotalRuns, Comparison::Gt, FilterValue::Int(499))
        .unwrap();
    let players = repo.list(&filter).await.unwrap();

    assert_eq!(players.len(), 1);
    assert_eq!(players[0].id(), player.id());

    repo.delete(player.id()).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_delete_missing_player_is_not_found() {
    let pool = setup_test_db().await;
    let repo = PostgresPlayerRepository::new(pool);

    let result = repo.delete(i64::MAX).await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
#[ignore]
async fn test_one_team_per_user() {
    let pool = setup_test_db().await;
    let users = PostgresUserRepository::new(pool.clone());
    let teams = PostgresTeamRepository::new(pool);
    let user = create_test_user(&users).await;

    teams
        .insert(&TeamDraft::new(user.id, "First").unwrap())
        .await
        .unwrap();
    let second = teams
        .insert(&TeamDraft::new(user.id, "Second").unwrap())
        .await;

    assert!(matches!(second, Err(DomainError::Conflict(_))));

    users.delete(user.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_team_for_missing_user_is_not_found() {
    let pool = setup_test_db().await;
    let teams = PostgresTeamRepository::new(pool);

    let result = teams
        .insert(&TeamDraft::new(i64::MAX, "Orphan").unwrap())
        .await;

    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
#[ignore]
async fn test_roster_save_and_aggregate_update() {
    let pool = setup_test_db().await;
    let users = PostgresUserRepository::new(pool.clone());
    let players = PostgresPlayerRepository::new(pool.clone());
    let teams = PostgresTeamRepository::new(pool);

    let user = create_test_user(&users).await;
    let a = players.insert(&batter("Roster A")).await.unwrap();
    let b = players.insert(&batter("Roster B")).await.unwrap();

    let mut team = teams
        .insert(&TeamDraft::new(user.id, "Roster Test").unwrap())
        .await
        .unwrap();
    team.replace_roster(&[a.clone(), b.clone()], user.budget())
        .unwrap();
    teams.save(&team).await.unwrap();

    let stored = teams.find_by_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.player_ids().len(), 2);
    assert_eq!(stored.points(), 130);
    assert_eq!(stored.value(), 1_400_000);

    // Aggregate-only update leaves the roster alone
    teams.update_aggregates(team.id(), 1, 2).await.unwrap();
    let stored = teams.find_by_id(team.id()).await.unwrap().unwrap();
    assert_eq!(stored.player_ids().len(), 2);
    assert_eq!((stored.points(), stored.value()), (1, 2));

    // Deleting a player cascades out of the roster
    players.delete(a.id()).await.unwrap();
    let stored = teams.find_by_id(team.id()).await.unwrap().unwrap();
    assert!(!stored.contains(a.id()));
    assert!(stored.contains(b.id()));

    let filtered = teams
        .list(&TeamFilter::all().and_param("user_id", &user.id.to_string()).unwrap())
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);

    players.delete(b.id()).await.unwrap();
    users.delete(user.id).await.unwrap();
}

#[tokio::test]
#[ignore]
async fn test_user_delete_cascades_to_team() {
    let pool = setup_test_db().await;
    let users = PostgresUserRepository::new(pool.clone());
    let teams = PostgresTeamRepository::new(pool);
    let user = create_test_user(&users).await;
    let team = teams
        .insert(&TeamDraft::new(user.id, "Doomed").unwrap())
        .await
        .unwrap();

    users.delete(user.id).await.unwrap();

    assert!(teams.find_by_id(team.id()).await.unwrap().is_none());
    assert!(users.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore]
async fn test_duplicate_username_is_conflict() {
    let pool = setup_test_db().await;
    let users = PostgresUserRepository::new(pool);
    let user = create_test_user(&users).await;

    let duplicate = users
        .create(&NewUser {
            username: user.username.clone(),
            name: "Duplicate".to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            approved: true,
            budget: 9_000_000,
        })
        .await;

    assert!(matches!(duplicate, Err(DomainError::Conflict(_))));

    let found = users
        .find_by_username(user.username.as_str())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, user.id);

    users.delete(user.id).await.unwrap();
}
