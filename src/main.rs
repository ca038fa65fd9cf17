use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use fantasy_cricket_api::api::{self, AppState};
use fantasy_cricket_api::auth::password::hash_password;
use fantasy_cricket_api::config::{AppConfig, StorageBackend};
use fantasy_cricket_api::domain::repositories::Stores;
use fantasy_cricket_api::infrastructure::repositories::{
    InMemoryStore, PostgresPlayerRepository, PostgresTeamRepository, PostgresUserRepository,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("fantasy_cricket_api=info,tower_http=info")),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!("Server failed: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), BoxError> {
    let config = AppConfig::from_env()?;

    let stores = match config.storage {
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(&config.database_url)
                .await?;
            tracing::info!("Database connected successfully");

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied");

            Stores::new(
                Arc::new(PostgresPlayerRepository::new(pool.clone())),
                Arc::new(PostgresTeamRepository::new(pool.clone())),
                Arc::new(PostgresUserRepository::new(pool)),
            )
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            let store = Arc::new(InMemoryStore::new());
            Stores::new(store.clone(), store.clone(), store)
        }
    };

    let bind_addr = config.bind_addr;
    let admin = config.admin.clone();
    let bcrypt_cost = config.bcrypt_cost;
    let state = AppState::new(stores, config);

    if let Some(admin) = admin {
        let password_hash = hash_password(&admin.password, bcrypt_cost)?;
        state
            .services
            .accounts
            .bootstrap_admin(&admin.username, password_hash)
            .await?;
    }

    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("Server listening on {}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
