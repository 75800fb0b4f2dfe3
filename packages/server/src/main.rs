// Main entry point for the synthetic shopper API server

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::sqlite::SqlitePoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use openai_client::OpenAIClient;
use server_core::{app::build_app, app::AppState, config::Config, oracle::LlmOracle};
use shopper_core::{FetchCache, HttpTransport, SqliteStorage};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,shopper_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting synthetic shopper API");

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    tracing::info!("Connecting to database...");
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    SqliteStorage::ensure_schema(&pool)
        .await
        .context("Failed to create storage schema")?;
    FetchCache::ensure_schema(&pool)
        .await
        .context("Failed to create fetch cache schema")?;
    tracing::info!("Database ready");

    let transport = HttpTransport::new().context("Failed to create page transport")?;
    let fetch_cache = Arc::new(FetchCache::new(pool.clone(), Arc::new(transport)));
    let storage = Arc::new(SqliteStorage::new(pool.clone()));
    let oracle = Arc::new(LlmOracle::new(
        OpenAIClient::new(config.openai_api_key.clone()),
        config.openai_model.clone(),
    ));

    let app = build_app(AppState {
        db_pool: pool,
        storage,
        fetch_cache,
        oracle,
    });

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
