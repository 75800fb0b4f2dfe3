//! Application setup and router construction.

use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use shopper_core::{DecisionOracle, FetchCache, SqliteStorage};

use crate::routes;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub storage: Arc<SqliteStorage>,
    pub fetch_cache: Arc<FetchCache>,
    pub oracle: Arc<dyn DecisionOracle>,
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health_handler))
        .route(
            "/agents",
            post(routes::agents::create_agent).get(routes::agents::list_agents),
        )
        .route(
            "/agents/:agent_id",
            get(routes::agents::get_agent).delete(routes::agents::delete_agent),
        )
        .route("/agents/:agent_id/dispatch", post(routes::agents::dispatch_agent))
        .route("/tasks", get(routes::tasks::list_tasks))
        .route("/tasks/:task_id", get(routes::tasks::get_task))
        .route("/logs", get(routes::tasks::list_logs))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
