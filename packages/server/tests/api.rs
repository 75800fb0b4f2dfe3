//! Route-level tests over an in-memory database. Nothing here touches the
//! network: the transport and oracle are inert stubs.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use server_core::app::{build_app, AppState};
use shopper_core::{
    DecisionOracle, DecisionRequest, FetchCache, FetchError, PageTransport, SqliteStorage,
};

struct NullTransport;

#[async_trait]
impl PageTransport for NullTransport {
    async fn get(&self, url: &str, _user_agent: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Status {
            url: url.to_string(),
            status: reqwest::StatusCode::NOT_FOUND,
        })
    }
}

struct NullOracle;

#[async_trait]
impl DecisionOracle for NullOracle {
    async fn choose(&self, _request: DecisionRequest<'_>) -> anyhow::Result<Option<String>> {
        Ok(None)
    }
}

async fn test_app() -> axum::Router {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    SqliteStorage::ensure_schema(&pool).await.unwrap();
    FetchCache::ensure_schema(&pool).await.unwrap();

    build_app(AppState {
        db_pool: pool.clone(),
        storage: Arc::new(SqliteStorage::new(pool.clone())),
        fetch_cache: Arc::new(FetchCache::new(pool, Arc::new(NullTransport))),
        oracle: Arc::new(NullOracle),
    })
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn agent_payload() -> Value {
    json!({
        "name": "Sam",
        "profile": {
            "gender": "male",
            "ageFrom": 25,
            "ageTo": 34,
            "location": "Boulder, CO",
            "interests": ["hiking", "photography"]
        }
    })
}

#[tokio::test]
async fn test_agent_crud_round_trip() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/agents", agent_payload()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["name"], "Sam");
    assert_eq!(created["profile"]["ageFrom"], 25);

    let response = app
        .clone()
        .oneshot(get(&format!("/agents/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["profile"]["interests"][0], "hiking");

    let response = app.clone().oneshot(get("/agents")).await.unwrap();
    let listed = body_json(response).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/agents/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get(&format!("/agents/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_agent_returns_404_detail() {
    let app = test_app().await;

    let response = app
        .oneshot(get("/agents/00000000-0000-0000-0000-000000000000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "Agent not found");
}

#[tokio::test]
async fn test_dispatch_returns_task_id_and_records_the_task() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(post_json("/agents", agent_payload()))
        .await
        .unwrap();
    let agent_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(post_json(
            &format!("/agents/{}/dispatch", agent_id),
            json!({"goal": "hiking shoes"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let task_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // The task exists immediately; its background run fails fast on the inert
    // transport and must never force the status to finished.
    let response = app
        .clone()
        .oneshot(get(&format!("/tasks/{}", task_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert_eq!(detail["goal"], "hiking shoes");
    assert_ne!(detail["status"], "finished");

    let response = app.oneshot(get("/tasks")).await.unwrap();
    let tasks = body_json(response).await;
    assert_eq!(tasks.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_health_reports_ok() {
    let app = test_app().await;

    let response = app.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"]["status"], "ok");
}
