//! Read-only task status and trace surface.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use shopper_core::{TaskId, TaskRecord, TaskStore, TraceEntry};

use super::{internal_error, not_found, ApiError};
use crate::app::AppState;

#[derive(Serialize)]
pub struct TaskResponse {
    pub id: String,
    pub agent_id: String,
    pub goal: String,
    pub status: String,
}

impl TaskResponse {
    fn from_record(record: &TaskRecord) -> Self {
        Self {
            id: record.id.0.to_string(),
            agent_id: record.agent_id.0.to_string(),
            goal: record.goal.clone(),
            status: record.status.as_str().to_string(),
        }
    }
}

#[derive(Serialize)]
pub struct TraceStepResponse {
    pub step: i64,
    pub action_id: String,
    pub action_type: String,
    pub context: String,
    pub target_url: Option<String>,
}

impl TraceStepResponse {
    fn from_entry(entry: &TraceEntry) -> Self {
        Self {
            step: entry.step,
            action_id: entry.action.id.0.to_string(),
            action_type: entry.action.kind.as_str().to_string(),
            context: entry.action.context.clone(),
            target_url: entry.action.target_url.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct TaskDetailResponse {
    pub id: String,
    pub agent_id: String,
    pub goal: String,
    pub status: String,
    pub trace: Vec<TraceStepResponse>,
}

#[derive(Serialize)]
pub struct LogEntryResponse {
    pub task_id: String,
    #[serde(flatten)]
    pub step: TraceStepResponse,
}

pub async fn list_tasks(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<TaskResponse>>, ApiError> {
    let tasks = state.storage.list_tasks().await.map_err(internal_error)?;
    Ok(Json(tasks.iter().map(TaskResponse::from_record).collect()))
}

pub async fn get_task(
    Extension(state): Extension<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskDetailResponse>, ApiError> {
    let task_id = Uuid::parse_str(&task_id)
        .map(TaskId)
        .map_err(|_| not_found("Task not found"))?;

    let record = state
        .storage
        .get_task(task_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Task not found"))?;

    let trace = state
        .storage
        .load_trace(task_id)
        .await
        .map_err(internal_error)?;

    Ok(Json(TaskDetailResponse {
        id: record.id.0.to_string(),
        agent_id: record.agent_id.0.to_string(),
        goal: record.goal.clone(),
        status: record.status.as_str().to_string(),
        trace: trace.iter().map(TraceStepResponse::from_entry).collect(),
    }))
}

pub async fn list_logs(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<LogEntryResponse>>, ApiError> {
    let steps = state
        .storage
        .list_all_steps()
        .await
        .map_err(internal_error)?;

    Ok(Json(
        steps
            .iter()
            .map(|(task_id, entry)| LogEntryResponse {
                task_id: task_id.0.to_string(),
                step: TraceStepResponse::from_entry(entry),
            })
            .collect(),
    ))
}
