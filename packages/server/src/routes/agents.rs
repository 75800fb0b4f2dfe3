//! Shopper agent CRUD and task dispatch.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{error, info};
use uuid::Uuid;

use shopper_core::{
    Agent, AgentId, AgentStore, AgentTask, AmazonScraper, ProfileId, TaskStore, UserProfile,
};

use super::{internal_error, not_found, ApiError};
use crate::app::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileData {
    pub gender: String,
    pub age_from: i64,
    pub age_to: i64,
    pub location: String,
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UserProfileData {
    fn from_profile(profile: &UserProfile) -> Self {
        Self {
            gender: profile.gender.clone(),
            age_from: profile.age_from,
            age_to: profile.age_to,
            location: profile.location.clone(),
            interests: profile.interests.clone(),
            description: profile.description.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct AgentResponse {
    pub id: String,
    pub name: String,
    pub profile: UserProfileData,
}

impl AgentResponse {
    fn from_agent(agent: &Agent) -> Self {
        Self {
            id: agent.id.0.to_string(),
            name: agent.name.clone(),
            profile: UserProfileData::from_profile(&agent.profile),
        }
    }
}

#[derive(Deserialize)]
pub struct AgentCreate {
    pub name: String,
    pub profile: UserProfileData,
}

#[derive(Deserialize)]
pub struct DispatchRequest {
    pub goal: String,
    #[serde(default)]
    pub seed: Option<String>,
}

#[derive(Serialize)]
pub struct DispatchResponse {
    pub id: String,
}

fn parse_agent_id(raw: &str) -> Result<AgentId, ApiError> {
    Uuid::parse_str(raw)
        .map(AgentId)
        .map_err(|_| not_found("Agent not found"))
}

pub async fn create_agent(
    Extension(state): Extension<AppState>,
    Json(body): Json<AgentCreate>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent = Agent {
        id: AgentId::new(),
        name: body.name,
        profile: UserProfile {
            id: ProfileId::new(),
            gender: body.profile.gender,
            age_from: body.profile.age_from,
            age_to: body.profile.age_to,
            location: body.profile.location,
            interests: body.profile.interests,
            description: body.profile.description,
        },
    };

    state
        .storage
        .insert_agent(&agent)
        .await
        .map_err(internal_error)?;

    info!(agent_id = %agent.id.0, name = %agent.name, "Agent created");
    Ok(Json(AgentResponse::from_agent(&agent)))
}

pub async fn list_agents(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<AgentResponse>>, ApiError> {
    let agents = state.storage.list_agents().await.map_err(internal_error)?;
    Ok(Json(agents.iter().map(AgentResponse::from_agent).collect()))
}

pub async fn get_agent(
    Extension(state): Extension<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent_id = parse_agent_id(&agent_id)?;
    let agent = state
        .storage
        .get_agent(agent_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Agent not found"))?;
    Ok(Json(AgentResponse::from_agent(&agent)))
}

pub async fn delete_agent(
    Extension(state): Extension<AppState>,
    Path(agent_id): Path<String>,
) -> Result<Json<AgentResponse>, ApiError> {
    let agent_id = parse_agent_id(&agent_id)?;
    let agent = state
        .storage
        .delete_agent(agent_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Agent not found"))?;

    info!(agent_id = %agent.id.0, "Agent deleted");
    Ok(Json(AgentResponse::from_agent(&agent)))
}

/// Instantiate a task for the agent and schedule it for background
/// execution; the caller observes progress via the task surface.
pub async fn dispatch_agent(
    Extension(state): Extension<AppState>,
    Path(agent_id): Path<String>,
    Json(body): Json<DispatchRequest>,
) -> Result<Json<DispatchResponse>, ApiError> {
    let agent_id = parse_agent_id(&agent_id)?;
    let agent = state
        .storage
        .get_agent(agent_id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Agent not found"))?;

    let source = AmazonScraper::new(state.fetch_cache.clone());
    let mut task = AgentTask::new(agent, body.goal, body.seed, Box::new(source));

    state
        .storage
        .insert_task(&task.record())
        .await
        .map_err(internal_error)?;

    let task_id = task.id;
    let storage = state.storage.clone();
    let oracle = state.oracle.clone();

    info!(task_id = %task_id.0, agent_id = %agent_id.0, "Task dispatched");
    tokio::spawn(async move {
        if let Err(err) = task.run(oracle.as_ref(), storage.as_ref()).await {
            error!(task_id = %task_id.0, error = %err, "Task aborted");
        }
    });

    Ok(Json(DispatchResponse {
        id: task_id.0.to_string(),
    }))
}
