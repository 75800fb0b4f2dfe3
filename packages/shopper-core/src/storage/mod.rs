//! Persistence ports and the SQLite implementation behind them.

mod sqlite;

pub use sqlite::SqliteStorage;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::types::{Action, Agent, AgentId, TaskId, TaskRecord, TaskStatus, TraceEntry};

/// Task rows and the append-only, step-indexed trace log.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: &TaskRecord) -> Result<(), StorageError>;

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StorageError>;

    async fn get_task(&self, id: TaskId) -> Result<Option<TaskRecord>, StorageError>;

    async fn list_tasks(&self) -> Result<Vec<TaskRecord>, StorageError>;

    /// Append `action` as the task's next step and return the assigned step
    /// index (`1 + count of existing steps`, computed atomically).
    async fn append_step(
        &self,
        task_id: TaskId,
        agent_id: AgentId,
        action: &Action,
    ) -> Result<i64, StorageError>;

    /// Reconstruct a task's history strictly by ascending step index.
    async fn load_trace(&self, task_id: TaskId) -> Result<Vec<TraceEntry>, StorageError>;

    /// Every persisted step across all tasks, for the log surface.
    async fn list_all_steps(&self) -> Result<Vec<(TaskId, TraceEntry)>, StorageError>;
}

/// Ordinary CRUD over shopper agents and their profiles.
#[async_trait]
pub trait AgentStore: Send + Sync {
    async fn insert_agent(&self, agent: &Agent) -> Result<(), StorageError>;

    async fn get_agent(&self, id: AgentId) -> Result<Option<Agent>, StorageError>;

    async fn list_agents(&self) -> Result<Vec<Agent>, StorageError>;

    /// Remove the agent and its profile, returning the deleted record.
    async fn delete_agent(&self, id: AgentId) -> Result<Option<Agent>, StorageError>;
}
