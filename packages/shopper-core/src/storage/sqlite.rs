use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::error::StorageError;
use crate::types::{
    Action, ActionId, ActionKind, Agent, AgentId, ProfileId, TaskId, TaskRecord, TaskStatus,
    TraceEntry, UserProfile,
};

use super::{AgentStore, TaskStore};

/// SQLite-backed store for agents, tasks, and the trace log.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create all tables if they do not exist yet.
    pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS user_profiles (
                id TEXT PRIMARY KEY,
                gender TEXT NOT NULL,
                age_from INTEGER NOT NULL,
                age_to INTEGER NOT NULL,
                location TEXT NOT NULL,
                interests TEXT NOT NULL,
                description TEXT
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                profile_id TEXT NOT NULL REFERENCES user_profiles (id)
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agent_tasks (
                id TEXT PRIMARY KEY,
                agent_id TEXT NOT NULL REFERENCES agents (id),
                goal TEXT NOT NULL,
                seed TEXT NOT NULL,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS task_steps (
                task_id TEXT NOT NULL REFERENCES agent_tasks (id),
                step INTEGER NOT NULL,
                agent_id TEXT NOT NULL,
                action_id TEXT NOT NULL UNIQUE,
                action_type TEXT NOT NULL,
                context TEXT NOT NULL,
                target_url TEXT,
                PRIMARY KEY (task_id, step)
            )
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|_| StorageError::Decode(format!("{} is not a uuid: {}", what, raw)))
}

fn parse_kind(raw: &str) -> Result<ActionKind, StorageError> {
    ActionKind::parse(raw)
        .ok_or_else(|| StorageError::Decode(format!("unknown action type: {}", raw)))
}

fn parse_status(raw: &str) -> Result<TaskStatus, StorageError> {
    TaskStatus::parse(raw).ok_or_else(|| StorageError::Decode(format!("unknown status: {}", raw)))
}

fn task_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TaskRecord, StorageError> {
    let id: String = row.get("id");
    let agent_id: String = row.get("agent_id");
    let status: String = row.get("status");
    let created_at: DateTime<Utc> = row.get("created_at");
    Ok(TaskRecord {
        id: TaskId(parse_uuid(&id, "task id")?),
        agent_id: AgentId(parse_uuid(&agent_id, "agent id")?),
        goal: row.get("goal"),
        seed: row.get("seed"),
        status: parse_status(&status)?,
        created_at,
    })
}

fn step_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<TraceEntry, StorageError> {
    let action_id: String = row.get("action_id");
    let action_type: String = row.get("action_type");
    Ok(TraceEntry {
        step: row.get("step"),
        action: Action {
            id: ActionId(parse_uuid(&action_id, "action id")?),
            kind: parse_kind(&action_type)?,
            context: row.get("context"),
            target_url: row.get("target_url"),
        },
    })
}

fn agent_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Agent, StorageError> {
    let id: String = row.get("id");
    let profile_id: String = row.get("profile_id");
    let interests: String = row.get("interests");
    Ok(Agent {
        id: AgentId(parse_uuid(&id, "agent id")?),
        name: row.get("name"),
        profile: UserProfile {
            id: ProfileId(parse_uuid(&profile_id, "profile id")?),
            gender: row.get("gender"),
            age_from: row.get("age_from"),
            age_to: row.get("age_to"),
            location: row.get("location"),
            interests: if interests.is_empty() {
                vec![]
            } else {
                interests.split(", ").map(str::to_string).collect()
            },
            description: row.get("description"),
        },
    })
}

const AGENT_SELECT: &str = r#"
    SELECT a.id, a.name, p.id AS profile_id, p.gender, p.age_from, p.age_to,
           p.location, p.interests, p.description
    FROM agents a
    JOIN user_profiles p ON p.id = a.profile_id
"#;

#[async_trait]
impl TaskStore for SqliteStorage {
    async fn insert_task(&self, task: &TaskRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO agent_tasks (id, agent_id, goal, seed, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task.id.0.to_string())
        .bind(task.agent_id.0.to_string())
        .bind(&task.goal)
        .bind(&task.seed)
        .bind(task.status.as_str())
        .bind(task.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_task_status(&self, id: TaskId, status: TaskStatus) -> Result<(), StorageError> {
        sqlx::query("UPDATE agent_tasks SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> Result<Option<TaskRecord>, StorageError> {
        let row = sqlx::query(
            "SELECT id, agent_id, goal, seed, status, created_at FROM agent_tasks WHERE id = ?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(task_from_row).transpose()
    }

    async fn list_tasks(&self) -> Result<Vec<TaskRecord>, StorageError> {
        let rows = sqlx::query(
            "SELECT id, agent_id, goal, seed, status, created_at FROM agent_tasks ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    async fn append_step(
        &self,
        task_id: TaskId,
        agent_id: AgentId,
        action: &Action,
    ) -> Result<i64, StorageError> {
        let mut tx = self.pool.begin().await?;

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM task_steps WHERE task_id = ?")
            .bind(task_id.0.to_string())
            .fetch_one(&mut *tx)
            .await?;
        let step = count + 1;

        sqlx::query(
            r#"
            INSERT INTO task_steps (task_id, step, agent_id, action_id, action_type, context, target_url)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(task_id.0.to_string())
        .bind(step)
        .bind(agent_id.0.to_string())
        .bind(action.id.0.to_string())
        .bind(action.kind.as_str())
        .bind(&action.context)
        .bind(&action.target_url)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(step)
    }

    async fn load_trace(&self, task_id: TaskId) -> Result<Vec<TraceEntry>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT step, action_id, action_type, context, target_url
            FROM task_steps
            WHERE task_id = ?
            ORDER BY step
            "#,
        )
        .bind(task_id.0.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(step_from_row).collect()
    }

    async fn list_all_steps(&self) -> Result<Vec<(TaskId, TraceEntry)>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT task_id, step, action_id, action_type, context, target_url
            FROM task_steps
            ORDER BY task_id, step
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| {
                let task_id: String = row.get("task_id");
                Ok((
                    TaskId(parse_uuid(&task_id, "task id")?),
                    step_from_row(row)?,
                ))
            })
            .collect()
    }
}

#[async_trait]
impl AgentStore for SqliteStorage {
    async fn insert_agent(&self, agent: &Agent) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (id, gender, age_from, age_to, location, interests, description)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(agent.profile.id.0.to_string())
        .bind(&agent.profile.gender)
        .bind(agent.profile.age_from)
        .bind(agent.profile.age_to)
        .bind(&agent.profile.location)
        .bind(agent.profile.interests.join(", "))
        .bind(&agent.profile.description)
        .execute(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO agents (id, name, profile_id) VALUES (?, ?, ?)")
            .bind(agent.id.0.to_string())
            .bind(&agent.name)
            .bind(agent.profile.id.0.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_agent(&self, id: AgentId) -> Result<Option<Agent>, StorageError> {
        let row = sqlx::query(&format!("{} WHERE a.id = ?", AGENT_SELECT))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(agent_from_row).transpose()
    }

    async fn list_agents(&self) -> Result<Vec<Agent>, StorageError> {
        let rows = sqlx::query(&format!("{} ORDER BY a.name", AGENT_SELECT))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(agent_from_row).collect()
    }

    async fn delete_agent(&self, id: AgentId) -> Result<Option<Agent>, StorageError> {
        let Some(agent) = self.get_agent(id).await? else {
            return Ok(None);
        };

        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(agent.id.0.to_string())
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM user_profiles WHERE id = ?")
            .bind(agent.profile.id.0.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Some(agent))
    }
}
