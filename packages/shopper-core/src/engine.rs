//! The task engine: a per-task state machine alternating extraction and
//! decision until a terminal action is chosen or the frontier empties.

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::error::EngineError;
use crate::oracle::{DecisionOracle, DecisionRequest, MAX_STEPS};
use crate::scrape::ActionSource;
use crate::storage::TaskStore;
use crate::types::{Action, Agent, TaskId, TaskRecord, TaskStatus};

/// A single shopper's browsing task.
///
/// The task is its own state's only writer: the frontier is replaced (never
/// appended) on each extraction round, and every chosen action is appended to
/// the durable trace before termination is evaluated.
pub struct AgentTask {
    pub id: TaskId,
    agent: Agent,
    goal: String,
    seed: String,
    status: TaskStatus,
    frontier: Vec<Action>,
    history: Vec<Action>,
    source: Box<dyn ActionSource>,
    created_at: DateTime<Utc>,
}

impl AgentTask {
    pub fn new(
        agent: Agent,
        goal: impl Into<String>,
        seed: Option<String>,
        source: Box<dyn ActionSource>,
    ) -> Self {
        Self {
            id: TaskId::new(),
            agent,
            goal: goal.into(),
            seed: seed.unwrap_or_else(|| Uuid::now_v7().to_string()),
            status: TaskStatus::NotStarted,
            frontier: Vec::new(),
            history: Vec::new(),
            source,
            created_at: Utc::now(),
        }
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn history(&self) -> &[Action] {
        &self.history
    }

    /// The persistable row for this task.
    pub fn record(&self) -> TaskRecord {
        TaskRecord {
            id: self.id,
            agent_id: self.agent.id,
            goal: self.goal.clone(),
            seed: self.seed.clone(),
            status: self.status,
            created_at: self.created_at,
        }
    }

    /// Replay the persisted trace, then drive the state machine to completion.
    pub async fn run(
        &mut self,
        oracle: &dyn DecisionOracle,
        store: &dyn TaskStore,
    ) -> Result<(), EngineError> {
        self.load_history(store).await?;
        self.execute(oracle, store).await
    }

    /// Replace the in-memory trace with the persisted one, so resumption does
    /// not re-select already-chosen steps.
    async fn load_history(&mut self, store: &dyn TaskStore) -> Result<(), EngineError> {
        if !self.history.is_empty() {
            return Ok(());
        }
        let trace = store.load_trace(self.id).await?;
        self.history = trace.into_iter().map(|entry| entry.action).collect();
        Ok(())
    }

    async fn execute(
        &mut self,
        oracle: &dyn DecisionOracle,
        store: &dyn TaskStore,
    ) -> Result<(), EngineError> {
        self.set_status(TaskStatus::InProgress, store).await?;

        if self.history.is_empty() {
            self.frontier = self.source.initial_actions(&self.goal);
        } else if self.frontier.is_empty() {
            // Resuming a partial run: rebuild the frontier from the last
            // chosen action instead of replaying choices.
            let target = self
                .history
                .last()
                .filter(|action| !action.kind.is_terminal())
                .and_then(|action| action.target_url.clone());
            if let Some(target) = target {
                self.frontier = self.source.possible_actions(&target).await?;
            }
        }

        loop {
            let Some(action) = self.next_action(oracle).await? else {
                break;
            };

            // Durable before termination is evaluated; a step is never rewritten.
            let step = store.append_step(self.id, self.agent.id, &action).await?;
            info!(
                task_id = %self.id.0,
                step,
                action_type = action.kind.as_str(),
                "Recorded step"
            );

            let terminal = action.kind.is_terminal();
            let target = action.target_url.clone();
            self.history.push(action);

            if terminal {
                break;
            }
            let Some(target) = target else {
                break;
            };
            self.frontier = self.source.possible_actions(&target).await?;
        }

        info!(task_id = %self.id.0, steps = self.history.len(), "Task finished");
        self.set_status(TaskStatus::Finished, store).await
    }

    /// Resolve the next action: a forced single candidate skips the oracle; an
    /// unmatched oracle reply or an empty frontier resolves to nothing.
    async fn next_action(
        &self,
        oracle: &dyn DecisionOracle,
    ) -> Result<Option<Action>, EngineError> {
        match self.frontier.len() {
            0 => Ok(None),
            1 => Ok(Some(self.frontier[0].clone())),
            _ => {
                let request = DecisionRequest {
                    goal: &self.goal,
                    frontier: &self.frontier,
                    history: &self.history,
                    profile: &self.agent.profile,
                    max_steps: MAX_STEPS,
                };
                let reply = oracle.choose(request).await.map_err(EngineError::Oracle)?;
                Ok(reply.and_then(|raw| self.find_in_frontier(&raw)))
            }
        }
    }

    fn find_in_frontier(&self, raw: &str) -> Option<Action> {
        let wanted = raw.trim();
        self.frontier
            .iter()
            .find(|action| action.id.0.to_string() == wanted)
            .cloned()
    }

    async fn set_status(
        &mut self,
        status: TaskStatus,
        store: &dyn TaskStore,
    ) -> Result<(), EngineError> {
        self.status = status;
        store.update_task_status(self.id, status).await?;
        Ok(())
    }
}
