use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub Uuid);

impl ActionId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ActionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a browsing task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a shopper agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for a user profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileId(pub Uuid);

impl ProfileId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ProfileId {
    fn default() -> Self {
        Self::new()
    }
}

/// The closed set of browsing moves a shopper can make.
///
/// `BuyNow` is the only terminal kind; choosing it ends the task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    QueryGoal,
    BackToSearchResults,
    ClickSearchResult,
    ClickRecommended,
    BuyNow,
}

impl ActionKind {
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionKind::BuyNow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::QueryGoal => "QUERY_GOAL",
            ActionKind::BackToSearchResults => "BACK_TO_SEARCH_RESULTS",
            ActionKind::ClickSearchResult => "CLICK_SEARCH_RESULT",
            ActionKind::ClickRecommended => "CLICK_RECOMMENDED",
            ActionKind::BuyNow => "BUY_NOW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "QUERY_GOAL" => Some(ActionKind::QueryGoal),
            "BACK_TO_SEARCH_RESULTS" => Some(ActionKind::BackToSearchResults),
            "CLICK_SEARCH_RESULT" => Some(ActionKind::ClickSearchResult),
            "CLICK_RECOMMENDED" => Some(ActionKind::ClickRecommended),
            "BUY_NOW" => Some(ActionKind::BuyNow),
            _ => None,
        }
    }
}

/// A single candidate (or chosen) browsing action.
///
/// Immutable once created; `target_url` is absent only where the action
/// denotes an endpoint with nowhere further to navigate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub id: ActionId,
    pub kind: ActionKind,
    pub context: String,
    pub target_url: Option<String>,
}

impl Action {
    pub fn new(kind: ActionKind, context: impl Into<String>, target_url: Option<String>) -> Self {
        Self {
            id: ActionId::new(),
            kind,
            context: context.into(),
            target_url,
        }
    }
}

/// Assembles an action's context string from `"Key: value"` fragments.
///
/// Absent or blank values are skipped rather than rendered, so a page
/// missing a field degrades the description instead of failing extraction.
#[derive(Debug, Default)]
pub struct ContextParts {
    parts: Vec<String>,
}

impl ContextParts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: &str, value: Option<String>) {
        if let Some(value) = value {
            let value = value.trim();
            if !value.is_empty() {
                self.parts.push(format!("{}: {}", key, value));
            }
        }
    }

    pub fn finish(self) -> String {
        self.parts.join("; ")
    }
}

/// Lifecycle of a browsing task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    NotStarted,
    InProgress,
    Finished,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::NotStarted => "not_started",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Finished => "finished",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(TaskStatus::NotStarted),
            "in_progress" => Some(TaskStatus::InProgress),
            "finished" => Some(TaskStatus::Finished),
            _ => None,
        }
    }
}

/// Demographic profile the oracle consults when picking among candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: ProfileId,
    pub gender: String,
    pub age_from: i64,
    pub age_to: i64,
    pub location: String,
    pub interests: Vec<String>,
    pub description: Option<String>,
}

/// A shopper agent: a named profile that tasks are dispatched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub profile: UserProfile,
}

/// The persisted row for a browsing task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRecord {
    pub id: TaskId,
    pub agent_id: AgentId,
    pub goal: String,
    pub seed: String,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

/// One step of a task's trace: the action chosen at a given step index.
#[derive(Debug, Clone, Serialize)]
pub struct TraceEntry {
    pub step: i64,
    pub action: Action,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_parts_skips_absent_fields() {
        let mut context = ContextParts::new();
        context.push("Product Title", Some("Trail Runner".to_string()));
        context.push("Price", None);
        context.push("Star Rating", Some("4.5 out of 5 stars".to_string()));

        assert_eq!(
            context.finish(),
            "Product Title: Trail Runner; Star Rating: 4.5 out of 5 stars"
        );
    }

    #[test]
    fn test_context_parts_skips_blank_values() {
        let mut context = ContextParts::new();
        context.push("Product Title", Some("  ".to_string()));
        context.push("Price", Some("$12.99".to_string()));

        assert_eq!(context.finish(), "Price: $12.99");
    }

    #[test]
    fn test_action_kind_round_trip() {
        for kind in [
            ActionKind::QueryGoal,
            ActionKind::BackToSearchResults,
            ActionKind::ClickSearchResult,
            ActionKind::ClickRecommended,
            ActionKind::BuyNow,
        ] {
            assert_eq!(ActionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(ActionKind::parse("ADD_TO_CART"), None);
    }

    #[test]
    fn test_only_buy_now_is_terminal() {
        assert!(ActionKind::BuyNow.is_terminal());
        assert!(!ActionKind::QueryGoal.is_terminal());
        assert!(!ActionKind::ClickSearchResult.is_terminal());
    }

    #[test]
    fn test_action_kind_serializes_as_screaming_snake_case() {
        let action = Action::new(ActionKind::BuyNow, "Product Title: Test", None);
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "BUY_NOW");
    }
}
