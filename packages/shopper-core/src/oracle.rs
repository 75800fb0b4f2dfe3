//! The decision seam: everything nondeterministic about choosing an action
//! lives behind this port, keeping the engine itself unit-testable.

use async_trait::async_trait;
use serde::Serialize;

use crate::types::{Action, ActionId, UserProfile};

/// Advisory step budget surfaced to the oracle. The loop itself terminates on
/// a terminal action or an exhausted frontier, never on this number.
pub const MAX_STEPS: u32 = 10;

/// Everything the oracle sees when asked to pick among candidates.
pub struct DecisionRequest<'a> {
    pub goal: &'a str,
    pub frontier: &'a [Action],
    pub history: &'a [Action],
    pub profile: &'a UserProfile,
    pub max_steps: u32,
}

/// Trait for external decision capabilities (to allow deterministic stubs)
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Returns the raw identifier of the chosen action.
    ///
    /// A reply that matches nothing in the frontier means "no action chosen";
    /// the engine treats that as termination, not as an error.
    async fn choose(&self, request: DecisionRequest<'_>) -> anyhow::Result<Option<String>>;
}

/// Prompt-facing view of an action; the target URL stays out of the payload.
#[derive(Serialize)]
struct PromptAction<'a> {
    action_id: ActionId,
    action_type: &'static str,
    context: &'a str,
}

/// Serialize actions for the oracle, one JSON record per line block.
pub fn serialize_actions(actions: &[Action]) -> String {
    actions
        .iter()
        .map(|action| {
            serde_json::to_string_pretty(&PromptAction {
                action_id: action.id,
                action_type: action.kind.as_str(),
                context: &action.context,
            })
            .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
