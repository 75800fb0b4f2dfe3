//! Chat-model-backed implementation of the core's decision oracle port.

use anyhow::{Context, Result};
use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient};
use shopper_core::{serialize_actions, DecisionOracle, DecisionRequest};
use tracing::debug;

/// Decision oracle that asks a chat model to pick among candidates.
pub struct LlmOracle {
    client: OpenAIClient,
    model: String,
}

impl LlmOracle {
    pub fn new(client: OpenAIClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn build_prompt(request: &DecisionRequest<'_>) -> String {
        let profile = request.profile;
        format!(
            "You are acting as a consumer browsing an e-commerce site with this goal: {goal}\n\
             You are presented with these options:\n{options}\n\n\
             You have previously taken the following actions, and you want to settle on \
             the best option to buy (with a BUY_NOW action) within at most {steps} steps:\n\
             {previous}\n\n\
             Take the action from the point of view of a user with this profile:\n\
             - Gender: {gender}\n\
             - Age Range: {age_from} - {age_to}\n\
             - Location: {location}\n\
             - Interests: {interests}\n\n\
             Consider how a user with that profile shops, then reply with the chosen \
             option's action ID only.",
            goal = request.goal,
            options = serialize_actions(request.frontier),
            steps = request.max_steps,
            previous = serialize_actions(request.history),
            gender = profile.gender,
            age_from = profile.age_from,
            age_to = profile.age_to,
            location = profile.location,
            interests = profile.interests.join(", "),
        )
    }
}

#[async_trait]
impl DecisionOracle for LlmOracle {
    async fn choose(&self, request: DecisionRequest<'_>) -> Result<Option<String>> {
        let prompt = Self::build_prompt(&request);

        let response = self
            .client
            .chat_completion(ChatRequest {
                model: self.model.clone(),
                messages: vec![Message::user(prompt)],
                ..Default::default()
            })
            .await
            .context("chat completion failed")?;

        let reply = response.content.trim().to_string();
        debug!(model = %self.model, reply = %reply, "Oracle replied");

        if reply.is_empty() {
            Ok(None)
        } else {
            Ok(Some(reply))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopper_core::{
        Action, ActionKind, ProfileId, UserProfile, MAX_STEPS,
    };

    #[test]
    fn test_prompt_carries_goal_options_and_profile() {
        let profile = UserProfile {
            id: ProfileId::new(),
            gender: "female".to_string(),
            age_from: 18,
            age_to: 24,
            location: "Austin, TX".to_string(),
            interests: vec!["running".to_string(), "yoga".to_string()],
            description: None,
        };
        let frontier = vec![
            Action::new(ActionKind::ClickSearchResult, "Product Title: A", None),
            Action::new(ActionKind::ClickSearchResult, "Product Title: B", None),
        ];
        let history = vec![Action::new(ActionKind::QueryGoal, "running shoes", None)];

        let prompt = LlmOracle::build_prompt(&DecisionRequest {
            goal: "running shoes",
            frontier: &frontier,
            history: &history,
            profile: &profile,
            max_steps: MAX_STEPS,
        });

        assert!(prompt.contains("goal: running shoes"));
        assert!(prompt.contains(&frontier[0].id.0.to_string()));
        assert!(prompt.contains(&frontier[1].id.0.to_string()));
        assert!(prompt.contains("at most 10 steps"));
        assert!(prompt.contains("Interests: running, yoga"));
        assert!(prompt.contains("action ID only"));
    }
}
