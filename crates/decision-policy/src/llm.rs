//! LLM-backed policy over an OpenAI-style chat completions endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use uitrail_core_types::{CandidateAction, Decision, Task};

use crate::fallback::fallback_decision;
use crate::validate::{validate_proposal, DecisionProposal};
use crate::DecisionPolicy;

/// Internal errors of the LLM client. Never cross the policy boundary;
/// every variant degrades to a fallback decision.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("response carried no message content")]
    EmptyResponse,

    #[error("no JSON object in model output")]
    NoJsonObject,

    #[error("model output was not valid JSON: {0}")]
    BadJson(String),
}

/// Connection settings for the reasoning backend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmPolicyConfig {
    /// Chat-completions endpoint URL.
    pub endpoint: String,
    /// Bearer token; unset means unauthenticated (local backends).
    pub api_key: Option<String>,
    pub model: String,
    /// Per-request deadline in milliseconds.
    pub request_timeout_ms: u64,
    pub max_tokens: u32,
}

impl Default for LlmPolicyConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            request_timeout_ms: 60_000,
            max_tokens: 256,
        }
    }
}

/// Policy that consults a remote model each iteration and validates
/// whatever comes back.
pub struct LlmPolicy {
    config: LlmPolicyConfig,
    client: reqwest::Client,
}

impl LlmPolicy {
    pub fn new(config: LlmPolicyConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    async fn request_proposal(
        &self,
        task: &Task,
        candidates: &[CandidateAction],
        history_summary: &str,
        current_url: &str,
    ) -> Result<DecisionProposal, LlmError> {
        let prompt = build_prompt(task, candidates, history_summary, current_url);
        let body = json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?
            .error_for_status()
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|err| LlmError::Transport(err.to_string()))?;

        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?;

        let object = extract_first_json_object(content).ok_or(LlmError::NoJsonObject)?;
        serde_json::from_str(object).map_err(|err| LlmError::BadJson(err.to_string()))
    }
}

#[async_trait]
impl DecisionPolicy for LlmPolicy {
    async fn choose_action(
        &self,
        task: &Task,
        candidates: &[CandidateAction],
        history_summary: &str,
        current_url: &str,
    ) -> Decision {
        let decision = match self
            .request_proposal(task, candidates, history_summary, current_url)
            .await
        {
            Ok(proposal) => validate_proposal(proposal, &task.goal, candidates),
            Err(err) => {
                warn!(error = %err, "model call failed; using fallback selector");
                fallback_decision(&task.goal, candidates, &err.to_string())
            }
        };

        info!(
            app = %task.app_name,
            action_id = decision.action_id.as_deref().unwrap_or("-"),
            kind = %decision.kind,
            done = decision.done,
            label = decision.label.as_deref().unwrap_or("-"),
            "policy decision"
        );
        decision
    }
}

/// Slice out the first balanced-looking JSON object: everything between
/// the first `{` and the last `}`.
pub fn extract_first_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

fn build_prompt(
    task: &Task,
    candidates: &[CandidateAction],
    history_summary: &str,
    current_url: &str,
) -> String {
    let actions_text = candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| {
            format!(
                "{}. id={} action_type={} description={}",
                idx + 1,
                c.id,
                c.kind,
                c.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let history = if history_summary.is_empty() {
        "none"
    } else {
        history_summary
    };

    format!(
        r#"You are a UI agent controlling a web browser.

Your goal is to complete the user's task by choosing the next best UI action.

Task:
  app: {app}
  goal: {goal}
  object_type: {object_type}

Current URL: {url}

Recent history (previous steps):
{history}

You have these candidate actions on the current page:
{actions_text}

Choose ONE best next action.

Respond ONLY with valid JSON using this schema:

{{
  "action_id": "btn_3",
  "action_type": "click" | "type",
  "text": "text to type when action_type is type",
  "capture_before": true,
  "capture_after": true,
  "label": "state label after action",
  "done": false,
  "reason": "short explanation of your choice"
}}

Do NOT include any extra commentary outside the JSON."#,
        app = task.app_name,
        goal = task.goal,
        object_type = task.object_type.as_deref().unwrap_or(""),
        url = current_url,
        history = history,
        actions_text = actions_text,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uitrail_core_types::ActionKind;

    #[test]
    fn extracts_embedded_json_object() {
        let raw = "Sure, here is the plan:\n{\"action_id\": \"btn_0\", \"done\": false}\nGood luck!";
        let object = extract_first_json_object(raw).unwrap();
        let proposal: DecisionProposal = serde_json::from_str(object).unwrap();
        assert_eq!(proposal.action_id.as_deref(), Some("btn_0"));
    }

    #[test]
    fn rejects_text_without_object() {
        assert!(extract_first_json_object("no json here").is_none());
        assert!(extract_first_json_object("} backwards {").is_none());
    }

    #[test]
    fn prompt_lists_candidates_and_history() {
        let task = Task::from_query("linear: create project").with_start_url("https://linear.app");
        let candidates = vec![CandidateAction {
            id: "btn_0".into(),
            kind: ActionKind::Click,
            locator: "[data-uitrail-id=\"btn_0\"]".into(),
            description: "button with text 'New project'".into(),
        }];
        let prompt = build_prompt(&task, &candidates, "1. opened projects view", "https://linear.app/team");
        assert!(prompt.contains("id=btn_0"));
        assert!(prompt.contains("1. opened projects view"));
        assert!(prompt.contains("https://linear.app/team"));
        assert!(prompt.contains("Respond ONLY with valid JSON"));
    }
}
