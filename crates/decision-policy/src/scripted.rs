//! Deterministic policy double for tests and offline development.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use uitrail_core_types::{CandidateAction, Decision, Task};

use crate::fallback::fallback_decision;
use crate::validate::{validate_proposal, DecisionProposal};
use crate::DecisionPolicy;

/// Replays a queued sequence of proposals, one per iteration.
///
/// Proposals still pass through the same validation as real backend
/// output, so scripted scenarios exercise the boundary's substitution
/// rules. An exhausted queue behaves like a degraded backend and falls
/// back.
pub struct ScriptedPolicy {
    proposals: Mutex<VecDeque<DecisionProposal>>,
}

impl ScriptedPolicy {
    pub fn new(proposals: impl IntoIterator<Item = DecisionProposal>) -> Self {
        Self {
            proposals: Mutex::new(proposals.into_iter().collect()),
        }
    }

    /// Convenience for one-proposal scripts.
    pub fn single(proposal: DecisionProposal) -> Self {
        Self::new([proposal])
    }

    pub fn remaining(&self) -> usize {
        self.proposals.lock().map(|q| q.len()).unwrap_or(0)
    }
}

#[async_trait]
impl DecisionPolicy for ScriptedPolicy {
    async fn choose_action(
        &self,
        task: &Task,
        candidates: &[CandidateAction],
        _history_summary: &str,
        _current_url: &str,
    ) -> Decision {
        let next = self
            .proposals
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match next {
            Some(proposal) => validate_proposal(proposal, &task.goal, candidates),
            None => fallback_decision(&task.goal, candidates, "scripted queue exhausted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uitrail_core_types::ActionKind;

    fn candidates() -> Vec<CandidateAction> {
        vec![CandidateAction {
            id: "btn_0".into(),
            kind: ActionKind::Click,
            locator: "[data-uitrail-id=\"btn_0\"]".into(),
            description: "button with text 'New'".into(),
        }]
    }

    #[tokio::test]
    async fn replays_queue_then_falls_back() {
        let policy = ScriptedPolicy::new([DecisionProposal::click("btn_0")]);
        let task = Task::from_query("app: do the thing");

        let first = policy
            .choose_action(&task, &candidates(), "", "https://a")
            .await;
        assert_eq!(first.action_id.as_deref(), Some("btn_0"));
        assert_eq!(policy.remaining(), 0);

        let second = policy
            .choose_action(&task, &candidates(), "", "https://a")
            .await;
        assert!(second
            .reason
            .unwrap_or_default()
            .contains("scripted queue exhausted"));
    }

    #[tokio::test]
    async fn scripted_proposals_are_validated() {
        let policy = ScriptedPolicy::single(DecisionProposal::click("btn_missing"));
        let task = Task::from_query("app: click new");
        let decision = policy
            .choose_action(&task, &candidates(), "", "https://a")
            .await;
        // The invalid reference is replaced with a real candidate.
        assert_eq!(decision.action_id.as_deref(), Some("btn_0"));
    }
}
