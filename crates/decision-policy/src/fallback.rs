//! Deterministic fallback selection.

use std::collections::HashSet;

use async_trait::async_trait;

use uitrail_core_types::{CandidateAction, Decision, Task};

use crate::DecisionPolicy;

/// Lexical overlap between the goal text and a candidate description:
/// the size of the intersection of their lower-cased word sets.
fn overlap(goal_words: &HashSet<String>, description: &str) -> usize {
    description
        .to_lowercase()
        .split_whitespace()
        .collect::<HashSet<_>>()
        .iter()
        .filter(|word| goal_words.contains(**word))
        .count()
}

/// Choose a legal action without any external call.
///
/// Picks the candidate whose description shares the most words with the
/// goal; ties resolve to the earliest candidate in scan order, so the
/// choice is stable for a given scan. The reason records why the
/// fallback fired.
pub fn fallback_decision(
    goal: &str,
    candidates: &[CandidateAction],
    why: &str,
) -> Decision {
    let goal_words: HashSet<String> = goal
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect();

    let best = candidates
        .iter()
        .enumerate()
        .max_by(|(a_idx, a), (b_idx, b)| {
            overlap(&goal_words, &a.description)
                .cmp(&overlap(&goal_words, &b.description))
                // max_by keeps the later of equals, so order indices to
                // favor the earlier candidate on ties.
                .then(b_idx.cmp(a_idx))
        })
        .map(|(_, candidate)| candidate);

    match best {
        Some(candidate) => Decision {
            action_id: Some(candidate.id.clone()),
            kind: candidate.kind,
            text: None,
            done: false,
            capture_before: true,
            capture_after: true,
            label: Some(format!("after_action_{}", candidate.id)),
            reason: Some(format!("Fallback decision: {why}")),
        },
        None => Decision::finished(format!("Fallback with no candidates: {why}")),
    }
}

/// Policy that only ever uses the fallback selector. Useful when the
/// reasoning backend is disabled entirely.
#[derive(Debug, Default, Clone)]
pub struct FallbackPolicy;

#[async_trait]
impl DecisionPolicy for FallbackPolicy {
    async fn choose_action(
        &self,
        task: &Task,
        candidates: &[CandidateAction],
        _history_summary: &str,
        _current_url: &str,
    ) -> Decision {
        fallback_decision(&task.goal, candidates, "reasoning backend disabled")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uitrail_core_types::ActionKind;

    fn candidate(id: &str, description: &str) -> CandidateAction {
        CandidateAction {
            id: id.to_string(),
            kind: ActionKind::Click,
            locator: format!("[data-uitrail-id=\"{id}\"]"),
            description: description.to_string(),
        }
    }

    #[test]
    fn picks_highest_lexical_overlap() {
        let candidates = vec![
            candidate("a", "open create modal"),
            candidate("b", "settings menu"),
        ];
        let decision = fallback_decision("create a new project", &candidates, "test");
        assert_eq!(decision.action_id.as_deref(), Some("a"));
        assert!(!decision.done);
    }

    #[test]
    fn label_matches_the_validated_default_form() {
        let candidates = vec![candidate("btn_2", "create project")];
        let decision = fallback_decision("create project", &candidates, "test");
        assert_eq!(decision.label.as_deref(), Some("after_action_btn_2"));
    }

    #[test]
    fn ties_resolve_to_first_candidate() {
        let candidates = vec![
            candidate("x", "nothing relevant"),
            candidate("y", "equally irrelevant"),
        ];
        let decision = fallback_decision("create project", &candidates, "test");
        assert_eq!(decision.action_id.as_deref(), Some("x"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let candidates = vec![
            candidate("a", "Team Settings"),
            candidate("b", "CREATE PROJECT"),
        ];
        let decision = fallback_decision("create project", &candidates, "test");
        assert_eq!(decision.action_id.as_deref(), Some("b"));
    }

    #[test]
    fn empty_candidate_list_terminates() {
        let decision = fallback_decision("anything", &[], "test");
        assert!(decision.done);
        assert!(decision.action_id.is_none());
    }
}
