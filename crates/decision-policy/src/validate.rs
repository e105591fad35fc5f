//! Proposal validation.
//!
//! Whatever a backend proposes is normalized here before the loop ever
//! sees it. The rules: an action id must reference the current scan,
//! a type action must carry text, and unset optional fields get loop
//! defaults. Anything invalid falls back deterministically.

use serde::{Deserialize, Serialize};

use uitrail_core_types::{ActionKind, CandidateAction, Decision};

use crate::fallback::fallback_decision;

/// Raw decision shape as produced by a reasoning backend, before
/// validation. All fields optional; JSON field names match the prompt
/// schema.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DecisionProposal {
    #[serde(default)]
    pub action_id: Option<String>,
    #[serde(default)]
    pub action_type: Option<ActionKind>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
    #[serde(default)]
    pub capture_before: Option<bool>,
    #[serde(default)]
    pub capture_after: Option<bool>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl DecisionProposal {
    /// Terminal proposal helper for scripted scenarios.
    pub fn done_with_label(label: impl Into<String>) -> Self {
        Self {
            done: Some(true),
            label: Some(label.into()),
            ..Self::default()
        }
    }

    /// Click proposal helper for scripted scenarios.
    pub fn click(action_id: impl Into<String>) -> Self {
        Self {
            action_id: Some(action_id.into()),
            action_type: Some(ActionKind::Click),
            ..Self::default()
        }
    }
}

/// Normalize a proposal into a well-formed [`Decision`].
///
/// Guarantees the returned decision either references a candidate id
/// from `candidates` or carries no action at all (pure-capture `done`).
pub fn validate_proposal(
    proposal: DecisionProposal,
    goal: &str,
    candidates: &[CandidateAction],
) -> Decision {
    let done = proposal.done.unwrap_or(false);

    // Terminal with no action: capture-only, nothing to validate against
    // the scan.
    if done && proposal.action_id.is_none() {
        return Decision {
            action_id: None,
            kind: proposal.action_type.unwrap_or(ActionKind::Click),
            text: None,
            done: true,
            capture_before: proposal.capture_before.unwrap_or(true),
            capture_after: proposal.capture_after.unwrap_or(true),
            label: proposal.label,
            reason: proposal.reason,
        };
    }

    let candidate = proposal
        .action_id
        .as_deref()
        .and_then(|id| candidates.iter().find(|c| c.id == id));

    let candidate = match candidate {
        Some(candidate) => candidate,
        None => {
            return fallback_decision(goal, candidates, "proposed action id not in current scan")
        }
    };

    let kind = proposal.action_type.unwrap_or(candidate.kind);
    if kind == ActionKind::Type && proposal.text.as_deref().unwrap_or("").is_empty() {
        return fallback_decision(goal, candidates, "type action proposed without text");
    }

    let action_id = candidate.id.clone();
    let label = proposal
        .label
        .clone()
        .unwrap_or_else(|| format!("after_action_{action_id}"));

    Decision {
        action_id: Some(action_id),
        kind,
        text: proposal.text,
        done,
        capture_before: proposal.capture_before.unwrap_or(true),
        capture_after: proposal.capture_after.unwrap_or(true),
        label: Some(label),
        reason: proposal.reason,
    }
}
