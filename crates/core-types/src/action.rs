//! Candidate actions and policy decisions.

use serde::{Deserialize, Serialize};

/// How a candidate element can be acted on.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Click the element (buttons, links, ARIA buttons).
    Click,
    /// Fill the element with text (inputs, textareas, editable regions).
    Type,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Click => write!(f, "click"),
            ActionKind::Type => write!(f, "type"),
        }
    }
}

/// One interactive element the loop could act on this iteration.
///
/// Candidates are ephemeral: ids like `btn_3` are unique only within the
/// scan that produced them and must never be cached across iterations.
/// The locator is an opaque expression the page boundary resolves to
/// exactly one element while this scan's tagging is still in place.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CandidateAction {
    pub id: String,
    pub kind: ActionKind,
    pub locator: String,
    /// Short human-readable label, also used for fallback scoring.
    pub description: String,
}

/// The policy boundary's choice for one iteration.
///
/// Always well-formed by the time the loop sees it: the policy crate
/// validates proposals and substitutes a deterministic fallback when the
/// reasoning backend misbehaves. `done = true` with no `action_id` means
/// "capture and stop", with no UI action executed this iteration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Decision {
    /// Candidate id from the same scan, absent for pure-capture decisions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_id: Option<String>,
    pub kind: ActionKind,
    /// Text to fill; required when `kind` is `Type`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub done: bool,
    pub capture_before: bool,
    pub capture_after: bool,
    /// Short slug for the resulting step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Diagnostic explanation; flows into the rolling history.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Decision {
    /// A click decision targeting the given candidate.
    pub fn click(action_id: impl Into<String>) -> Self {
        Self {
            action_id: Some(action_id.into()),
            kind: ActionKind::Click,
            text: None,
            done: false,
            capture_before: true,
            capture_after: true,
            label: None,
            reason: None,
        }
    }

    /// A type decision targeting the given candidate.
    pub fn type_text(action_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            action_id: Some(action_id.into()),
            kind: ActionKind::Type,
            text: Some(text.into()),
            done: false,
            capture_before: true,
            capture_after: true,
            label: None,
            reason: None,
        }
    }

    /// A terminal decision: capture (if `capture_after`) and stop.
    pub fn finished(reason: impl Into<String>) -> Self {
        Self {
            action_id: None,
            kind: ActionKind::Click,
            text: None,
            done: true,
            capture_before: false,
            capture_after: true,
            label: None,
            reason: Some(reason.into()),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
