//! Classification of one observed page transition.

use serde::{Deserialize, Serialize};

/// Kind of transition between two page observations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// Nothing moved past the configured threshold.
    NoChange,
    /// The URL itself changed (navigation).
    UrlChange,
    /// In-page DOM change without navigation.
    DomChange,
    /// DOM change with modal/dialog cues in the new markup.
    DomChangeModal,
}

impl std::fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeKind::NoChange => "no_change",
            ChangeKind::UrlChange => "url_change",
            ChangeKind::DomChange => "dom_change",
            ChangeKind::DomChangeModal => "dom_change_modal",
        };
        write!(f, "{label}")
    }
}

/// Heuristic change measurement, computed fresh per transition and never
/// persisted beyond the step it annotates.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChangeResult {
    /// Bounded change score in `[0, 1]`.
    pub score: f64,
    pub kind: ChangeKind,
    /// Human-friendly one-liner about what moved.
    pub summary: String,
    pub url_changed: bool,
}
