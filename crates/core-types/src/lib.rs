//! Shared primitives for the UITrail capture agent.
//!
//! Value types exchanged between the action loop, the candidate scanner,
//! the decision policy boundary and the capture sink. Everything here is
//! plain data; behavior lives in the crates that consume it.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod action;
pub mod change;
pub mod flow;
pub mod task;

pub use action::{ActionKind, CandidateAction, Decision};
pub use change::{ChangeKind, ChangeResult};
pub use flow::{FlowRecord, FlowStatus, StepRecord};
pub use task::Task;

/// Unique identifier for one task execution (a flow).
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct FlowId(pub String);

impl FlowId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for FlowId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for FlowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
