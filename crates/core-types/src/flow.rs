//! Flow and step records owned by the capture sink.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::change::ChangeResult;
use crate::FlowId;

/// Terminal (or in-flight) status of one task execution.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStatus {
    Running,
    Success,
    NoActions,
    MaxStepsReached,
    Failed,
}

impl FlowStatus {
    /// Whether this status ends the flow.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FlowStatus::Running)
    }
}

impl std::fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FlowStatus::Running => "running",
            FlowStatus::Success => "success",
            FlowStatus::NoActions => "no_actions",
            FlowStatus::MaxStepsReached => "max_steps_reached",
            FlowStatus::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// One task execution. Created at loop start, mutated only to set the
/// terminal status, never deleted by the loop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlowRecord {
    pub id: FlowId,
    pub app_name: String,
    pub task_id: String,
    pub task_title: String,
    pub task_blurb: String,
    /// Wall-clock run identifier, `%Y%m%dT%H%M%SZ`.
    pub run_id: String,
    /// Artifact key prefix: `{app_name}/{task_id}/{run_id}`.
    pub prefix: String,
    pub status: FlowStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// Append-only record of one observed state within a flow.
///
/// Indices are 1-based and strictly increasing per flow; allocation is
/// owned by the capture sink. Artifact keys are derived from the flow
/// prefix and index, so distinct steps never collide.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepRecord {
    pub flow_id: FlowId,
    pub index: u32,
    pub label: String,
    pub description: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<ChangeResult>,
    pub screenshot_key: String,
    pub dom_key: String,
    /// Optional accessibility snapshot artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_key: Option<String>,
    pub captured_at: DateTime<Utc>,
}
