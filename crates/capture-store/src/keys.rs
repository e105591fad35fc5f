//! Deterministic artifact key derivation.
//!
//! Keys are a pure function of flow identity and step index, so two
//! writers to the same flow can never collide on a key once index
//! allocation is serialized.

use chrono::{DateTime, Utc};

/// Wall-clock run identifier, e.g. `20260829T143501Z`.
pub fn run_id(at: DateTime<Utc>) -> String {
    at.format("%Y%m%dT%H%M%SZ").to_string()
}

/// Key prefix shared by all artifacts of one flow.
pub fn flow_prefix(app_name: &str, task_id: &str, run_id: &str) -> String {
    format!("{app_name}/{task_id}/{run_id}")
}

pub fn screenshot_key(prefix: &str, index: u32) -> String {
    format!("{prefix}/step_{index}_screenshot.png")
}

pub fn dom_key(prefix: &str, index: u32) -> String {
    format!("{prefix}/step_{index}_dom.html")
}

pub fn snapshot_key(prefix: &str, index: u32) -> String {
    format!("{prefix}/step_{index}_snapshot.json")
}

pub fn flow_record_key(prefix: &str) -> String {
    format!("{prefix}/flow.json")
}

pub fn step_record_key(prefix: &str, index: u32) -> String {
    format!("{prefix}/step_{index}.json")
}
