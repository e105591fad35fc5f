//! Immutable description of one natural-language task request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Parsed form of a free-text request like `"linear: create project for TES"`.
///
/// Created once per run from the raw query and never mutated afterwards.
/// The `start_url` is filled in by the caller from its app registry; the
/// loop itself never guesses URLs.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Original query text, kept for diagnostics.
    pub raw_query: String,
    /// Short app name, e.g. `linear` or `notion`.
    pub app_name: String,
    /// Free-text goal the policy is steering towards.
    pub goal: String,
    /// Entry point into the application.
    pub start_url: String,
    /// Optional object type hint (e.g. `project`, `issue`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_type: Option<String>,
    /// Additional key/value constraints for the policy.
    #[serde(default)]
    pub constraints: BTreeMap<String, String>,
}

impl Task {
    /// Parse a raw query of the form `"<app>: <goal>"`.
    ///
    /// The text before the first `:` is the app name, the remainder the
    /// goal. A query without a colon yields an empty goal, which callers
    /// should reject before starting a flow.
    pub fn from_query(raw_query: &str) -> Self {
        let (app, goal) = match raw_query.split_once(':') {
            Some((app, goal)) => (app.trim(), goal.trim()),
            None => (raw_query.trim(), ""),
        };
        Self {
            raw_query: raw_query.to_string(),
            app_name: app.to_string(),
            goal: goal.to_string(),
            start_url: String::new(),
            object_type: None,
            constraints: BTreeMap::new(),
        }
    }

    /// Set the start URL resolved from the caller's app registry.
    pub fn with_start_url(mut self, url: impl Into<String>) -> Self {
        self.start_url = url.into();
        self
    }

    /// Task identifier used for capture prefixes: the object type when
    /// present, otherwise a generic bucket.
    pub fn task_id(&self) -> &str {
        self.object_type.as_deref().unwrap_or("generic_task")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_app_and_goal() {
        let task = Task::from_query("linear: create project for TES");
        assert_eq!(task.app_name, "linear");
        assert_eq!(task.goal, "create project for TES");
        assert_eq!(task.task_id(), "generic_task");
    }

    #[test]
    fn query_without_colon_has_empty_goal() {
        let task = Task::from_query("notion");
        assert_eq!(task.app_name, "notion");
        assert!(task.goal.is_empty());
    }

    #[test]
    fn only_first_colon_splits() {
        let task = Task::from_query("notion: add page: meeting notes");
        assert_eq!(task.app_name, "notion");
        assert_eq!(task.goal, "add page: meeting notes");
    }
}
