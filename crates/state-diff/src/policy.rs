use serde::{Deserialize, Serialize};

/// Tunable cutoffs for change scoring.
///
/// The defaults were tuned by hand against the originally targeted apps
/// (Linear, Notion, Outlook); they are configuration, not invariants,
/// and should not be assumed to generalize.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffPolicy {
    /// Scores below this classify as no change.
    pub change_threshold: f64,
    /// Summary cutoff between "minor" and "some" change.
    pub minor_cutoff: f64,
    /// Summary cutoff for "notable" change and modal detection.
    pub notable_cutoff: f64,
}

impl Default for DiffPolicy {
    fn default() -> Self {
        Self {
            change_threshold: 0.05,
            minor_cutoff: 0.1,
            notable_cutoff: 0.3,
        }
    }
}

impl DiffPolicy {
    pub fn with_change_threshold(mut self, threshold: f64) -> Self {
        self.change_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cutoffs() {
        let policy = DiffPolicy::default();
        assert_eq!(policy.change_threshold, 0.05);
        assert!(policy.minor_cutoff < policy.notable_cutoff);
    }

    #[test]
    fn partial_deserialization_keeps_default_cutoffs() {
        let policy: DiffPolicy = serde_json::from_str("{\"change_threshold\": 0.2}").unwrap();
        assert_eq!(policy.change_threshold, 0.2);
        assert_eq!(policy.minor_cutoff, 0.1);
        assert_eq!(policy.notable_cutoff, 0.3);
    }
}
