//! Heuristic change detection between two page observations.
//!
//! Scores how much the serialized markup moved between iterations and
//! classifies the transition (navigation, in-page change, modal overlay,
//! or nothing). This is deliberately a cheap linear scan over the markup
//! text: it runs every iteration, so no DOM tree is ever built.

use once_cell::sync::Lazy;
use regex::Regex;

use uitrail_core_types::{ChangeKind, ChangeResult};

pub mod policy;

pub use policy::DiffPolicy;

/// Structural tags whose count deltas signal layout-level change.
static TAG_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        ("button", Regex::new(r"(?i)<button\b").expect("static pattern")),
        ("input", Regex::new(r"(?i)<input\b").expect("static pattern")),
        ("form", Regex::new(r"(?i)<form\b").expect("static pattern")),
        ("div", Regex::new(r"(?i)<div\b").expect("static pattern")),
    ]
});

/// Compare two markup snapshots and classify the transition.
///
/// `prev_html = None` means there is no previous observation; the result
/// scores 1.0 and is treated as changed. URL comparison is a pure string
/// inequality with a missing previous URL reading as empty, so an empty
/// previous URL only counts as changed when the new URL is non-empty.
pub fn diff(
    prev_html: Option<&str>,
    new_html: &str,
    prev_url: Option<&str>,
    new_url: &str,
    policy: &DiffPolicy,
) -> ChangeResult {
    let url_changed = prev_url.unwrap_or("") != new_url;

    let (score, summary) = match prev_html {
        None => (1.0, "Initial state".to_string()),
        Some(prev) => {
            let score = change_score(prev, new_html);
            (score, summarize(prev, new_html, score, policy))
        }
    };

    let kind = if url_changed {
        ChangeKind::UrlChange
    } else if score < policy.change_threshold {
        ChangeKind::NoChange
    } else if has_modal_cue(new_html) {
        ChangeKind::DomChangeModal
    } else {
        ChangeKind::DomChange
    };

    ChangeResult {
        score,
        kind,
        summary,
        url_changed,
    }
}

/// Bounded change score: the larger of the relative markup-length delta
/// and the largest relative per-tag count delta, clamped to `[0, 1]`.
fn change_score(prev_html: &str, new_html: &str) -> f64 {
    let prev_len = prev_html.len() as f64;
    let new_len = new_html.len() as f64;
    let length_ratio = (new_len - prev_len).abs() / prev_len.max(new_len).max(1.0);

    let mut tag_ratio: f64 = 0.0;
    for (_, pattern) in TAG_PATTERNS.iter() {
        let prev_count = pattern.find_iter(prev_html).count() as f64;
        let new_count = pattern.find_iter(new_html).count() as f64;
        // max(prev, new, 1) in the denominator keeps zero-to-zero
        // comparisons silent and ratios non-negative.
        let denominator = prev_count.max(new_count).max(1.0);
        tag_ratio = tag_ratio.max((prev_count - new_count).abs() / denominator);
    }

    length_ratio.max(tag_ratio).clamp(0.0, 1.0)
}

fn has_modal_cue(html: &str) -> bool {
    let lowered = html.to_lowercase();
    lowered.contains("modal") || lowered.contains("dialog")
}

fn summarize(prev_html: &str, new_html: &str, score: f64, policy: &DiffPolicy) -> String {
    let modal_grew = new_html.to_lowercase().matches("modal").count()
        > prev_html.to_lowercase().matches("modal").count();

    if score > policy.notable_cutoff && modal_grew {
        "New modal detected over existing page".to_string()
    } else if score > policy.notable_cutoff {
        "Notable DOM changes detected".to_string()
    } else if score > policy.minor_cutoff {
        "Some DOM changes detected".to_string()
    } else {
        "Minor or no structural change".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_policy() -> DiffPolicy {
        DiffPolicy::default()
    }

    #[test]
    fn initial_state_always_scores_one() {
        let result = diff(None, "<html><body></body></html>", None, "https://a", &default_policy());
        assert_eq!(result.score, 1.0);
        assert_eq!(result.summary, "Initial state");
        assert!(result.url_changed);
        assert_eq!(result.kind, ChangeKind::UrlChange);
    }

    #[test]
    fn identical_markup_and_url_is_no_change() {
        let html = "<div><button>Go</button></div>";
        let url = "https://app.example/home";
        let result = diff(Some(html), html, Some(url), url, &default_policy());
        assert_eq!(result.kind, ChangeKind::NoChange);
        assert!(!result.url_changed);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn score_grows_with_button_count_delta() {
        let policy = default_policy();
        let base: String = "<button></button>".repeat(10);
        let mut last_score = 0.0;
        for extra in 1..=10 {
            let grown = format!("{base}{}", "<button></button>".repeat(extra));
            let result = diff(Some(&base), &grown, Some("u"), "u", &policy);
            assert!(
                result.score > last_score,
                "score should grow: {} vs {}",
                result.score,
                last_score
            );
            assert!(result.score <= 1.0);
            last_score = result.score;
        }
    }

    #[test]
    fn button_burst_over_empty_page_clamps_at_one() {
        let grown = "<div></div>".to_string() + &"<button></button>".repeat(10);
        let result = diff(Some("<div></div>"), &grown, Some("u"), "u", &default_policy());
        assert_eq!(result.score, 1.0);
        assert_eq!(result.kind, ChangeKind::DomChange);
    }

    #[test]
    fn modal_cue_classifies_as_modal_change() {
        let prev = "<div><p>hi</p></div>";
        let new = "<div><p>hi</p><div class=\"modal\">confirm?</div><form></form></div>";
        let result = diff(Some(prev), new, Some("u"), "u", &default_policy());
        assert_eq!(result.kind, ChangeKind::DomChangeModal);
        assert!(result.score >= default_policy().change_threshold);
    }

    #[test]
    fn url_change_takes_precedence_over_dom_signals() {
        let prev = "<div></div>";
        let new = "<div><dialog open></dialog></div>";
        let result = diff(Some(prev), new, Some("https://a/1"), "https://a/2", &default_policy());
        assert_eq!(result.kind, ChangeKind::UrlChange);
        assert!(result.url_changed);
    }

    #[test]
    fn empty_previous_url_changes_only_to_non_empty() {
        let policy = default_policy();
        let same = diff(Some("<p></p>"), "<p></p>", None, "", &policy);
        assert!(!same.url_changed);

        let moved = diff(Some("<p></p>"), "<p></p>", None, "https://a", &policy);
        assert!(moved.url_changed);
    }

    #[test]
    fn zero_counts_never_produce_false_signal() {
        // Neither side has any tracked tag; only length can move the score.
        let result = diff(Some("plain text"), "plain text!", Some("u"), "u", &default_policy());
        assert!(result.score < default_policy().change_threshold);
        assert_eq!(result.kind, ChangeKind::NoChange);
    }
}
