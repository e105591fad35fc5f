//! Candidate scanner: enumerates the actions currently available on a
//! live page.
//!
//! Each call is an independent, idempotent production: the page is
//! re-tagged, ids restart from zero, and nothing is cached. Callers must
//! treat ids as scan-scoped and re-resolve against the latest scan every
//! iteration.

use serde_json::Value;
use tracing::{debug, warn};

use page_adapter::{PageDriver, PageError};
use uitrail_core_types::{ActionKind, CandidateAction};

pub mod script;

use script::render_scan_script;

/// Enumerate visible, actionable elements in priority order (buttons,
/// then links, then text inputs), truncated to `max_actions`.
///
/// Individual inaccessible elements are skipped inside the injected
/// script; malformed rows coming back from the page are skipped here.
/// Only a page-level evaluation failure is an error.
pub async fn scan(
    page: &dyn PageDriver,
    max_actions: usize,
) -> Result<Vec<CandidateAction>, PageError> {
    let value = page.evaluate(&render_scan_script(max_actions)).await?;
    let candidates = parse_candidates(&value, max_actions);
    debug!(count = candidates.len(), max_actions, "scanned candidates");
    Ok(candidates)
}

/// Decode candidate rows from the script's return value.
pub fn parse_candidates(value: &Value, max_actions: usize) -> Vec<CandidateAction> {
    let rows = match value.as_array() {
        Some(rows) => rows,
        None => {
            warn!("scan script returned a non-array value; treating as empty");
            return Vec::new();
        }
    };

    let mut candidates = Vec::with_capacity(rows.len().min(max_actions));
    for row in rows {
        match parse_row(row) {
            Some(candidate) => candidates.push(candidate),
            None => warn!(?row, "skipping malformed candidate row"),
        }
        if candidates.len() >= max_actions {
            break;
        }
    }
    candidates
}

fn parse_row(row: &Value) -> Option<CandidateAction> {
    let id = row.get("id")?.as_str()?.to_string();
    let kind = match row.get("kind")?.as_str()? {
        "click" => ActionKind::Click,
        "type" => ActionKind::Type,
        _ => return None,
    };
    let locator = row.get("locator")?.as_str()?.to_string();
    let description = row
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if id.is_empty() || locator.is_empty() {
        return None;
    }
    Some(CandidateAction {
        id,
        kind,
        locator,
        description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_rows_in_order() {
        let value = json!([
            { "id": "btn_0", "kind": "click", "locator": "[data-uitrail-id=\"btn_0\"]", "description": "button with text 'New'" },
            { "id": "link_0", "kind": "click", "locator": "[data-uitrail-id=\"link_0\"]", "description": "link with text 'Docs'" },
            { "id": "input_0", "kind": "type", "locator": "[data-uitrail-id=\"input_0\"]", "description": "input for 'Project name'" },
        ]);
        let candidates = parse_candidates(&value, 20);
        assert_eq!(candidates.len(), 3);
        assert_eq!(candidates[0].id, "btn_0");
        assert_eq!(candidates[0].kind, ActionKind::Click);
        assert_eq!(candidates[2].kind, ActionKind::Type);
    }

    #[test]
    fn truncates_to_max_actions() {
        let rows: Vec<_> = (0..10)
            .map(|i| {
                json!({
                    "id": format!("btn_{i}"),
                    "kind": "click",
                    "locator": format!("[data-uitrail-id=\"btn_{i}\"]"),
                    "description": "button",
                })
            })
            .collect();
        let candidates = parse_candidates(&Value::Array(rows), 4);
        assert_eq!(candidates.len(), 4);
    }

    #[test]
    fn ids_unique_within_scan() {
        let rows: Vec<_> = (0..6)
            .map(|i| {
                json!({
                    "id": format!("btn_{i}"),
                    "kind": "click",
                    "locator": format!("[data-uitrail-id=\"btn_{i}\"]"),
                    "description": "button",
                })
            })
            .collect();
        let candidates = parse_candidates(&Value::Array(rows), 20);
        let mut ids: Vec<_> = candidates.iter().map(|c| c.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), candidates.len());
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let value = json!([
            { "id": "btn_0", "kind": "click", "locator": "[data-uitrail-id=\"btn_0\"]", "description": "ok" },
            { "kind": "click" },
            { "id": "x", "kind": "hover", "locator": "y", "description": "unknown kind" },
            42,
            { "id": "input_0", "kind": "type", "locator": "[data-uitrail-id=\"input_0\"]" },
        ]);
        let candidates = parse_candidates(&value, 20);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].id, "input_0");
        assert_eq!(candidates[1].description, "");
    }

    #[test]
    fn non_array_value_yields_empty() {
        assert!(parse_candidates(&json!(null), 20).is_empty());
        assert!(parse_candidates(&json!("oops"), 20).is_empty());
    }
}
