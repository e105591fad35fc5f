//! End-to-end loop scenarios against an in-process fake page.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use agent_loop::{run_task, FlowLoopConfig, LoopDeps, LoopError};
use capture_store::{CaptureSink, MemoryCaptureStore};
use decision_policy::{DecisionProposal, FallbackPolicy, ScriptedPolicy};
use page_adapter::{PageDriver, PageError};
use uitrail_core_types::{FlowStatus, Task};

struct PageState {
    url: String,
    html: String,
    scans: usize,
    clicks: u32,
    fills: Vec<String>,
}

/// Scriptable page double: each scan serves the next queued candidate
/// batch (the last batch repeats once the queue runs out), clicks mutate
/// the markup so the differ sees real change.
struct FakePage {
    state: Mutex<PageState>,
    scan_batches: Vec<Value>,
    visible: bool,
    fail_navigate: bool,
}

impl FakePage {
    fn new(scan_batches: Vec<Value>) -> Self {
        Self {
            state: Mutex::new(PageState {
                url: String::new(),
                html: "<html><body><button>New</button></body></html>".to_string(),
                scans: 0,
                clicks: 0,
                fills: Vec::new(),
            }),
            scan_batches,
            visible: true,
            fail_navigate: false,
        }
    }

    fn invisible(mut self) -> Self {
        self.visible = false;
        self
    }

    fn failing_navigation(mut self) -> Self {
        self.fail_navigate = true;
        self
    }

    fn clicks(&self) -> u32 {
        self.state.lock().unwrap().clicks
    }

    fn fills(&self) -> Vec<String> {
        self.state.lock().unwrap().fills.clone()
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, url: &str, _deadline: Duration) -> Result<(), PageError> {
        if self.fail_navigate {
            return Err(PageError::timeout("navigate", Duration::from_millis(1)));
        }
        self.state.lock().unwrap().url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, PageError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn content(&self) -> Result<String, PageError> {
        Ok(self.state.lock().unwrap().html.clone())
    }

    async fn evaluate(&self, _expression: &str) -> Result<Value, PageError> {
        let mut state = self.state.lock().unwrap();
        let index = state.scans.min(self.scan_batches.len().saturating_sub(1));
        state.scans += 1;
        Ok(self
            .scan_batches
            .get(index)
            .cloned()
            .unwrap_or_else(|| json!([])))
    }

    async fn is_visible(&self, _locator: &str, _deadline: Duration) -> Result<bool, PageError> {
        Ok(self.visible)
    }

    async fn click(&self, _locator: &str, _deadline: Duration) -> Result<(), PageError> {
        let mut state = self.state.lock().unwrap();
        state.clicks += 1;
        let marker = format!("<button>added {}</button>", state.clicks);
        let html = state.html.replace("</body>", &format!("{marker}</body>"));
        state.html = html;
        Ok(())
    }

    async fn fill(&self, _locator: &str, text: &str, _deadline: Duration) -> Result<(), PageError> {
        self.state.lock().unwrap().fills.push(text.to_string());
        Ok(())
    }

    async fn screenshot(&self, _deadline: Duration) -> Result<Vec<u8>, PageError> {
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn settle(&self, _duration: Duration) {}
}

fn button_batch(ids: &[&str]) -> Value {
    Value::Array(
        ids.iter()
            .map(|id| {
                json!({
                    "id": id,
                    "kind": "click",
                    "locator": format!("[data-uitrail-id=\"{id}\"]"),
                    "description": format!("button with text '{id}'"),
                })
            })
            .collect(),
    )
}

fn task() -> Task {
    Task::from_query("linear: create project for TES").with_start_url("https://linear.app")
}

fn deps(page: Arc<FakePage>, policy: Arc<dyn decision_policy::DecisionPolicy>) -> LoopDeps {
    LoopDeps {
        page,
        policy,
        sink: Arc::new(MemoryCaptureStore::in_memory()),
    }
}

#[tokio::test]
async fn empty_page_ends_as_no_actions_with_zero_captures() {
    let page = Arc::new(FakePage::new(vec![json!([])]));
    let deps = deps(page.clone(), Arc::new(FallbackPolicy));

    let report = run_task(&task(), &deps, &FlowLoopConfig::minimal())
        .await
        .expect("flow should end normally");

    assert_eq!(report.flow.status, FlowStatus::NoActions);
    assert_eq!(report.outcome.iterations, 1);
    assert_eq!(page.clicks(), 0);
    let steps = deps.sink.steps(&report.flow.id).await.unwrap();
    assert!(steps.is_empty());
}

#[tokio::test]
async fn budget_exhaustion_ends_as_max_steps_reached() {
    let page = Arc::new(FakePage::new(vec![button_batch(&["btn_0"])]));
    let deps = deps(page.clone(), Arc::new(FallbackPolicy));
    let config = FlowLoopConfig::minimal().max_steps(3);

    let report = run_task(&task(), &deps, &config).await.unwrap();

    assert_eq!(report.flow.status, FlowStatus::MaxStepsReached);
    assert_eq!(report.outcome.iterations, 3);
    assert_eq!(page.clicks(), 3);

    // Fallback decisions capture before and after each action.
    let steps = deps.sink.steps(&report.flow.id).await.unwrap();
    assert_eq!(steps.len(), 6);
    let indices: Vec<u32> = steps.iter().map(|s| s.index).collect();
    assert_eq!(indices, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn done_decision_ends_as_success_with_final_capture() {
    let page = Arc::new(FakePage::new(vec![button_batch(&["btn_0", "btn_1"])]));
    let policy = ScriptedPolicy::new([
        DecisionProposal::click("btn_1"),
        DecisionProposal::done_with_label("final_state"),
    ]);
    let deps = deps(page.clone(), Arc::new(policy));

    let report = run_task(&task(), &deps, &FlowLoopConfig::minimal()).await.unwrap();

    assert_eq!(report.flow.status, FlowStatus::Success);
    assert_eq!(report.outcome.iterations, 2);
    assert_eq!(page.clicks(), 1);

    let steps = deps.sink.steps(&report.flow.id).await.unwrap();
    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].label, "before_1");
    assert_eq!(steps[1].label, "after_action_btn_1");
    assert_eq!(steps.last().unwrap().label, "final_state");

    // The first observation has no predecessor and scores as a full change.
    let first_change = steps[0].change.as_ref().expect("change attached");
    assert!((first_change.score - 1.0).abs() < f64::EPSILON);
    assert_eq!(first_change.summary, "Initial state");
}

#[tokio::test]
async fn invisible_target_skips_iteration_without_failing_flow() {
    let page = Arc::new(FakePage::new(vec![button_batch(&["btn_0"])]).invisible());
    let deps = deps(page.clone(), Arc::new(FallbackPolicy));
    let config = FlowLoopConfig::minimal().max_steps(2);

    let report = run_task(&task(), &deps, &config).await.unwrap();

    assert_eq!(report.flow.status, FlowStatus::MaxStepsReached);
    assert_eq!(page.clicks(), 0);
    assert!(report.outcome.history.contains("target not visible"));

    // Only the before captures exist; skipped actions take no after shot.
    let steps = deps.sink.steps(&report.flow.id).await.unwrap();
    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|s| s.label.starts_with("before_")));
}

#[tokio::test]
async fn type_decision_fills_text() {
    let batch = json!([
        {
            "id": "input_0",
            "kind": "type",
            "locator": "[data-uitrail-id=\"input_0\"]",
            "description": "input for 'Project name'",
        }
    ]);
    let page = Arc::new(FakePage::new(vec![batch]));
    let policy = ScriptedPolicy::new([
        DecisionProposal {
            action_id: Some("input_0".into()),
            text: Some("Apollo".into()),
            ..Default::default()
        },
        DecisionProposal::done_with_label("named"),
    ]);
    let deps = deps(page.clone(), Arc::new(policy));

    let report = run_task(&task(), &deps, &FlowLoopConfig::minimal()).await.unwrap();

    assert_eq!(report.flow.status, FlowStatus::Success);
    assert_eq!(page.fills(), vec!["Apollo".to_string()]);
}

#[tokio::test]
async fn navigation_failure_surfaces_and_marks_flow_failed() {
    let page = Arc::new(FakePage::new(vec![button_batch(&["btn_0"])]).failing_navigation());
    let deps = deps(page.clone(), Arc::new(FallbackPolicy));

    let err = run_task(&task(), &deps, &FlowLoopConfig::minimal())
        .await
        .expect_err("navigation failure must surface");
    assert!(matches!(err, LoopError::Page(_)));
    assert_eq!(page.clicks(), 0);
}
