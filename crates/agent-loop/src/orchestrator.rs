//! Entry point tying the boundaries together for one task run.

use std::sync::Arc;

use tracing::info;

use capture_store::CaptureSink;
use decision_policy::DecisionPolicy;
use page_adapter::PageDriver;
use uitrail_core_types::{FlowRecord, Task};

use crate::config::FlowLoopConfig;
use crate::errors::LoopError;
use crate::runner::{FlowLoop, FlowOutcome};

/// The three boundaries a flow run needs.
#[derive(Clone)]
pub struct LoopDeps {
    pub page: Arc<dyn PageDriver>,
    pub policy: Arc<dyn DecisionPolicy>,
    pub sink: Arc<dyn CaptureSink>,
}

/// Report returned to the caller after a run.
#[derive(Clone, Debug)]
pub struct TaskReport {
    pub flow: FlowRecord,
    pub outcome: FlowOutcome,
}

/// Start a flow record, run the loop to its terminal status and return
/// the final record plus outcome.
pub async fn run_task(
    task: &Task,
    deps: &LoopDeps,
    config: &FlowLoopConfig,
) -> Result<TaskReport, LoopError> {
    let record = deps
        .sink
        .start_flow(
            &task.app_name,
            task.task_id(),
            &task.goal,
            &format!("Auto run for query: {}", task.raw_query),
        )
        .await?;
    let flow_id = record.id.clone();
    info!(
        flow = %flow_id,
        app = %task.app_name,
        prefix = %record.prefix,
        "flow started"
    );

    let runner = FlowLoop::new(
        config.clone(),
        deps.page.clone(),
        deps.policy.clone(),
        deps.sink.clone(),
    );
    let outcome = runner.run(task, &flow_id).await?;

    let flow = deps.sink.flow(&flow_id).await?;
    info!(
        flow = %flow_id,
        status = %flow.status,
        iterations = outcome.iterations,
        "flow finished"
    );
    Ok(TaskReport { flow, outcome })
}
