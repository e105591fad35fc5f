//! The per-flow state machine.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use capture_store::{simple_capture, CaptureSink};
use decision_policy::DecisionPolicy;
use dom_scanner::scan;
use page_adapter::PageDriver;
use state_diff::diff;
use uitrail_core_types::{
    ActionKind, CandidateAction, ChangeResult, Decision, FlowId, FlowStatus, Task,
};

use crate::config::FlowLoopConfig;
use crate::errors::LoopError;

/// Result of one finished flow execution.
#[derive(Clone, Debug)]
pub struct FlowOutcome {
    pub status: FlowStatus,
    pub status_reason: Option<String>,
    /// Iterations started before the loop terminated.
    pub iterations: u32,
    /// Final rolling history text.
    pub history: String,
}

enum IterationOutcome {
    Continue,
    Stop(FlowStatus, Option<String>),
}

/// Rolling one-line-per-iteration history fed back to the policy.
#[derive(Default)]
struct History {
    text: String,
}

impl History {
    /// Append `"{iteration}. {note}"`, skipping empty notes.
    fn append(&mut self, iteration: u32, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(&format!("{iteration}. {note}"));
    }

    fn summary(&self) -> &str {
        &self.text
    }
}

/// Drives one flow: strictly sequential, one iteration at a time, every
/// page interaction awaited with its own deadline.
pub struct FlowLoop {
    config: FlowLoopConfig,
    page: Arc<dyn PageDriver>,
    policy: Arc<dyn DecisionPolicy>,
    sink: Arc<dyn CaptureSink>,
}

impl FlowLoop {
    pub fn new(
        config: FlowLoopConfig,
        page: Arc<dyn PageDriver>,
        policy: Arc<dyn DecisionPolicy>,
        sink: Arc<dyn CaptureSink>,
    ) -> Self {
        Self {
            config,
            page,
            policy,
            sink,
        }
    }

    pub fn config(&self) -> &FlowLoopConfig {
        &self.config
    }

    /// Run the loop for `task` against the already-started flow record.
    ///
    /// Exactly one terminal status is reported to the sink. A fatal page
    /// failure marks the flow `failed` and is also surfaced to the
    /// caller; every other ending is a normal outcome.
    pub async fn run(&self, task: &Task, flow: &FlowId) -> Result<FlowOutcome, LoopError> {
        if let Err(err) = self
            .page
            .navigate(
                &task.start_url,
                Duration::from_millis(self.config.navigation_timeout_ms),
            )
            .await
        {
            error!(url = %task.start_url, error = %err, "start page could not be established");
            self.finish_quietly(flow, FlowStatus::Failed, Some(err.to_string()))
                .await;
            return Err(err.into());
        }

        let mut history = History::default();
        let mut prev_html: Option<String> = None;
        let mut prev_url: Option<String> = None;

        for iteration in 1..=self.config.max_steps {
            match self
                .run_iteration(
                    task,
                    flow,
                    iteration,
                    &mut history,
                    &mut prev_html,
                    &mut prev_url,
                )
                .await
            {
                Ok(IterationOutcome::Continue) => {}
                Ok(IterationOutcome::Stop(status, reason)) => {
                    self.sink.finish_flow(flow, status, reason.clone()).await?;
                    return Ok(FlowOutcome {
                        status,
                        status_reason: reason,
                        iterations: iteration,
                        history: history.summary().to_string(),
                    });
                }
                Err(err) => {
                    error!(iteration, error = %err, "fatal failure inside iteration");
                    self.finish_quietly(flow, FlowStatus::Failed, Some(err.to_string()))
                        .await;
                    return Err(err);
                }
            }
        }

        self.sink
            .finish_flow(flow, FlowStatus::MaxStepsReached, None)
            .await?;
        Ok(FlowOutcome {
            status: FlowStatus::MaxStepsReached,
            status_reason: None,
            iterations: self.config.max_steps,
            history: history.summary().to_string(),
        })
    }

    async fn run_iteration(
        &self,
        task: &Task,
        flow: &FlowId,
        iteration: u32,
        history: &mut History,
        prev_html: &mut Option<String>,
        prev_url: &mut Option<String>,
    ) -> Result<IterationOutcome, LoopError> {
        let current_url = self.page.current_url().await?;
        let current_html = self.page.content().await?;

        let entry_change = diff(
            prev_html.as_deref(),
            &current_html,
            prev_url.as_deref(),
            &current_url,
            &self.config.diff,
        );
        debug!(
            iteration,
            url = %current_url,
            score = entry_change.score,
            kind = %entry_change.kind,
            "observed state"
        );

        let candidates = scan(self.page.as_ref(), self.config.max_actions).await?;
        if candidates.is_empty() {
            info!(iteration, "no actionable elements; stopping");
            return Ok(IterationOutcome::Stop(
                FlowStatus::NoActions,
                Some("no actionable elements on page".to_string()),
            ));
        }

        let decision = self
            .policy
            .choose_action(task, &candidates, history.summary(), &current_url)
            .await;

        if decision.done {
            if decision.capture_after {
                let label = decision.label.clone().unwrap_or_else(|| "done".to_string());
                self.capture(
                    flow,
                    &label,
                    decision.reason.clone().unwrap_or_default(),
                    &current_url,
                    Some(entry_change),
                    &current_html,
                )
                .await?;
            }
            return Ok(IterationOutcome::Stop(
                FlowStatus::Success,
                decision.reason.clone(),
            ));
        }

        if decision.capture_before {
            let reason = decision.reason.clone().unwrap_or_default();
            self.capture(
                flow,
                &format!("before_{iteration}"),
                format!("Before action: {reason}"),
                &current_url,
                Some(entry_change),
                &current_html,
            )
            .await?;
        }

        // Ids are scan-scoped: re-resolve against this iteration's scan,
        // falling back to the first candidate on a miss.
        let candidate = decision
            .action_id
            .as_deref()
            .and_then(|id| candidates.iter().find(|c| c.id == id))
            .unwrap_or(&candidates[0]);

        let executed = self
            .execute_action(candidate, &decision, history, iteration)
            .await?;
        if !executed {
            // Skipped action: the observation stands, the iteration is
            // spent, the flow moves on.
            *prev_html = Some(current_html);
            *prev_url = Some(current_url);
            return Ok(IterationOutcome::Continue);
        }

        self.page
            .settle(Duration::from_millis(self.config.settle_ms))
            .await;

        let new_html = self.page.content().await?;
        let new_url = self.page.current_url().await?;
        let post_change = diff(
            Some(&current_html),
            &new_html,
            Some(&current_url),
            &new_url,
            &self.config.diff,
        );

        if decision.capture_after {
            let label = decision
                .label
                .clone()
                .unwrap_or_else(|| format!("after_{iteration}"));
            self.capture(
                flow,
                &label,
                decision.reason.clone().unwrap_or_default(),
                &new_url,
                Some(post_change),
                &new_html,
            )
            .await?;
        }

        history.append(iteration, decision.reason.as_deref().unwrap_or(""));
        *prev_html = Some(new_html);
        *prev_url = Some(new_url);
        Ok(IterationOutcome::Continue)
    }

    /// Execute the chosen action. Returns false when the action was
    /// skipped; a skipped action never fails the flow, it just spends
    /// the iteration.
    async fn execute_action(
        &self,
        candidate: &CandidateAction,
        decision: &Decision,
        history: &mut History,
        iteration: u32,
    ) -> Result<bool, LoopError> {
        match decision.kind {
            ActionKind::Click => {
                let visible = self
                    .page
                    .is_visible(
                        &candidate.locator,
                        Duration::from_millis(self.config.visibility_timeout_ms),
                    )
                    .await;
                match visible {
                    Ok(true) => {}
                    Ok(false) => {
                        warn!(id = %candidate.id, "click target no longer visible; skipping");
                        history.append(
                            iteration,
                            &format!("skipped click on {}: target not visible", candidate.description),
                        );
                        return Ok(false);
                    }
                    Err(err) if err.is_fatal() => return Err(err.into()),
                    Err(err) => {
                        warn!(id = %candidate.id, error = %err, "visibility check failed; skipping");
                        history.append(
                            iteration,
                            &format!("skipped click on {}: {err}", candidate.description),
                        );
                        return Ok(false);
                    }
                }

                match self
                    .page
                    .click(
                        &candidate.locator,
                        Duration::from_millis(self.config.click_timeout_ms),
                    )
                    .await
                {
                    Ok(()) => Ok(true),
                    Err(err) if err.is_fatal() => Err(err.into()),
                    Err(err) => {
                        warn!(id = %candidate.id, error = %err, "click failed; skipping");
                        history.append(
                            iteration,
                            &format!("skipped click on {}: {err}", candidate.description),
                        );
                        Ok(false)
                    }
                }
            }
            ActionKind::Type => {
                let text = decision.text.clone().unwrap_or_default();
                match self
                    .page
                    .fill(
                        &candidate.locator,
                        &text,
                        Duration::from_millis(self.config.fill_timeout_ms),
                    )
                    .await
                {
                    Ok(()) => Ok(true),
                    Err(err) if err.is_fatal() => Err(err.into()),
                    Err(err) => {
                        warn!(id = %candidate.id, error = %err, "fill failed; skipping");
                        history.append(
                            iteration,
                            &format!("skipped typing into {}: {err}", candidate.description),
                        );
                        Ok(false)
                    }
                }
            }
        }
    }

    /// Capture the current state. Screenshot timeouts and sink failures
    /// are logged and swallowed; only a dead session propagates.
    async fn capture(
        &self,
        flow: &FlowId,
        label: &str,
        description: String,
        url: &str,
        change: Option<ChangeResult>,
        dom_html: &str,
    ) -> Result<(), LoopError> {
        let screenshot = match self
            .page
            .screenshot(Duration::from_millis(self.config.screenshot_timeout_ms))
            .await
        {
            Ok(bytes) => bytes,
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                warn!(label, error = %err, "screenshot failed; skipping capture");
                return Ok(());
            }
        };

        if let Err(err) = self
            .sink
            .capture_step(
                flow,
                simple_capture(label, description, url, change, dom_html, screenshot),
            )
            .await
        {
            warn!(label, error = %err, "step capture failed");
        }
        Ok(())
    }

    /// Best-effort terminal transition on the fatal path; the original
    /// error is the one worth surfacing.
    async fn finish_quietly(&self, flow: &FlowId, status: FlowStatus, reason: Option<String>) {
        if let Err(err) = self.sink.finish_flow(flow, status, reason).await {
            warn!(flow = %flow, error = %err, "could not record terminal status");
        }
    }
}
