//! Capture store implementation over a pluggable blob backend.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tracing::info;

use uitrail_core_types::{ChangeResult, FlowId, FlowRecord, FlowStatus, StepRecord};

use crate::api::{BlobStore, CaptureSink, StepCapture};
use crate::blob::{FsBlobStore, MemoryBlobStore};
use crate::errors::CaptureError;
use crate::keys;
use crate::CaptureResult;

struct FlowEntry {
    record: FlowRecord,
    next_index: u32,
    steps: Vec<StepRecord>,
}

/// Flow/step index plus artifact persistence.
///
/// The index lock serializes step-index allocation per flow; blob writes
/// happen outside the lock, keyed by the already-allocated index, so
/// concurrent captures to one flow interleave safely.
pub struct CaptureStore<B: BlobStore> {
    blobs: Arc<B>,
    flows: Mutex<HashMap<FlowId, FlowEntry>>,
}

/// Filesystem-backed sink (blobs + JSON records under one root).
pub type FsCaptureStore = CaptureStore<FsBlobStore>;

/// Fully in-memory sink for tests.
pub type MemoryCaptureStore = CaptureStore<MemoryBlobStore>;

impl FsCaptureStore {
    pub fn new(root: impl Into<std::path::PathBuf>) -> Self {
        Self::with_blobs(Arc::new(FsBlobStore::new(root)))
    }
}

impl MemoryCaptureStore {
    pub fn in_memory() -> Self {
        Self::with_blobs(Arc::new(MemoryBlobStore::new()))
    }
}

impl<B: BlobStore> CaptureStore<B> {
    pub fn with_blobs(blobs: Arc<B>) -> Self {
        Self {
            blobs,
            flows: Mutex::new(HashMap::new()),
        }
    }

    pub fn blobs(&self) -> &Arc<B> {
        &self.blobs
    }

    async fn persist_flow_record(&self, record: &FlowRecord) -> CaptureResult<()> {
        let key = keys::flow_record_key(&record.prefix);
        let json = serde_json::to_vec_pretty(record)
            .map_err(|err| CaptureError::Serialize(err.to_string()))?;
        self.blobs
            .save_bytes(&key, &json, "application/json")
            .await
    }
}

#[async_trait]
impl<B: BlobStore> CaptureSink for CaptureStore<B> {
    async fn start_flow(
        &self,
        app_name: &str,
        task_id: &str,
        task_title: &str,
        task_blurb: &str,
    ) -> CaptureResult<FlowRecord> {
        let started_at = Utc::now();
        let run_id = keys::run_id(started_at);
        let record = FlowRecord {
            id: FlowId::new(),
            app_name: app_name.to_string(),
            task_id: task_id.to_string(),
            task_title: task_title.to_string(),
            task_blurb: task_blurb.to_string(),
            prefix: keys::flow_prefix(app_name, task_id, &run_id),
            run_id,
            status: FlowStatus::Running,
            status_reason: None,
            started_at,
            finished_at: None,
        };

        self.flows.lock().insert(
            record.id.clone(),
            FlowEntry {
                record: record.clone(),
                next_index: 1,
                steps: Vec::new(),
            },
        );

        self.persist_flow_record(&record).await?;
        info!(flow = %record.id, prefix = %record.prefix, "flow started");
        Ok(record)
    }

    async fn capture_step(
        &self,
        flow: &FlowId,
        capture: StepCapture,
    ) -> CaptureResult<StepRecord> {
        // Allocate the index under the lock; everything else is keyed by
        // it and can proceed outside.
        let (index, prefix) = {
            let mut flows = self.flows.lock();
            let entry = flows
                .get_mut(flow)
                .ok_or_else(|| CaptureError::UnknownFlow(flow.clone()))?;
            if entry.record.status.is_terminal() {
                return Err(CaptureError::AlreadyFinished {
                    flow: flow.clone(),
                    status: entry.record.status,
                });
            }
            let index = entry.next_index;
            entry.next_index += 1;
            (index, entry.record.prefix.clone())
        };

        let screenshot_key = keys::screenshot_key(&prefix, index);
        let dom_key = keys::dom_key(&prefix, index);

        self.blobs
            .save_bytes(&screenshot_key, &capture.screenshot, "image/png")
            .await?;
        self.blobs
            .save_bytes(&dom_key, capture.dom_html.as_bytes(), "text/html")
            .await?;

        let snapshot_key = match &capture.snapshot_json {
            Some(snapshot) => {
                let key = keys::snapshot_key(&prefix, index);
                self.blobs
                    .save_bytes(&key, snapshot.as_bytes(), "application/json")
                    .await?;
                Some(key)
            }
            None => None,
        };

        let step = StepRecord {
            flow_id: flow.clone(),
            index,
            label: capture.label,
            description: capture.description,
            url: capture.url,
            change: capture.change,
            screenshot_key,
            dom_key,
            snapshot_key,
            captured_at: Utc::now(),
        };

        let record_key = keys::step_record_key(&prefix, index);
        let json = serde_json::to_vec_pretty(&step)
            .map_err(|err| CaptureError::Serialize(err.to_string()))?;
        self.blobs
            .save_bytes(&record_key, &json, "application/json")
            .await?;

        self.flows
            .lock()
            .get_mut(flow)
            .ok_or_else(|| CaptureError::UnknownFlow(flow.clone()))?
            .steps
            .push(step.clone());

        info!(flow = %flow, index, label = %step.label, "step captured");
        Ok(step)
    }

    async fn finish_flow(
        &self,
        flow: &FlowId,
        status: FlowStatus,
        reason: Option<String>,
    ) -> CaptureResult<FlowRecord> {
        let record = {
            let mut flows = self.flows.lock();
            let entry = flows
                .get_mut(flow)
                .ok_or_else(|| CaptureError::UnknownFlow(flow.clone()))?;
            if entry.record.status.is_terminal() {
                return Err(CaptureError::AlreadyFinished {
                    flow: flow.clone(),
                    status: entry.record.status,
                });
            }
            entry.record.status = status;
            entry.record.status_reason = reason;
            entry.record.finished_at = Some(Utc::now());
            entry.record.clone()
        };

        self.persist_flow_record(&record).await?;
        info!(flow = %flow, status = %status, "flow finished");
        Ok(record)
    }

    async fn flow(&self, flow: &FlowId) -> CaptureResult<FlowRecord> {
        self.flows
            .lock()
            .get(flow)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| CaptureError::UnknownFlow(flow.clone()))
    }

    async fn steps(&self, flow: &FlowId) -> CaptureResult<Vec<StepRecord>> {
        self.flows
            .lock()
            .get(flow)
            .map(|entry| entry.steps.clone())
            .ok_or_else(|| CaptureError::UnknownFlow(flow.clone()))
    }
}

/// Convenience capture of a plain transition with no snapshot artifact.
pub fn simple_capture(
    label: impl Into<String>,
    description: impl Into<String>,
    url: impl Into<String>,
    change: Option<ChangeResult>,
    dom_html: impl Into<String>,
    screenshot: Vec<u8>,
) -> StepCapture {
    StepCapture {
        label: label.into(),
        description: description.into(),
        url: url.into(),
        change,
        dom_html: dom_html.into(),
        screenshot,
        snapshot_json: None,
    }
}
