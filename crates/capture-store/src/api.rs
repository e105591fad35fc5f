use async_trait::async_trait;

use uitrail_core_types::{ChangeResult, FlowId, FlowRecord, FlowStatus, StepRecord};

use crate::CaptureResult;

/// One observed state handed to the sink for durable recording.
#[derive(Clone, Debug)]
pub struct StepCapture {
    /// Short slug, e.g. `before_3` or the decision's label.
    pub label: String,
    /// Free-text description (usually the decision's reason).
    pub description: String,
    /// Page URL at capture time.
    pub url: String,
    /// Change classification of the transition this step observed.
    pub change: Option<ChangeResult>,
    /// Serialized markup.
    pub dom_html: String,
    /// Full-page screenshot bytes (PNG).
    pub screenshot: Vec<u8>,
    /// Optional serialized accessibility snapshot.
    pub snapshot_json: Option<String>,
}

/// Raw byte storage behind the sink (filesystem, object store, ...).
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn save_bytes(&self, key: &str, data: &[u8], content_type: &str) -> CaptureResult<()>;
    async fn get_bytes(&self, key: &str) -> CaptureResult<Vec<u8>>;
}

/// Durable recording boundary called by the action loop.
///
/// Implementations own step-index allocation (1-based, strictly
/// increasing per flow, serialized against concurrent captures) and
/// artifact key derivation. `finish_flow` accepts exactly one terminal
/// transition per flow.
#[async_trait]
pub trait CaptureSink: Send + Sync {
    async fn start_flow(
        &self,
        app_name: &str,
        task_id: &str,
        task_title: &str,
        task_blurb: &str,
    ) -> CaptureResult<FlowRecord>;

    async fn capture_step(&self, flow: &FlowId, capture: StepCapture)
        -> CaptureResult<StepRecord>;

    async fn finish_flow(
        &self,
        flow: &FlowId,
        status: FlowStatus,
        reason: Option<String>,
    ) -> CaptureResult<FlowRecord>;

    /// Current record of a flow.
    async fn flow(&self, flow: &FlowId) -> CaptureResult<FlowRecord>;

    /// Captured steps of a flow, in index order.
    async fn steps(&self, flow: &FlowId) -> CaptureResult<Vec<StepRecord>>;
}
