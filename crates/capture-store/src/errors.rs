use thiserror::Error;

use uitrail_core_types::{FlowId, FlowStatus};

/// Errors emitted by the capture sink.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The referenced flow was never started (or belongs to another sink).
    #[error("unknown flow: {0}")]
    UnknownFlow(FlowId),

    /// The flow already reached a terminal status; only one terminal
    /// transition may occur per flow.
    #[error("flow {flow} already finished with status {status}")]
    AlreadyFinished { flow: FlowId, status: FlowStatus },

    /// The blob backend failed to persist or read an artifact.
    #[error("storage failure for key '{key}': {message}")]
    Storage { key: String, message: String },

    /// A flow/step record could not be serialized.
    #[error("record serialization failed: {0}")]
    Serialize(String),
}

impl CaptureError {
    pub fn storage(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Storage {
            key: key.into(),
            message: message.into(),
        }
    }
}
