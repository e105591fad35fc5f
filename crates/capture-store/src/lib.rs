//! Capture sink: durable recording of flows, steps and their artifacts.
//!
//! The sink exclusively owns step-index allocation and artifact key
//! derivation; the action loop only hands over what it observed. Flow
//! records move through exactly one terminal status transition.

pub mod api;
pub mod blob;
pub mod errors;
pub mod keys;
pub mod store;

pub use api::{BlobStore, CaptureSink, StepCapture};
pub use blob::{FsBlobStore, MemoryBlobStore};
pub use errors::CaptureError;
pub use store::{simple_capture, CaptureStore, FsCaptureStore, MemoryCaptureStore};

pub type CaptureResult<T> = Result<T, CaptureError>;
