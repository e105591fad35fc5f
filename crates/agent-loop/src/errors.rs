use thiserror::Error;

use capture_store::CaptureError;
use page_adapter::PageError;

/// Fatal failures of one flow execution.
///
/// Everything recoverable (flaky elements, malformed policy output,
/// empty pages, exhausted budgets) is absorbed inside the loop and ends
/// up as a flow status instead; only an unusable page/browser session or
/// a sink that cannot even start a flow surfaces here.
#[derive(Debug, Error)]
pub enum LoopError {
    #[error("page boundary failure: {0}")]
    Page(#[from] PageError),

    #[error("capture sink failure: {0}")]
    Capture(#[from] CaptureError),
}
