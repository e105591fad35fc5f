use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the page boundary.
///
/// Only [`PageError::Session`] is fatal to a flow; timeouts and missing
/// elements are expected UI flakiness the loop recovers from locally.
#[derive(Debug, Error)]
pub enum PageError {
    /// An interaction did not complete within its deadline.
    #[error("page operation '{op}' timed out after {after:?}")]
    Timeout { op: String, after: Duration },

    /// The locator resolved to no element on the current page.
    #[error("no element matches locator '{0}'")]
    NotFound(String),

    /// Injected script evaluation failed or returned an unusable value.
    #[error("script evaluation failed: {0}")]
    Script(String),

    /// The browser session itself is unusable.
    #[error("browser session failure: {0}")]
    Session(String),
}

impl PageError {
    pub fn timeout(op: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            op: op.into(),
            after,
        }
    }

    pub fn script(message: impl Into<String>) -> Self {
        Self::Script(message.into())
    }

    pub fn session(message: impl Into<String>) -> Self {
        Self::Session(message.into())
    }

    /// Whether this error should abort the whole flow.
    pub fn is_fatal(&self) -> bool {
        matches!(self, PageError::Session(_))
    }
}
