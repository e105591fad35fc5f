use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PageError;

/// Minimal page capability surface required by the upper layers.
///
/// Every interaction is an awaited suspension point with its own
/// deadline; there is no global per-iteration timeout. Locators are
/// opaque strings produced by whoever enumerated the page (the scanner)
/// and must resolve to exactly one element while that enumeration is
/// still in place.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate to a URL and wait for the load to settle.
    async fn navigate(&self, url: &str, deadline: Duration) -> Result<(), PageError>;

    /// Current page URL.
    async fn current_url(&self) -> Result<String, PageError>;

    /// Full serialized markup of the current document.
    async fn content(&self) -> Result<String, PageError>;

    /// Evaluate a script expression and return its JSON value.
    async fn evaluate(&self, expression: &str) -> Result<Value, PageError>;

    /// Whether the locator currently resolves to a visible element.
    async fn is_visible(&self, locator: &str, deadline: Duration) -> Result<bool, PageError>;

    /// Click the element behind the locator.
    async fn click(&self, locator: &str, deadline: Duration) -> Result<(), PageError>;

    /// Replace the element's current value with the given text.
    async fn fill(&self, locator: &str, text: &str, deadline: Duration)
        -> Result<(), PageError>;

    /// Full-page screenshot as PNG bytes.
    async fn screenshot(&self, deadline: Duration) -> Result<Vec<u8>, PageError>;

    /// Fixed pause letting asynchronous page updates complete before the
    /// next observation.
    async fn settle(&self, duration: Duration);
}
