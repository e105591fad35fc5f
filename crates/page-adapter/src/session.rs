//! Chromium-backed implementation of the page boundary.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::config::PageConfig;
use crate::driver::PageDriver;
use crate::error::PageError;
use crate::PageResult;

/// One live Chromium page plus the browser session that owns it.
///
/// The DevTools event handler runs on a background task for the lifetime
/// of the session; dropping the session aborts it.
pub struct ChromiumPage {
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
}

impl ChromiumPage {
    /// Launch a browser with a persistent profile and open a blank page.
    pub async fn launch(config: &PageConfig) -> PageResult<Self> {
        let user_data_dir = config.resolve_user_data_dir();
        if let Err(err) = std::fs::create_dir_all(&user_data_dir) {
            return Err(PageError::session(format!(
                "cannot create profile dir {}: {err}",
                user_data_dir.display()
            )));
        }

        let mut builder = BrowserConfig::builder()
            .user_data_dir(&user_data_dir)
            .window_size(config.window_width, config.window_height)
            .no_sandbox();
        if !config.headless {
            builder = builder.with_head();
        }
        if let Some(binary) = config.resolve_chrome_binary() {
            builder = builder.chrome_executable(binary);
        }
        let browser_config = builder
            .build()
            .map_err(|err| PageError::session(format!("invalid browser config: {err}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|err| PageError::session(format!("failed to launch browser: {err}")))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(err) = event {
                    warn!(error = %err, "devtools handler error");
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|err| PageError::session(format!("failed to open page: {err}")))?;

        debug!(profile = %user_data_dir.display(), headless = config.headless, "browser session ready");

        Ok(Self {
            browser,
            page,
            handler_task,
        })
    }

    /// Close the browser and stop the event handler.
    pub async fn close(mut self) {
        if let Err(err) = self.browser.close().await {
            warn!(error = %err, "browser close failed");
        }
        self.handler_task.abort();
    }

    async fn find_element(&self, locator: &str) -> PageResult<chromiumoxide::Element> {
        self.page
            .find_element(locator)
            .await
            .map_err(|_| PageError::NotFound(locator.to_string()))
    }
}

impl Drop for ChromiumPage {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}

#[async_trait]
impl PageDriver for ChromiumPage {
    async fn navigate(&self, url: &str, deadline: Duration) -> Result<(), PageError> {
        let navigation = async {
            self.page
                .goto(url)
                .await
                .map_err(|err| PageError::session(format!("navigation to {url} failed: {err}")))?;
            self.page
                .wait_for_navigation()
                .await
                .map_err(|err| PageError::session(format!("load of {url} failed: {err}")))?;
            Ok(())
        };
        timeout(deadline, navigation)
            .await
            .map_err(|_| PageError::timeout(format!("navigate {url}"), deadline))?
    }

    async fn current_url(&self) -> Result<String, PageError> {
        let url = self
            .page
            .url()
            .await
            .map_err(|err| PageError::session(format!("url read failed: {err}")))?;
        Ok(url.unwrap_or_default())
    }

    async fn content(&self) -> Result<String, PageError> {
        self.page
            .content()
            .await
            .map_err(|err| PageError::session(format!("content read failed: {err}")))
    }

    async fn evaluate(&self, expression: &str) -> Result<Value, PageError> {
        let result = self
            .page
            .evaluate(expression)
            .await
            .map_err(|err| PageError::script(format!("evaluate failed: {err}")))?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn is_visible(&self, locator: &str, deadline: Duration) -> Result<bool, PageError> {
        let selector = serde_json::to_string(locator)
            .map_err(|err| PageError::script(format!("bad locator: {err}")))?;
        let expression = format!(
            "(() => {{ const el = document.querySelector({selector}); \
             if (!el) return false; \
             const rect = el.getBoundingClientRect(); \
             const style = window.getComputedStyle(el); \
             return rect.width > 0 && rect.height > 0 \
                && style.display !== 'none' && style.visibility !== 'hidden'; }})()"
        );
        let value = timeout(deadline, self.evaluate(&expression))
            .await
            .map_err(|_| PageError::timeout(format!("visibility check {locator}"), deadline))??;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, locator: &str, deadline: Duration) -> Result<(), PageError> {
        let action = async {
            let element = self.find_element(locator).await?;
            element
                .click()
                .await
                .map_err(|err| PageError::script(format!("click on {locator} failed: {err}")))?;
            Ok(())
        };
        timeout(deadline, action)
            .await
            .map_err(|_| PageError::timeout(format!("click {locator}"), deadline))?
    }

    async fn fill(
        &self,
        locator: &str,
        text: &str,
        deadline: Duration,
    ) -> Result<(), PageError> {
        let action = async {
            let element = self.find_element(locator).await?;
            element
                .focus()
                .await
                .map_err(|err| PageError::script(format!("focus on {locator} failed: {err}")))?;
            // Clear any existing value so fill replaces instead of appends.
            element
                .call_js_fn(
                    "function() { if ('value' in this) { this.value = ''; } else { this.textContent = ''; } }",
                    false,
                )
                .await
                .map_err(|err| PageError::script(format!("clear on {locator} failed: {err}")))?;
            element
                .type_str(text)
                .await
                .map_err(|err| PageError::script(format!("type into {locator} failed: {err}")))?;
            Ok(())
        };
        timeout(deadline, action)
            .await
            .map_err(|_| PageError::timeout(format!("fill {locator}"), deadline))?
    }

    async fn screenshot(&self, deadline: Duration) -> Result<Vec<u8>, PageError> {
        let shot = self
            .page
            .screenshot(ScreenshotParams::builder().full_page(true).build());
        timeout(deadline, shot)
            .await
            .map_err(|_| PageError::timeout("screenshot", deadline))?
            .map_err(|err| PageError::session(format!("screenshot failed: {err}")))
    }

    async fn settle(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
