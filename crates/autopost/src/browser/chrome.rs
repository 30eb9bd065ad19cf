//! chromiumoxide-backed browser driver.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::Page;
use futures::StreamExt;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::auth::AuthState;
use crate::errors::{AutopostError, AutopostResult};

use super::{BrowserDriver, BrowserSession};

/// How often `wait_for` re-queries the DOM.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Launch Chromium and spawn its CDP handler task.
pub(crate) async fn launch_browser(headless: bool) -> AutopostResult<(Browser, JoinHandle<()>)> {
    let mut builder = BrowserConfig::builder()
        .arg("--no-sandbox") // Required for containerized environments
        .arg("--disable-dev-shm-usage") // Avoid /dev/shm size issues in containers
        .window_size(1280, 900);
    if !headless {
        builder = builder.with_head();
    }
    let config = builder
        .build()
        .map_err(|e| AutopostError::Browser(format!("Failed to build browser config: {e}")))?;

    let (browser, mut handler) = Browser::launch(config).await?;

    let handle = tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    });

    Ok((browser, handle))
}

/// Opens Chromium sessions with cookies restored from the auth state.
pub struct ChromeDriver {
    headless: bool,
    /// Page opened first so cookies have a domain context.
    home_url: String,
    navigation_timeout: Duration,
}

impl ChromeDriver {
    #[must_use]
    pub fn new(headless: bool, home_url: impl Into<String>) -> Self {
        Self {
            headless,
            home_url: home_url.into(),
            navigation_timeout: Duration::from_secs(45),
        }
    }

    #[must_use]
    pub fn with_navigation_timeout(mut self, timeout: Duration) -> Self {
        self.navigation_timeout = timeout;
        self
    }

    async fn start(&self, state: &AuthState) -> AutopostResult<ChromeSession> {
        let (mut browser, handle) = launch_browser(self.headless).await?;

        let page = match self.restore_cookies(&browser, state).await {
            Ok(page) => page,
            Err(e) => {
                let _ = browser.close().await;
                let _ = handle.await;
                return Err(e);
            }
        };

        Ok(ChromeSession {
            browser,
            handle,
            page,
            navigation_timeout: self.navigation_timeout,
        })
    }

    async fn restore_cookies(&self, browser: &Browser, state: &AuthState) -> AutopostResult<Page> {
        tracing::debug!(url = %self.home_url, "Opening home page to set cookies");
        let page = browser.new_page(self.home_url.as_str()).await?;

        for cookie in &state.cookies {
            let param = CookieParam::builder()
                .name(cookie.name.as_str())
                .value(cookie.value.as_str())
                .domain(cookie.domain.as_str())
                .path(cookie.path.as_str())
                .secure(cookie.secure)
                .http_only(cookie.http_only)
                .build()
                .map_err(|e| AutopostError::Browser(format!("Failed to build cookie: {e}")))?;
            page.set_cookie(param).await?;
        }

        tracing::debug!(cookies = state.cookies.len(), "Restored session cookies");
        Ok(page)
    }
}

#[async_trait]
impl BrowserDriver for ChromeDriver {
    async fn open(&self, auth_state: &Path) -> AutopostResult<Box<dyn BrowserSession>> {
        let state = match AuthState::load(auth_state) {
            Ok(s) => s,
            Err(e @ AutopostError::AuthStateMissing { .. }) => return Err(e),
            Err(e) => {
                return Err(AutopostError::SessionOpen {
                    reason: format!("unreadable auth state: {e}"),
                })
            }
        };

        tracing::info!(headless = self.headless, "Launching browser");
        let session = self
            .start(&state)
            .await
            .map_err(|e| AutopostError::SessionOpen {
                reason: e.to_string(),
            })?;
        Ok(Box::new(session))
    }
}

/// A live Chromium page.
pub struct ChromeSession {
    browser: Browser,
    handle: JoinHandle<()>,
    page: Page,
    navigation_timeout: Duration,
}

#[async_trait]
impl BrowserSession for ChromeSession {
    async fn navigate(&mut self, url: &str) -> AutopostResult<()> {
        tracing::debug!(url, "Navigating");
        tokio::time::timeout(self.navigation_timeout, self.page.goto(url))
            .await
            .map_err(|_| AutopostError::Timeout {
                what: format!("navigation to {url}"),
            })??;
        Ok(())
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> AutopostResult<()> {
        let page = &self.page;
        let poll = async {
            loop {
                if page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(POLL_INTERVAL).await;
            }
        };
        tokio::time::timeout(timeout, poll)
            .await
            .map_err(|_| AutopostError::Timeout {
                what: selector.to_string(),
            })
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> AutopostResult<()> {
        self.page.find_element(selector).await?.type_str(text).await?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> AutopostResult<()> {
        self.page.find_element(selector).await?.click().await?;
        Ok(())
    }

    async fn read_text(&mut self, selector: &str) -> AutopostResult<String> {
        let text = self.page.find_element(selector).await?.inner_text().await?;
        Ok(text.unwrap_or_default())
    }

    async fn read_attribute(&mut self, selector: &str, name: &str) -> AutopostResult<Option<String>> {
        let value = self
            .page
            .find_element(selector)
            .await?
            .attribute(name)
            .await?;
        Ok(value)
    }

    async fn close(self: Box<Self>) -> AutopostResult<()> {
        let Self {
            mut browser,
            handle,
            ..
        } = *self;
        browser.close().await?;
        handle
            .await
            .map_err(|e| AutopostError::Browser(format!("Browser handler task failed: {e}")))?;
        tracing::debug!("Browser closed");
        Ok(())
    }
}
