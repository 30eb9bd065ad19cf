//! Browser automation seam.
//!
//! The publish flow only needs a handful of page operations; they are
//! expressed here as traits so the flow can run against chromiumoxide in
//! production and against scripted sessions in tests.

mod chrome;

pub(crate) use chrome::launch_browser;
pub use chrome::{ChromeDriver, ChromeSession};

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

use crate::errors::AutopostResult;

/// Opens authenticated browser sessions.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Open a session restored from the persisted auth state at `auth_state`.
    ///
    /// Fails with `AuthStateMissing` or `SessionOpen`; nothing needs closing then.
    async fn open(&self, auth_state: &Path) -> AutopostResult<Box<dyn BrowserSession>>;
}

/// One live page. Controls are addressed by CSS selector.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate and wait for the load to finish.
    async fn navigate(&mut self, url: &str) -> AutopostResult<()>;

    /// Wait until `selector` matches an element, up to `timeout`.
    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> AutopostResult<()>;

    /// Type `text` into the element matching `selector`.
    async fn type_text(&mut self, selector: &str, text: &str) -> AutopostResult<()>;

    /// Click the element matching `selector`.
    async fn click(&mut self, selector: &str) -> AutopostResult<()>;

    /// Visible text of the element matching `selector`.
    async fn read_text(&mut self, selector: &str) -> AutopostResult<String>;

    /// Attribute value of the element matching `selector`.
    async fn read_attribute(&mut self, selector: &str, name: &str) -> AutopostResult<Option<String>>;

    /// Release the session.
    async fn close(self: Box<Self>) -> AutopostResult<()>;
}
