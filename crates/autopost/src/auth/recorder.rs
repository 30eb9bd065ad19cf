//! Interactive login recording using chromiumoxide.

use chrono::Utc;
use std::path::Path;
use std::time::Duration;

use crate::browser::launch_browser;
use crate::errors::{AutopostError, AutopostResult};

use super::state::{AuthState, StoredCookie};

/// Cookie that proves the session is logged in.
const AUTH_COOKIE: &str = "auth_token";

/// Records an authenticated browser state for later unattended runs.
pub struct AuthRecorder {
    login_url: String,
}

impl AuthRecorder {
    #[must_use]
    pub fn new(login_url: impl Into<String>) -> Self {
        Self {
            login_url: login_url.into(),
        }
    }

    /// Open a visible browser, wait for the operator to log in, then save cookies to `output`.
    pub async fn record(&self, output: &Path) -> AutopostResult<AuthState> {
        tracing::info!(url = %self.login_url, "Launching browser for login");

        let (mut browser, handle) = launch_browser(false).await?;
        let page = browser.new_page(self.login_url.as_str()).await?;

        println!("\n🔐 Please log in in the browser window.");
        println!("   Press Enter when you're done...\n");

        let mut input = String::new();
        tokio::task::spawn_blocking(move || std::io::stdin().read_line(&mut input))
            .await
            .map_err(|e| AutopostError::Browser(format!("Failed to wait for operator: {e}")))??;

        // Wait a bit for cookies to settle
        tokio::time::sleep(Duration::from_secs(2)).await;

        // CDP sees HttpOnly cookies that document.cookie cannot
        let cookies = page.get_cookies().await?;

        browser.close().await?;
        let _ = handle.await;

        let state = AuthState {
            cookies: cookies
                .into_iter()
                .map(|c| StoredCookie {
                    name: c.name,
                    value: c.value,
                    domain: c.domain,
                    path: c.path,
                    expires: Some(c.expires),
                    http_only: c.http_only,
                    secure: c.secure,
                })
                .collect(),
            recorded_at: Some(Utc::now()),
        };

        if !state.has_cookie(AUTH_COOKIE) {
            return Err(AutopostError::Browser(format!(
                "No {AUTH_COOKIE} cookie captured - login may have failed"
            )));
        }

        state.save(output)?;
        tracing::info!(
            path = %output.display(),
            cookies = state.cookies.len(),
            "Saved auth state"
        );
        Ok(state)
    }
}
