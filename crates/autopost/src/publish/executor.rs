//! Publish state machine.

use std::sync::Arc;

use crate::browser::{BrowserDriver, BrowserSession};
use crate::errors::{AutopostError, AutopostResult};

use super::reference::resolve_status_url;
use super::{PublishConfig, PublishOutcome, PublishStage, SITE_URL};

/// Drives one browser session through compose, submit and confirmation.
pub struct Publisher {
    driver: Arc<dyn BrowserDriver>,
    config: PublishConfig,
}

impl Publisher {
    #[must_use]
    pub fn new(driver: Arc<dyn BrowserDriver>, config: PublishConfig) -> Self {
        Self { driver, config }
    }

    #[must_use]
    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Publish `text`.
    ///
    /// Only a failure to open the session is returned as an error. Everything
    /// after that is logged and folded into [`PublishOutcome::Unresolved`],
    /// and the session is always closed.
    pub async fn publish(&self, text: &str) -> AutopostResult<PublishOutcome> {
        tracing::info!(stage = %PublishStage::SessionStart, "Opening browser session");
        let mut session = self.driver.open(&self.config.auth_state).await?;

        let outcome = self.drive(session.as_mut(), text).await;

        tracing::info!(stage = %PublishStage::Done, "Closing browser session");
        if let Err(e) = session.close().await {
            tracing::warn!(error = %e, "Failed to close browser session cleanly");
        }

        Ok(outcome)
    }

    async fn drive(&self, session: &mut dyn BrowserSession, text: &str) -> PublishOutcome {
        let mut reached = PublishStage::SessionStart;

        if let Err(e) = self.submit(session, text, &mut reached).await {
            tracing::error!(
                reached = %reached,
                error = %e,
                "Publishing aborted before submit completed"
            );
            return PublishOutcome::Unresolved { reached };
        }

        tracing::info!(stage = %PublishStage::ConfirmationSearch, "Looking for confirmation");
        let search = tokio::time::timeout(self.config.confirmation_timeout, self.confirm(session));
        match search.await {
            Ok(Ok(Some(url))) => {
                tracing::info!(url = %url, "Resolved published post");
                PublishOutcome::Resolved(url)
            }
            Ok(Ok(None)) => PublishOutcome::Unresolved {
                reached: PublishStage::ConfirmationSearch,
            },
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Confirmation search failed; post reference unknown");
                PublishOutcome::Unresolved {
                    reached: PublishStage::ConfirmationSearch,
                }
            }
            Err(_) => {
                tracing::warn!(
                    timeout = ?self.config.confirmation_timeout,
                    "Confirmation search timed out; post reference unknown"
                );
                PublishOutcome::Unresolved {
                    reached: PublishStage::ConfirmationSearch,
                }
            }
        }
    }

    async fn submit(
        &self,
        session: &mut dyn BrowserSession,
        text: &str,
        reached: &mut PublishStage,
    ) -> AutopostResult<()> {
        let selectors = &self.config.selectors;

        session.navigate(&self.config.compose_url).await?;
        session
            .wait_for(&selectors.compose_textbox, self.config.compose_timeout)
            .await?;
        *reached = PublishStage::ComposeReady;
        tracing::info!(stage = %reached, "Compose box ready");

        session.click(&selectors.compose_textbox).await?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            session
                .type_text(&selectors.compose_textbox, ch.encode_utf8(&mut buf))
                .await?;
            let delay = self.config.typing.next_delay(&mut rand::thread_rng());
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
        }
        *reached = PublishStage::Typed;
        tracing::info!(stage = %reached, chars = text.chars().count(), "Typed post");

        session.click(&selectors.submit_button).await?;
        *reached = PublishStage::Submitted;
        tracing::info!(stage = %reached, "Submitted post");

        Ok(())
    }

    /// Look for the success toast, then read the newest post's link.
    async fn confirm(&self, session: &mut dyn BrowserSession) -> AutopostResult<Option<String>> {
        let selectors = &self.config.selectors;

        session
            .wait_for(&selectors.toast, self.config.confirmation_timeout)
            .await?;
        let toast = session.read_text(&selectors.toast).await?;
        if !self.config.is_success_message(&toast) {
            tracing::warn!(toast = %toast, "Toast did not report success");
            return Ok(None);
        }
        tracing::info!(toast = %toast, "Post confirmed");

        tokio::time::sleep(self.config.settle_pause).await;

        session.navigate(&self.config.profile_url()).await?;
        session
            .wait_for(&selectors.first_post_link, self.config.confirmation_timeout)
            .await?;
        let href = session
            .read_attribute(&selectors.first_post_link, "href")
            .await?
            .ok_or_else(|| AutopostError::Browser("post link has no href".to_string()))?;

        match resolve_status_url(SITE_URL, &href) {
            Some(url) => Ok(Some(url)),
            None => {
                tracing::warn!(href = %href, "Newest post link is not a status URL");
                Ok(None)
            }
        }
    }
}
