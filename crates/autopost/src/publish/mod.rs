//! Publishing through the browser: compose, submit, confirm.

mod executor;
mod pacing;
mod reference;

pub use executor::Publisher;
pub use pacing::TypingPacing;
pub use reference::resolve_status_url;

use std::path::PathBuf;
use std::time::Duration;

/// Base URL of the publishing site.
pub const SITE_URL: &str = "https://x.com";

/// Stages of one publish attempt, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PublishStage {
    SessionStart,
    ComposeReady,
    Typed,
    Submitted,
    ConfirmationSearch,
    Done,
}

impl std::fmt::Display for PublishStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::SessionStart => "session-start",
            Self::ComposeReady => "compose-ready",
            Self::Typed => "typed",
            Self::Submitted => "submitted",
            Self::ConfirmationSearch => "confirmation-search",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What the publisher could establish about the post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Public URL of the new post.
    Resolved(String),
    /// No URL. `reached` is the last stage that completed.
    Unresolved { reached: PublishStage },
}

impl PublishOutcome {
    /// The resolved URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Resolved(url) => Some(url),
            Self::Unresolved { .. } => None,
        }
    }

    /// Whether the submit control was activated.
    #[must_use]
    pub fn submitted(&self) -> bool {
        match self {
            Self::Resolved(_) => true,
            Self::Unresolved { reached } => *reached >= PublishStage::Submitted,
        }
    }
}

/// CSS selectors for the controls the publisher touches.
#[derive(Debug, Clone)]
pub struct Selectors {
    pub compose_textbox: String,
    pub submit_button: String,
    pub toast: String,
    /// Link to the newest post on the profile page.
    pub first_post_link: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            compose_textbox: r#"div[data-testid="tweetTextarea_0"]"#.to_string(),
            submit_button: r#"button[data-testid="tweetButton"]"#.to_string(),
            toast: r#"div[data-testid="toast"]"#.to_string(),
            first_post_link: r#"article[data-testid="tweet"] a[href*="/status/"]"#.to_string(),
        }
    }
}

/// Configuration for the publisher.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Persisted auth state file.
    pub auth_state: PathBuf,
    /// Account handle, without the leading `@`.
    pub handle: String,
    pub compose_url: String,
    pub selectors: Selectors,
    /// Toast texts that mean the post went out. Matched case-insensitively.
    pub success_phrases: Vec<String>,
    pub typing: TypingPacing,
    pub compose_timeout: Duration,
    /// Budget for the whole confirmation search, reference lookup included.
    pub confirmation_timeout: Duration,
    /// Pause after the success toast before looking the post up.
    pub settle_pause: Duration,
}

impl PublishConfig {
    #[must_use]
    pub fn new(auth_state: impl Into<PathBuf>, handle: impl Into<String>) -> Self {
        Self {
            auth_state: auth_state.into(),
            handle: handle.into().trim_start_matches('@').to_string(),
            compose_url: format!("{SITE_URL}/compose/post"),
            selectors: Selectors::default(),
            success_phrases: vec!["Your post was sent".to_string()],
            typing: TypingPacing::new(Duration::from_millis(50)),
            compose_timeout: Duration::from_secs(30),
            confirmation_timeout: Duration::from_secs(20),
            settle_pause: Duration::from_secs(3),
        }
    }

    /// The account's own post listing.
    #[must_use]
    pub fn profile_url(&self) -> String {
        format!("{SITE_URL}/{}", self.handle)
    }

    /// Whether a toast text reports success.
    #[must_use]
    pub fn is_success_message(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.success_phrases
            .iter()
            .any(|p| lowered.contains(&p.to_lowercase()))
    }
}
