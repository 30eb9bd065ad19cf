//! History entry types and read-only views over loaded history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Timestamp layout written into the history file.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Why a run ended without publishing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunFailure {
    /// Discovery exhausted its attempts.
    NoTopic,
    /// Every generation attempt was rejected or failed.
    GenerationFailed,
    /// The browser session could not be opened.
    PublishFailed,
}

impl RunFailure {
    /// Sentinel written in place of post text.
    #[must_use]
    pub const fn sentinel(self) -> &'static str {
        match self {
            Self::NoTopic => "[NO TOPIC FOUND]",
            Self::GenerationFailed => "[GENERATION FAILED]",
            Self::PublishFailed => "[PUBLISH FAILED]",
        }
    }

    /// Parse a sentinel back into a failure kind.
    #[must_use]
    pub fn from_sentinel(text: &str) -> Option<Self> {
        [Self::NoTopic, Self::GenerationFailed, Self::PublishFailed]
            .into_iter()
            .find(|f| f.sentinel() == text)
    }
}

impl std::fmt::Display for RunFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::NoTopic => "topic discovery failed",
            Self::GenerationFailed => "generation failed",
            Self::PublishFailed => "publish failed",
        };
        f.write_str(label)
    }
}

/// One immutable row of the history file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// When the entry was recorded, formatted with [`TIMESTAMP_FORMAT`].
    pub timestamp: String,
    /// Published text, or a [`RunFailure`] sentinel.
    pub posted_text: String,
    /// Public URL of the published post, when it could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_url: Option<String>,
    /// Short subject label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
}

impl HistoryEntry {
    /// Entry for text that went through the publish flow.
    #[must_use]
    pub fn posted(
        text: impl Into<String>,
        published_url: Option<String>,
        topic: Option<String>,
    ) -> Self {
        Self::at(Utc::now(), text.into(), published_url, topic)
    }

    /// Entry for a run that ended without publishing.
    #[must_use]
    pub fn failed(failure: RunFailure, topic: Option<String>) -> Self {
        Self::at(Utc::now(), failure.sentinel().to_string(), None, topic)
    }

    fn at(
        when: DateTime<Utc>,
        posted_text: String,
        published_url: Option<String>,
        topic: Option<String>,
    ) -> Self {
        Self {
            timestamp: when.format(TIMESTAMP_FORMAT).to_string(),
            posted_text,
            published_url: published_url.filter(|u| !u.is_empty()),
            topic: topic.filter(|t| !t.trim().is_empty()),
        }
    }

    /// The failure this entry records, if any.
    #[must_use]
    pub fn failure(&self) -> Option<RunFailure> {
        RunFailure::from_sentinel(&self.posted_text)
    }
}

/// Read-only view over the history loaded at the start of a run.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    #[must_use]
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Topics of the last `n` entries, oldest first.
    ///
    /// Entries without a topic still count against the window.
    #[must_use]
    pub fn recent_topics(&self, n: usize) -> Vec<String> {
        let start = self.entries.len().saturating_sub(n);
        self.entries[start..]
            .iter()
            .filter_map(|e| e.topic.clone())
            .collect()
    }

    /// Text of the last `n` published posts, oldest first. Failed runs are skipped.
    #[must_use]
    pub fn recent_posts(&self, n: usize) -> Vec<String> {
        let mut posts: Vec<String> = self
            .entries
            .iter()
            .rev()
            .filter(|e| e.failure().is_none() && !e.posted_text.trim().is_empty())
            .take(n)
            .map(|e| e.posted_text.clone())
            .collect();
        posts.reverse();
        posts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, topic: Option<&str>) -> HistoryEntry {
        HistoryEntry::posted(text, None, topic.map(String::from))
    }

    #[test]
    fn test_sentinel_round_trip() {
        for failure in [
            RunFailure::NoTopic,
            RunFailure::GenerationFailed,
            RunFailure::PublishFailed,
        ] {
            assert_eq!(RunFailure::from_sentinel(failure.sentinel()), Some(failure));
        }
        assert_eq!(RunFailure::from_sentinel("a real post"), None);
    }

    #[test]
    fn test_blank_topic_and_url_become_none() {
        let e = HistoryEntry::posted("text", Some(String::new()), Some("  ".to_string()));
        assert!(e.published_url.is_none());
        assert!(e.topic.is_none());
    }

    #[test]
    fn test_recent_topics_window() {
        let entries: Vec<_> = (0..10)
            .map(|i| entry(&format!("post {i}"), Some(&format!("topic {i}"))))
            .collect();
        let history = History::new(entries);

        let topics = history.recent_topics(7);
        assert_eq!(topics.len(), 7);
        assert_eq!(topics[0], "topic 3");
        assert_eq!(topics[6], "topic 9");
    }

    #[test]
    fn test_recent_topics_counts_untopical_entries() {
        let history = History::new(vec![
            entry("a", Some("old")),
            entry("b", None),
            entry("c", Some("new")),
        ]);
        assert_eq!(history.recent_topics(2), vec!["new".to_string()]);
    }

    #[test]
    fn test_recent_posts_skips_failures_and_keeps_order() {
        let history = History::new(vec![
            entry("first", None),
            entry("second", None),
            HistoryEntry::failed(RunFailure::GenerationFailed, Some("x".to_string())),
            entry("third", None),
        ]);
        assert_eq!(
            history.recent_posts(2),
            vec!["second".to_string(), "third".to_string()]
        );
        assert_eq!(history.recent_posts(5).len(), 3);
    }
}
