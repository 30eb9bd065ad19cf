//! Autopost pipeline - sequences discover, draft, publish and record for one run.

use anyhow::Result;

use crate::discovery::{Candidate, TopicDiscovery};
use crate::generation::{ContentGenerator, DraftRequest};
use crate::history::{History, HistoryEntry, HistoryStore, RunFailure};
use crate::persona::Persona;
use crate::publish::{PublishOutcome, PublishStage, Publisher};

/// How many history topics discovery avoids.
pub const RECENT_TOPIC_WINDOW: usize = 7;

/// Terminal state of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Published and the public URL was resolved.
    PublishedWithReference(String),
    /// Went through the publish flow without a resolved URL.
    PublishedWithoutReference { reached: PublishStage },
    /// Every drafting attempt was rejected.
    GenerationFailed,
    /// No fresh topic was found.
    TopicDiscoveryFailed,
}

impl RunOutcome {
    /// Whether the submit control was activated.
    #[must_use]
    pub fn submitted(&self) -> bool {
        match self {
            Self::PublishedWithReference(_) => true,
            Self::PublishedWithoutReference { reached } => *reached >= PublishStage::Submitted,
            Self::GenerationFailed | Self::TopicDiscoveryFailed => false,
        }
    }

    /// Operator note for a publish flow that stopped before submit.
    #[must_use]
    pub fn unsubmitted_note(&self) -> Option<String> {
        match self {
            Self::PublishedWithoutReference { reached } if !self.submitted() => Some(format!(
                "stopped at {reached}; the draft was never submitted"
            )),
            _ => None,
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PublishedWithReference(_) => write!(f, "published with reference"),
            Self::PublishedWithoutReference { .. } => write!(f, "published without reference"),
            Self::GenerationFailed => write!(f, "generation failed"),
            Self::TopicDiscoveryFailed => write!(f, "topic discovery failed"),
        }
    }
}

/// Summary of a single run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Topic label the history entry was tagged with.
    pub topic: Option<String>,
    /// Accepted draft, if any.
    pub draft: Option<String>,
    /// Drafting attempts made.
    pub generation_attempts: usize,
    /// Whether the history entry was written.
    pub recorded: bool,
}

/// Draft accepted by the generation loop.
struct Draft {
    text: String,
    topic: Option<String>,
}

/// Pipeline orchestrator.
pub struct Pipeline {
    history: HistoryStore,
    discovery: TopicDiscovery,
    generator: ContentGenerator,
    publisher: Publisher,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(
        history: HistoryStore,
        discovery: TopicDiscovery,
        generator: ContentGenerator,
        publisher: Publisher,
    ) -> Self {
        Self {
            history,
            discovery,
            generator,
            publisher,
        }
    }

    /// Run once.
    ///
    /// Exactly one history entry is appended on every path, including a
    /// failed session open, which is the only error returned.
    pub async fn run(&self, persona: &Persona) -> Result<RunReport> {
        tracing::info!(history = %self.history.path().display(), "Starting run");

        let history = match self.history.load() {
            Ok(entries) => History::new(entries),
            Err(e) => {
                tracing::error!(error = %e, "Failed to load history, continuing with none");
                History::default()
            }
        };
        tracing::debug!(entries = history.len(), "Loaded history");

        // Discover
        let recent_topics = history.recent_topics(RECENT_TOPIC_WINDOW);
        let Some(candidate) = self.discovery.discover(&recent_topics).await else {
            tracing::warn!("No fresh topic found");
            let recorded = self.record(&HistoryEntry::failed(RunFailure::NoTopic, None));
            return Ok(RunReport {
                outcome: RunOutcome::TopicDiscoveryFailed,
                topic: None,
                draft: None,
                generation_attempts: 0,
                recorded,
            });
        };

        // Draft
        let recent_posts = history.recent_posts(self.generator.config().recent_posts);
        let (draft, attempts) = self.draft(persona, &candidate, &recent_posts).await;
        let draft = match draft {
            Ok(draft) => draft,
            Err(restated) => {
                let topic = restated.or_else(|| Some(candidate.topic.clone()));
                tracing::error!(attempts, topic = ?topic, "All drafting attempts were rejected");
                let recorded = self.record(&HistoryEntry::failed(
                    RunFailure::GenerationFailed,
                    topic.clone(),
                ));
                return Ok(RunReport {
                    outcome: RunOutcome::GenerationFailed,
                    topic,
                    draft: None,
                    generation_attempts: attempts,
                    recorded,
                });
            }
        };
        let topic = draft.topic.or_else(|| Some(candidate.topic.clone()));

        // Publish
        let outcome = match self.publisher.publish(&draft.text).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(error = %e, "Could not open a browser session");
                self.record(&HistoryEntry::failed(
                    RunFailure::PublishFailed,
                    topic.clone(),
                ));
                return Err(e.into());
            }
        };

        let outcome = match outcome {
            PublishOutcome::Resolved(url) => RunOutcome::PublishedWithReference(url),
            PublishOutcome::Unresolved { reached } => {
                RunOutcome::PublishedWithoutReference { reached }
            }
        };
        if !outcome.submitted() {
            tracing::warn!(outcome = ?outcome, "Draft was never submitted");
        }

        let url = match &outcome {
            RunOutcome::PublishedWithReference(url) => Some(url.clone()),
            _ => None,
        };
        let recorded = self.record(&HistoryEntry::posted(
            draft.text.clone(),
            url,
            topic.clone(),
        ));

        tracing::info!(outcome = %outcome, "Run finished");
        Ok(RunReport {
            outcome,
            topic,
            draft: Some(draft.text),
            generation_attempts: attempts,
            recorded,
        })
    }

    /// Draft with the configured retry budget.
    ///
    /// On failure, returns the last non-empty restated topic.
    async fn draft(
        &self,
        persona: &Persona,
        candidate: &Candidate,
        recent_posts: &[String],
    ) -> (std::result::Result<Draft, Option<String>>, usize) {
        let config = self.generator.config();
        let request = DraftRequest {
            persona: persona.text(),
            topic: &candidate.topic,
            context: &candidate.context,
            recent_posts,
        };

        let mut restated: Option<String> = None;
        let mut attempts = 0;

        while attempts < config.max_attempts {
            attempts += 1;
            tracing::info!(attempt = attempts, max = config.max_attempts, "Drafting post");

            let result = self.generator.generate(&request).await;
            if let Some(t) = result.topic.filter(|t| !t.trim().is_empty()) {
                restated = Some(t);
            }

            if let Some(text) = result.draft {
                tracing::info!(chars = text.chars().count(), "Draft accepted");
                return (
                    Ok(Draft {
                        text,
                        topic: restated,
                    }),
                    attempts,
                );
            }

            let reason = result
                .rejection
                .map_or_else(|| "no response".to_string(), |r| r.to_string());
            tracing::warn!(attempt = attempts, reason = %reason, "Draft rejected");

            if attempts < config.max_attempts && !config.retry_pause.is_zero() {
                tokio::time::sleep(config.retry_pause).await;
            }
        }

        (Err(restated), attempts)
    }

    /// Append one entry. Failures are logged, never raised.
    fn record(&self, entry: &HistoryEntry) -> bool {
        match self.history.append(entry) {
            Ok(()) => {
                tracing::info!(
                    path = %self.history.path().display(),
                    failure = ?entry.failure(),
                    "Recorded history entry"
                );
                true
            }
            Err(e) => {
                tracing::error!(
                    path = %self.history.path().display(),
                    error = %e,
                    "Failed to append history entry"
                );
                false
            }
        }
    }
}
