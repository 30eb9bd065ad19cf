//! Topic discovery - finds a subject not covered recently and gathers context for it.

use std::sync::Arc;
use std::time::Duration;

use crate::errors::AutopostResult;
use crate::search::{SearchDepth, SearchProvider, SearchRequest, SearchResult};

/// Separator between rendered search results in a context block.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Tunables for discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Broad queries, one per outer attempt. Attempts beyond the list wrap around.
    pub queries: Vec<String>,
    /// Outer attempts before giving up.
    pub max_attempts: usize,
    /// How many recent history topics to avoid.
    pub avoid_recent: usize,
    /// Result count for the broad query.
    pub broad_results: u32,
    /// Result count for the focused context query.
    pub focused_results: u32,
    /// Pause after a failed attempt.
    pub retry_pause: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            queries: vec![
                "latest news in AI agents and LLM tooling".to_string(),
                "new developments in large language model infrastructure".to_string(),
                "recent breakthroughs in AI developer tools".to_string(),
            ],
            max_attempts: 3,
            avoid_recent: 7,
            broad_results: 7,
            focused_results: 5,
            retry_pause: Duration::from_secs(5),
        }
    }
}

/// A topic paired with the search context gathered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub topic: String,
    pub context: String,
}

/// Result of scanning one broad result set.
enum AttemptOutcome {
    Found(Candidate),
    Exhausted,
}

/// Finds a fresh topic using the search service.
pub struct TopicDiscovery {
    search: Arc<dyn SearchProvider>,
    config: DiscoveryConfig,
}

impl TopicDiscovery {
    #[must_use]
    pub fn new(search: Arc<dyn SearchProvider>, config: DiscoveryConfig) -> Self {
        Self { search, config }
    }

    /// Find a topic absent from `recent_topics` along with its context.
    ///
    /// Returns `None` when every attempt is exhausted, whether because all
    /// candidates were recent or because the search service kept failing.
    pub async fn discover(&self, recent_topics: &[String]) -> Option<Candidate> {
        let start = recent_topics.len().saturating_sub(self.config.avoid_recent);
        let avoided: Vec<String> = recent_topics[start..]
            .iter()
            .map(|t| t.to_lowercase())
            .collect();

        tracing::info!(avoided = ?avoided, "Discovering topic");

        for attempt in 1..=self.config.max_attempts {
            let Some(query) = self.query_for(attempt) else {
                tracing::warn!("No discovery queries configured");
                return None;
            };

            match self.attempt(query, &avoided).await {
                Ok(AttemptOutcome::Found(candidate)) => {
                    tracing::info!(attempt, topic = %candidate.topic, "Selected topic");
                    return Some(candidate);
                }
                Ok(AttemptOutcome::Exhausted) => {
                    tracing::info!(attempt, query, "No unique topic in results");
                }
                Err(e) => {
                    tracing::warn!(attempt, query, error = %e, "Discovery attempt failed");
                }
            }

            if attempt < self.config.max_attempts {
                tokio::time::sleep(self.config.retry_pause).await;
            }
        }

        tracing::warn!(
            attempts = self.config.max_attempts,
            "Topic discovery exhausted"
        );
        None
    }

    fn query_for(&self, attempt: usize) -> Option<&str> {
        let queries = &self.config.queries;
        if queries.is_empty() {
            return None;
        }
        Some(queries[(attempt - 1) % queries.len()].as_str())
    }

    async fn attempt(&self, query: &str, avoided: &[String]) -> AutopostResult<AttemptOutcome> {
        let broad = self
            .search
            .search(&SearchRequest::new(
                query,
                SearchDepth::Basic,
                self.config.broad_results,
            ))
            .await?;

        let candidates = candidate_topics(&broad.results);
        tracing::debug!(query, candidates = ?candidates, "Broad search results");

        for topic in candidates {
            if is_recent(&topic, avoided) {
                tracing::debug!(topic = %topic, "Skipping recent topic");
                continue;
            }

            let focused = self
                .search
                .search(&SearchRequest::new(
                    topic.as_str(),
                    SearchDepth::Advanced,
                    self.config.focused_results,
                ))
                .await?;

            if focused.results.is_empty() {
                tracing::debug!(topic = %topic, "No context found, trying next candidate");
                continue;
            }

            let context = render_context(&focused.results);
            return Ok(AttemptOutcome::Found(Candidate { topic, context }));
        }

        Ok(AttemptOutcome::Exhausted)
    }
}

/// Non-empty result titles, in ranking order.
#[must_use]
pub fn candidate_topics(results: &[SearchResult]) -> Vec<String> {
    results
        .iter()
        .filter_map(|r| r.title.as_deref())
        .filter(|t| !t.trim().is_empty())
        .map(String::from)
        .collect()
}

/// Case-insensitive exact match against already-lowercased topics.
#[must_use]
pub fn is_recent(topic: &str, avoided_lowercase: &[String]) -> bool {
    let lowered = topic.to_lowercase();
    avoided_lowercase.iter().any(|a| *a == lowered)
}

/// Render focused results into a single context block.
#[must_use]
pub fn render_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[{}] {}\nSource: {}\n{}",
                i + 1,
                r.title.as_deref().unwrap_or("Untitled"),
                r.url,
                r.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AutopostError;
    use crate::search::SearchResponse;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers queries from a table; unknown queries fail like an outage.
    #[derive(Default)]
    struct TableSearch {
        answers: HashMap<String, Vec<SearchResult>>,
        calls: Mutex<Vec<(String, SearchDepth, u32)>>,
    }

    impl TableSearch {
        fn answer(mut self, query: &str, titles: &[&str]) -> Self {
            let results = titles.iter().map(|t| result(Some(*t))).collect();
            self.answers.insert(query.to_string(), results);
            self
        }
    }

    #[async_trait]
    impl SearchProvider for TableSearch {
        fn name(&self) -> &'static str {
            "table"
        }

        async fn search(&self, request: &SearchRequest) -> AutopostResult<SearchResponse> {
            self.calls.lock().unwrap().push((
                request.query.clone(),
                request.depth,
                request.max_results,
            ));
            self.answers
                .get(&request.query)
                .map(|results| SearchResponse {
                    results: results.clone(),
                })
                .ok_or_else(|| AutopostError::Search(format!("no answer for {}", request.query)))
        }
    }

    fn config() -> DiscoveryConfig {
        DiscoveryConfig {
            queries: vec!["A".to_string(), "B".to_string(), "C".to_string()],
            retry_pause: Duration::ZERO,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_skips_recent_topics_case_insensitively() {
        let search = Arc::new(
            TableSearch::default()
                .answer("A", &["LLM Agents", "vector databases", "Prompt Chaining"])
                .answer("vector databases", &["Vector DB primer"]),
        );
        let discovery = TopicDiscovery::new(search.clone(), config());

        let recent = vec!["LLM agents".to_string(), "prompt chaining".to_string()];
        let candidate = discovery.discover(&recent).await.unwrap();

        assert_eq!(candidate.topic, "vector databases");
        assert!(candidate.context.contains("Vector DB primer"));

        let calls = search.calls.lock().unwrap();
        assert_eq!(calls[0], ("A".to_string(), SearchDepth::Basic, 7));
        assert_eq!(
            calls[1],
            ("vector databases".to_string(), SearchDepth::Advanced, 5)
        );
        assert_eq!(calls.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_focused_search_continues_with_next_candidate() {
        let search = Arc::new(
            TableSearch::default()
                .answer("A", &["first", "second"])
                .answer("first", &[])
                .answer("second", &["Second source"]),
        );
        let discovery = TopicDiscovery::new(search.clone(), config());

        let candidate = discovery.discover(&[]).await.unwrap();
        assert_eq!(candidate.topic, "second");

        let queries: Vec<String> = search
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.0.clone())
            .collect();
        assert_eq!(queries, vec!["A", "first", "second"]);
    }

    #[tokio::test]
    async fn test_search_failure_moves_to_next_phrasing() {
        let search = Arc::new(
            TableSearch::default()
                .answer("B", &["fresh topic"])
                .answer("fresh topic", &["Source"]),
        );
        let discovery = TopicDiscovery::new(search.clone(), config());

        let candidate = discovery.discover(&[]).await.unwrap();
        assert_eq!(candidate.topic, "fresh topic");
        assert_eq!(search.calls.lock().unwrap()[0].0, "A");
    }

    #[tokio::test]
    async fn test_exhaustion_returns_none() {
        let search = Arc::new(
            TableSearch::default()
                .answer("A", &["old"])
                .answer("B", &["OLD"])
                .answer("C", &[]),
        );
        let discovery = TopicDiscovery::new(search.clone(), config());

        assert!(discovery.discover(&["old".to_string()]).await.is_none());
        assert_eq!(search.calls.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_only_last_seven_topics_are_avoided() {
        let search = Arc::new(
            TableSearch::default()
                .answer("A", &["topic 0"])
                .answer("topic 0", &["Source"]),
        );
        let discovery = TopicDiscovery::new(search, config());

        let recent: Vec<String> = (0..8).map(|i| format!("topic {i}")).collect();
        let candidate = discovery.discover(&recent).await.unwrap();
        assert_eq!(candidate.topic, "topic 0");
    }

    fn result(title: Option<&str>) -> SearchResult {
        SearchResult {
            title: title.map(String::from),
            url: "https://example.com".to_string(),
            content: "content".to_string(),
        }
    }

    #[test]
    fn test_candidate_topics_drop_empty_titles() {
        let results = vec![
            result(Some("LLM agents")),
            result(None),
            result(Some("   ")),
            result(Some("Vector databases")),
        ];
        assert_eq!(
            candidate_topics(&results),
            vec!["LLM agents".to_string(), "Vector databases".to_string()]
        );
    }

    #[test]
    fn test_is_recent_ignores_case_only() {
        let avoided = vec!["llm agents".to_string()];
        assert!(is_recent("LLM Agents", &avoided));
        assert!(is_recent("llm agents", &avoided));
        assert!(!is_recent("LLM agents 2", &avoided));
    }

    #[test]
    fn test_render_context() {
        let results = vec![
            SearchResult {
                title: Some("First".to_string()),
                url: "https://a.example".to_string(),
                content: " alpha ".to_string(),
            },
            SearchResult {
                title: None,
                url: "https://b.example".to_string(),
                content: "beta".to_string(),
            },
        ];

        let block = render_context(&results);
        assert_eq!(
            block,
            "[1] First\nSource: https://a.example\nalpha\n\n---\n\n[2] Untitled\nSource: https://b.example\nbeta"
        );
    }
}
