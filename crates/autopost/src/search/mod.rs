//! Web search used for topic discovery and context gathering.

mod tavily;

pub use tavily::TavilyClient;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AutopostResult;

/// How thoroughly the search service should look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDepth {
    Basic,
    Advanced,
}

/// A single search request.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    pub depth: SearchDepth,
    pub max_results: u32,
    pub include_answer: bool,
    pub include_images: bool,
    pub include_raw_content: bool,
}

impl SearchRequest {
    /// Request with answers, images and raw content all disabled.
    pub fn new(query: impl Into<String>, depth: SearchDepth, max_results: u32) -> Self {
        Self {
            query: query.into(),
            depth,
            max_results,
            include_answer: false,
            include_images: false,
            include_raw_content: false,
        }
    }
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One ranked search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
}

/// Ranked results, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<SearchResult>,
}

/// Trait for web search backends.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get the backend name (e.g., "tavily").
    fn name(&self) -> &'static str;

    /// Run a query and return ranked results.
    async fn search(&self, request: &SearchRequest) -> AutopostResult<SearchResponse>;
}
