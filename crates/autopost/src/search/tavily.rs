//! Tavily API client for web search.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::errors::{AutopostError, AutopostResult};

use super::{SearchDepth, SearchProvider, SearchRequest, SearchResponse};

const TAVILY_API_URL: &str = "https://api.tavily.com/search";

/// Request body for Tavily search.
#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: SearchDepth,
    max_results: u32,
    include_answer: bool,
    include_images: bool,
    include_raw_content: bool,
}

/// Tavily search client.
pub struct TavilyClient {
    api_key: String,
    client: Client,
    base_url: String,
}

impl TavilyClient {
    /// Create a new Tavily client.
    pub fn new(api_key: impl Into<String>) -> AutopostResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: TAVILY_API_URL.to_string(),
        })
    }

    /// Set a custom endpoint.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[async_trait]
impl SearchProvider for TavilyClient {
    fn name(&self) -> &'static str {
        "tavily"
    }

    async fn search(&self, request: &SearchRequest) -> AutopostResult<SearchResponse> {
        let body = TavilyRequest {
            api_key: &self.api_key,
            query: &request.query,
            search_depth: request.depth,
            max_results: request.max_results,
            include_answer: request.include_answer,
            include_images: request.include_images,
            include_raw_content: request.include_raw_content,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AutopostError::Search(format!("Tavily request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".into());
            return Err(AutopostError::Search(format!(
                "Tavily API error ({status}): {error_text}"
            )));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| AutopostError::Search(format!("Failed to parse Tavily response: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = SearchRequest::new("rust async runtimes", SearchDepth::Advanced, 5);
        let body = TavilyRequest {
            api_key: "tvly-test",
            query: &request.query,
            search_depth: request.depth,
            max_results: request.max_results,
            include_answer: request.include_answer,
            include_images: request.include_images,
            include_raw_content: request.include_raw_content,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["search_depth"], "advanced");
        assert_eq!(json["max_results"], 5);
        assert_eq!(json["include_answer"], false);
        assert_eq!(json["include_raw_content"], false);
    }

    #[test]
    fn test_response_tolerates_null_titles() {
        let raw = r#"{
            "query": "q",
            "results": [
                {"title": null, "url": "https://a.example", "content": "a", "score": 0.9},
                {"title": "Vector databases", "url": "https://b.example", "content": "b"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert!(parsed.results[0].title.is_none());
        assert_eq!(parsed.results[1].title.as_deref(), Some("Vector databases"));
    }

    #[test]
    fn test_response_tolerates_null_url_and_content() {
        let raw = r#"{
            "results": [
                {"title": "Edge inference", "url": null, "content": null},
                {"title": "Vector databases", "url": "https://b.example", "content": "b"}
            ]
        }"#;
        let parsed: SearchResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].url, "");
        assert_eq!(parsed.results[0].content, "");
        assert_eq!(parsed.results[1].url, "https://b.example");

        let empty: SearchResponse = serde_json::from_str(r#"{"results": null}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
