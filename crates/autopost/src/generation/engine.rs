//! Draft generation under a persona.

use std::sync::Arc;
use std::time::Duration;

use crate::ai::{AIMessage, AIProvider, GenerateOptions};
use crate::errors::AutopostResult;

use super::parser::{parse_response, validate_draft, DraftRejection};
use super::prompts::{PostPromptData, PromptManager, POST_TEMPLATE_NAME, SYSTEM_PROMPT};

/// Tunables for drafting.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    /// Model to request.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Output token ceiling.
    pub max_output_tokens: u32,
    /// Target post length in characters.
    pub target_length: usize,
    /// How many recent posts to show the model.
    pub recent_posts: usize,
    /// Drafting attempts per run.
    pub max_attempts: usize,
    /// Pause between attempts.
    pub retry_pause: Duration,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: crate::ai::gemini::DEFAULT_MODEL.to_string(),
            temperature: 0.8,
            max_output_tokens: 1024,
            target_length: 600,
            recent_posts: 5,
            max_attempts: 3,
            retry_pause: Duration::from_secs(5),
        }
    }
}

/// Inputs for one drafting call.
#[derive(Debug, Clone, Copy)]
pub struct DraftRequest<'a> {
    pub persona: &'a str,
    pub topic: &'a str,
    pub context: &'a str,
    /// Oldest first.
    pub recent_posts: &'a [String],
}

/// Outcome of one drafting call.
///
/// `draft` is only set when the post passed validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResult {
    /// Why the model thinks the post fits the persona. Diagnostic only.
    pub alignment: Option<String>,
    /// The model's restatement of the topic.
    pub topic: Option<String>,
    pub draft: Option<String>,
    pub rejection: Option<DraftRejection>,
}

impl GenerationResult {
    /// Build a result from raw response text, applying draft validation.
    #[must_use]
    pub fn from_response(text: &str) -> Self {
        let parsed = parse_response(text);

        let (draft, rejection) = match parsed.post {
            None => (None, Some(DraftRejection::Missing)),
            Some(post) => match validate_draft(&post) {
                Ok(()) => (Some(post.trim().to_string()), None),
                Err(reason) => (None, Some(reason)),
            },
        };

        Self {
            alignment: parsed.alignment,
            topic: parsed.topic,
            draft,
            rejection,
        }
    }
}

/// Drafts posts through an AI provider.
pub struct ContentGenerator {
    provider: Arc<dyn AIProvider>,
    prompts: PromptManager,
    config: GenerationConfig,
}

impl ContentGenerator {
    /// Create a new generator with the given AI provider.
    pub fn new(provider: Arc<dyn AIProvider>, config: GenerationConfig) -> AutopostResult<Self> {
        let prompts = PromptManager::new()?;
        Ok(Self {
            provider,
            prompts,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Build the drafting prompt.
    pub fn build_prompt(&self, request: &DraftRequest<'_>) -> AutopostResult<String> {
        let data = PostPromptData::new(
            request.persona,
            request.topic,
            request.context,
            request.recent_posts,
            self.config.target_length,
        );
        self.prompts.render(POST_TEMPLATE_NAME, &data)
    }

    /// Make one drafting attempt.
    ///
    /// Provider failures are logged and reported as an empty result.
    pub async fn generate(&self, request: &DraftRequest<'_>) -> GenerationResult {
        let prompt = match self.build_prompt(request) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build drafting prompt");
                return GenerationResult::default();
            }
        };

        let messages = vec![AIMessage::system(SYSTEM_PROMPT), AIMessage::user(prompt)];
        let options = GenerateOptions {
            temperature: Some(self.config.temperature),
            max_tokens: Some(self.config.max_output_tokens),
            ..Default::default()
        };

        let response = match self
            .provider
            .generate_text(&self.config.model, &messages, &options)
            .await
        {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    model = %self.config.model,
                    error = %e,
                    "Text generation call failed"
                );
                return GenerationResult::default();
            }
        };

        tracing::debug!(
            provider = %response.provider,
            output_tokens = response.usage.output_tokens,
            "Received drafting response"
        );

        let result = GenerationResult::from_response(&response.text);
        if let Some(alignment) = &result.alignment {
            tracing::debug!(alignment = %alignment, "Persona alignment");
        }
        result
    }
}
