//! Text-generation providers.
//!
//! This module provides:
//! - AI provider abstraction (Gemini, Anthropic)
//! - Model-based provider selection

pub mod anthropic;
pub mod gemini;
pub mod provider;

use std::sync::Arc;

pub use anthropic::AnthropicProvider;
pub use gemini::GeminiProvider;
pub use provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};

use crate::errors::{AutopostError, AutopostResult};

/// Pick the provider serving `model`, configured from the environment.
pub fn provider_for_model(model: &str) -> AutopostResult<Arc<dyn AIProvider>> {
    let candidates: Vec<Arc<dyn AIProvider>> = vec![
        Arc::new(GeminiProvider::from_env()?),
        Arc::new(AnthropicProvider::from_env()?),
    ];

    let provider = candidates
        .into_iter()
        .find(|p| p.supports_model(model))
        .ok_or_else(|| AutopostError::Config {
            reason: format!("No provider serves model '{model}'"),
        })?;

    if !provider.is_configured() {
        return Err(AutopostError::Config {
            reason: format!(
                "{} is required for model '{model}'",
                provider.api_key_env_var()
            ),
        });
    }

    Ok(provider)
}
