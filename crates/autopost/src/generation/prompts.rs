//! Prompt template management.

use handlebars::Handlebars;
use serde::Serialize;

use crate::errors::{AutopostError, AutopostResult};

use super::parser::{ALIGNMENT_LABEL, POST_LABEL, TOPIC_LABEL};

/// Template name for the post-drafting prompt.
pub const POST_TEMPLATE_NAME: &str = "post";

/// Values rendered into the post prompt.
#[derive(Debug, Serialize)]
pub struct PostPromptData<'a> {
    pub persona: &'a str,
    pub topic: &'a str,
    pub context: &'a str,
    pub recent_posts: &'a [String],
    pub target_length: usize,
    pub alignment_label: &'static str,
    pub topic_label: &'static str,
    pub post_label: &'static str,
}

impl<'a> PostPromptData<'a> {
    pub fn new(
        persona: &'a str,
        topic: &'a str,
        context: &'a str,
        recent_posts: &'a [String],
        target_length: usize,
    ) -> Self {
        Self {
            persona,
            topic,
            context,
            recent_posts,
            target_length,
            alignment_label: ALIGNMENT_LABEL,
            topic_label: TOPIC_LABEL,
            post_label: POST_LABEL,
        }
    }
}

/// Manages Handlebars prompt templates.
pub struct PromptManager {
    handlebars: Handlebars<'static>,
}

impl PromptManager {
    /// Create a new prompt manager with embedded templates.
    pub fn new() -> AutopostResult<Self> {
        let mut handlebars = Handlebars::new();
        // Persona and context text go into the prompt verbatim.
        handlebars.register_escape_fn(handlebars::no_escape);

        handlebars
            .register_template_string(POST_TEMPLATE_NAME, POST_TEMPLATE)
            .map_err(|e| AutopostError::Config {
                reason: format!("Invalid prompt template: {e}"),
            })?;

        Ok(Self { handlebars })
    }

    /// Render a template with the given data.
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> AutopostResult<String> {
        self.handlebars
            .render(template, data)
            .map_err(|e| AutopostError::Ai(format!("Failed to render prompt '{template}': {e}")))
    }
}

/// System instruction sent alongside every drafting prompt.
pub const SYSTEM_PROMPT: &str = "You write short, original social media posts in the voice \
described by the persona you are given. You follow formatting instructions exactly.";

/// Post drafting prompt template.
const POST_TEMPLATE: &str = r"## Persona
{{persona}}

## Style Rules
- Write a single post about the topic below. Stay on that topic.
- Draw facts and specifics from the supplied context only.
- Do not ask questions. The post must not contain a question mark.
- No hashtags. No emojis. No em-dashes.
- Avoid marketing language and hype words.
- Do not name the product or company the persona works on.
- Aim for about {{target_length}} characters.
- Separate paragraphs with a blank line.

## Topic
{{topic}}

## Context
{{context}}
{{#if recent_posts}}

## Recent Posts
These were published recently. Do not repeat their angle, opening, or phrasing.
{{#each recent_posts}}
---
{{this}}
{{/each}}
---
{{/if}}

## Response Format
Respond with exactly these three sections, in this order:
{{alignment_label}} <one or two sentences on how the post fits the persona>
{{topic_label}} <the topic restated in a few words>
{{post_label}} <the post text>
";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_all_blocks_in_order() {
        let prompts = PromptManager::new().unwrap();
        let recent = vec!["older post".to_string(), "newer post".to_string()];
        let data = PostPromptData::new(
            "A calm engineer who writes \"plainly\" & briefly.",
            "vector databases",
            "[1] Vector DBs\nSource: https://example.com\nThey index embeddings.",
            &recent,
            600,
        );

        let prompt = prompts.render(POST_TEMPLATE_NAME, &data).unwrap();

        let persona = prompt.find("writes \"plainly\" & briefly").unwrap();
        let rules = prompt.find("## Style Rules").unwrap();
        let context = prompt.find("They index embeddings.").unwrap();
        let older = prompt.find("older post").unwrap();
        let newer = prompt.find("newer post").unwrap();
        let format = prompt.find("## Response Format").unwrap();

        assert!(persona < rules && rules < context && context < older);
        assert!(older < newer && newer < format);
        assert!(prompt.contains("about 600 characters"));
        assert!(prompt.contains("ALIGNMENT:"));
        assert!(prompt.contains("TOPIC:"));
        assert!(prompt.contains("POST:"));
    }

    #[test]
    fn test_render_omits_recent_block_when_empty() {
        let prompts = PromptManager::new().unwrap();
        let data = PostPromptData::new("persona", "topic", "context", &[], 600);

        let prompt = prompts.render(POST_TEMPLATE_NAME, &data).unwrap();
        assert!(!prompt.contains("## Recent Posts"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let prompts = PromptManager::new().unwrap();
        let recent = vec!["p".to_string()];
        let data = PostPromptData::new("persona", "topic", "context", &recent, 600);

        let a = prompts.render(POST_TEMPLATE_NAME, &data).unwrap();
        let b = prompts.render(POST_TEMPLATE_NAME, &data).unwrap();
        assert_eq!(a, b);
    }
}
