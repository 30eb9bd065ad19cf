//! Content generation: prompt construction, response parsing, draft gating.

mod engine;
pub mod parser;
pub mod prompts;

pub use engine::{ContentGenerator, DraftRequest, GenerationConfig, GenerationResult};
pub use parser::{parse_response, validate_draft, DraftRejection, ParsedResponse};
pub use prompts::PromptManager;
