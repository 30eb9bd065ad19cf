//! Autopost crate for persona-driven social posting.
//!
//! This crate provides:
//! - Append-only CSV history of every run
//! - Fresh-topic discovery through a web search service
//! - Persona-conditioned drafting with response gating
//! - Publishing via browser automation with best-effort confirmation
//! - A single-run orchestrator that ties them together

pub mod ai;
pub mod auth;
pub mod browser;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod generation;
pub mod history;
pub mod persona;
pub mod pipeline;
pub mod publish;
pub mod search;

// Re-export main types
pub use config::Config;
pub use discovery::{Candidate, DiscoveryConfig, TopicDiscovery};
pub use errors::{AutopostError, AutopostResult};
pub use generation::{ContentGenerator, GenerationConfig, GenerationResult};
pub use history::{HistoryEntry, HistoryStore};
pub use persona::Persona;
pub use pipeline::{Pipeline, RunOutcome, RunReport};
pub use publish::{PublishConfig, PublishOutcome, Publisher};
