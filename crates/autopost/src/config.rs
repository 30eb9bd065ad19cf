//! Run configuration from CLI flags and environment variables.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

use crate::discovery::DiscoveryConfig;
use crate::errors::{AutopostError, AutopostResult};
use crate::generation::GenerationConfig;
use crate::publish::{PublishConfig, TypingPacing};

/// Settings for one pipeline run.
#[derive(Debug, Clone, Args)]
pub struct Config {
    /// Search service API key
    #[arg(long, env = "TAVILY_API_KEY", hide_env_values = true)]
    pub search_api_key: Option<String>,

    /// Text-generation model (provider is chosen from the model name)
    #[arg(long, env = "AUTOPOST_MODEL", default_value = crate::ai::gemini::DEFAULT_MODEL)]
    pub model: String,

    /// Persona document
    #[arg(long, env = "AUTOPOST_PERSONA", default_value = "persona.md")]
    pub persona: PathBuf,

    /// History CSV file
    #[arg(long, env = "AUTOPOST_HISTORY", default_value = "post_history.csv")]
    pub history: PathBuf,

    /// Persisted browser auth state
    #[arg(long, env = "AUTOPOST_AUTH_STATE", default_value = "auth_state.json")]
    pub auth_state: PathBuf,

    /// Account handle the posts are published under
    #[arg(long, env = "AUTOPOST_HANDLE")]
    pub handle: Option<String>,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Base per-character typing delay in milliseconds
    #[arg(long, default_value = "50")]
    pub typing_delay_ms: u64,

    /// Pause between discovery and generation retries, in seconds
    #[arg(long, default_value = "5")]
    pub retry_pause_secs: u64,
}

impl Config {
    /// Check the preconditions a run needs before it starts.
    pub fn validate(&self) -> AutopostResult<()> {
        if self.search_api_key().is_none() {
            return Err(config_error("TAVILY_API_KEY is required"));
        }
        if self.handle().is_none() {
            return Err(config_error("account handle is required (--handle)"));
        }
        if !self.persona.is_file() {
            return Err(config_error(format!(
                "persona file '{}' not found",
                self.persona.display()
            )));
        }
        if !self.auth_state.is_file() {
            return Err(AutopostError::AuthStateMissing {
                path: self.auth_state.display().to_string(),
            });
        }
        Ok(())
    }

    /// Trimmed search API key, if set.
    #[must_use]
    pub fn search_api_key(&self) -> Option<&str> {
        self.search_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Handle without surrounding whitespace or leading `@`, if set.
    #[must_use]
    pub fn handle(&self) -> Option<&str> {
        self.handle
            .as_deref()
            .map(|h| h.trim().trim_start_matches('@'))
            .filter(|h| !h.is_empty())
    }

    #[must_use]
    pub fn retry_pause(&self) -> Duration {
        Duration::from_secs(self.retry_pause_secs)
    }

    #[must_use]
    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            retry_pause: self.retry_pause(),
            ..DiscoveryConfig::default()
        }
    }

    #[must_use]
    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            model: self.model.clone(),
            retry_pause: self.retry_pause(),
            ..GenerationConfig::default()
        }
    }

    #[must_use]
    pub fn publish_config(&self) -> PublishConfig {
        let mut config = PublishConfig::new(&self.auth_state, self.handle().unwrap_or_default());
        config.typing = TypingPacing::new(Duration::from_millis(self.typing_delay_ms));
        config
    }
}

fn config_error(reason: impl Into<String>) -> AutopostError {
    AutopostError::Config {
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        config: Config,
    }

    fn parse(args: &[&str]) -> Config {
        let mut argv = vec!["autopost"];
        argv.extend_from_slice(args);
        TestCli::parse_from(argv).config
    }

    #[test]
    fn test_builders_carry_flags() {
        let config = parse(&[
            "--search-api-key",
            "tvly-test",
            "--handle",
            "@acme",
            "--model",
            "claude-sonnet-4-20250514",
            "--typing-delay-ms",
            "20",
            "--retry-pause-secs",
            "0",
        ]);

        assert_eq!(config.handle(), Some("acme"));
        assert_eq!(config.generation_config().model, "claude-sonnet-4-20250514");
        assert_eq!(config.discovery_config().retry_pause, Duration::ZERO);
        assert_eq!(config.discovery_config().avoid_recent, 7);

        let publish = config.publish_config();
        assert_eq!(publish.handle, "acme");
        assert_eq!(publish.typing.base(), Duration::from_millis(20));
    }

    #[test]
    fn test_validate_reports_missing_pieces() {
        let dir = tempfile::tempdir().unwrap();
        let persona = dir.path().join("persona.md");
        let auth = dir.path().join("auth_state.json");
        let persona_arg = persona.to_string_lossy().to_string();
        let auth_arg = auth.to_string_lossy().to_string();
        let args = [
            "--search-api-key",
            "tvly-test",
            "--handle",
            "acme",
            "--persona",
            persona_arg.as_str(),
            "--auth-state",
            auth_arg.as_str(),
        ];

        let err = parse(&args).validate().unwrap_err();
        assert!(err.to_string().contains("persona"));

        writeln!(std::fs::File::create(&persona).unwrap(), "voice").unwrap();
        let err = parse(&args).validate().unwrap_err();
        assert!(matches!(err, AutopostError::AuthStateMissing { .. }));

        std::fs::write(&auth, r#"{"cookies":[]}"#).unwrap();
        assert!(parse(&args).validate().is_ok());
    }

    #[test]
    fn test_blank_handle_rejected() {
        let config = parse(&["--search-api-key", "tvly-test", "--handle", "  @ "]);
        assert!(config.handle().is_none());
        assert!(config.validate().unwrap_err().to_string().contains("handle"));
    }
}
