//! Error types for the autopost crate.

use thiserror::Error;

/// Errors raised by the pipeline components and their collaborators.
#[derive(Error, Debug)]
pub enum AutopostError {
    // Collaborator errors
    #[error("Search error: {0}")]
    Search(String),

    #[error("AI error: {0}")]
    Ai(String),

    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Timed out waiting for {what}")]
    Timeout { what: String },

    // Session errors
    #[error("Auth state file not found at '{path}'. Run 'autopost auth' first.")]
    AuthStateMissing { path: String },

    #[error("Failed to open browser session: {reason}")]
    SessionOpen { reason: String },

    // Storage errors
    #[error("History store error: {reason}")]
    History { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // Configuration errors
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

impl AutopostError {
    /// Whether this error means the browser session was never acquired.
    #[must_use]
    pub fn is_session_failure(&self) -> bool {
        matches!(
            self,
            Self::AuthStateMissing { .. } | Self::SessionOpen { .. }
        )
    }
}

impl From<csv::Error> for AutopostError {
    fn from(err: csv::Error) -> Self {
        Self::History {
            reason: err.to_string(),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for AutopostError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}

/// Result type alias for autopost operations.
pub type AutopostResult<T> = Result<T, AutopostError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AutopostError::Timeout {
            what: "compose textbox".to_string(),
        };
        assert_eq!(err.to_string(), "Timed out waiting for compose textbox");
    }

    #[test]
    fn test_session_failure_classification() {
        let missing = AutopostError::AuthStateMissing {
            path: "auth_state.json".to_string(),
        };
        assert!(missing.is_session_failure());
        assert!(!AutopostError::Browser("click failed".to_string()).is_session_failure());
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: AutopostError = io_err.into();
        assert!(matches!(err, AutopostError::Io(_)));
    }
}
