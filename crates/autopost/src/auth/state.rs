//! Auth state file management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{AutopostError, AutopostResult};

/// One cookie as stored in the auth state file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default = "default_path")]
    pub path: String,
    /// Seconds since the epoch; negative for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    #[serde(default)]
    pub http_only: bool,
    #[serde(default)]
    pub secure: bool,
}

fn default_path() -> String {
    "/".to_string()
}

/// Browser storage state: the cookies of a logged-in session.
///
/// The layout matches common storage-state files, so a state recorded by
/// other tooling loads as long as it carries a `cookies` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthState {
    #[serde(default)]
    pub cookies: Vec<StoredCookie>,
    /// When this state was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_at: Option<DateTime<Utc>>,
}

impl AuthState {
    /// Load the state from a JSON file.
    pub fn load(path: &Path) -> AutopostResult<Self> {
        if !path.exists() {
            return Err(AutopostError::AuthStateMissing {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        let state: Self = serde_json::from_str(&content)?;
        Ok(state)
    }

    /// Save the state to a JSON file.
    pub fn save(&self, path: &Path) -> AutopostResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether the state carries a cookie with this name.
    #[must_use]
    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = AuthState::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, AutopostError::AuthStateMissing { .. }));
    }

    #[test]
    fn test_loads_storage_state_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_state.json");
        std::fs::write(
            &path,
            r#"{
                "cookies": [
                    {"name": "auth_token", "value": "abc", "domain": ".x.com", "path": "/",
                     "expires": 1893456000, "httpOnly": true, "secure": true, "sameSite": "None"},
                    {"name": "ct0", "value": "def", "domain": ".x.com"}
                ],
                "origins": []
            }"#,
        )
        .unwrap();

        let state = AuthState::load(&path).unwrap();
        assert_eq!(state.cookies.len(), 2);
        assert!(state.has_cookie("auth_token"));
        assert!(state.cookies[0].http_only);
        assert_eq!(state.cookies[1].path, "/");
        assert!(!state.cookies[1].secure);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("auth_state.json");
        let state = AuthState {
            cookies: vec![StoredCookie {
                name: "auth_token".to_string(),
                value: "abc".to_string(),
                domain: ".x.com".to_string(),
                path: "/".to_string(),
                expires: None,
                http_only: true,
                secure: true,
            }],
            recorded_at: Some(Utc::now()),
        };

        state.save(&path).unwrap();
        let loaded = AuthState::load(&path).unwrap();
        assert_eq!(loaded.cookies, state.cookies);
    }
}
