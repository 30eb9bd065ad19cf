//! Persona description loaded from disk.

use std::path::Path;

use crate::errors::{AutopostError, AutopostResult};

/// Free-form description of the voice posts are written in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Persona {
    text: String,
}

impl Persona {
    /// Wrap persona text. Blank text is rejected.
    pub fn new(text: impl Into<String>) -> AutopostResult<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(AutopostError::Config {
                reason: "persona text is empty".to_string(),
            });
        }
        Ok(Self { text })
    }

    /// Read the persona file at `path`.
    pub fn load(path: &Path) -> AutopostResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| AutopostError::Config {
            reason: format!("cannot read persona file '{}': {e}", path.display()),
        })?;
        Self::new(text).map_err(|_| AutopostError::Config {
            reason: format!("persona file '{}' is empty", path.display()),
        })
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_persona() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "A pragmatic infrastructure engineer.").unwrap();

        let persona = Persona::load(file.path()).unwrap();
        assert!(persona.text().contains("pragmatic"));
    }

    #[test]
    fn test_empty_persona_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "   ").unwrap();

        let err = Persona::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_missing_persona_rejected() {
        let err = Persona::load(Path::new("/nonexistent/persona.md")).unwrap_err();
        assert!(matches!(err, AutopostError::Config { .. }));
    }
}
