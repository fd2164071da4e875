//! Goal input - a single free-text objective read from a file

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

/// The user-supplied objective driving the planner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Goal(String);

impl Goal {
    /// Create a goal from text; blank text is no goal at all.
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    /// Read the goal file.
    ///
    /// A missing or empty file means there is nothing to do and yields `Ok(None)`.
    pub fn load(path: impl AsRef<Path>) -> Result<Option<Self>> {
        match fs::read_to_string(path.as_ref()) {
            Ok(content) => Ok(Self::new(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Goal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
