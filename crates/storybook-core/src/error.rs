//! Error types for Storybook.
//!
//! The history store, command processor and session never produce these:
//! they are total over their inputs. `StoryError` is used at the edges
//! (configuration loading and generated-structure validation).

use thiserror::Error;

/// A shared error type for the Storybook crates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoryError {
    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Generated story structure did not have the required shape
    #[error("Malformed story structure: {0}")]
    MalformedStory(String),
}

impl StoryError {
    /// Creates a MalformedStory error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedStory(message.into())
    }

    /// Check if this is a malformed-structure error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedStory(_))
    }
}

impl From<std::io::Error> for StoryError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for StoryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for StoryError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, StoryError>`.
pub type Result<T> = std::result::Result<T, StoryError>;
