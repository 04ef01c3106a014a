//! Error types for runner-config

use std::fmt;
use std::path::PathBuf;

/// Result type for runner-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or rendering configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize configuration: {message}")]
    Serialize { message: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// A single schema violation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Location of the offending value, e.g. `runners[0].ids[1]`.
    /// Empty for the document root.
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "<root>: {}", self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

/// A document failed validation against its schema.
///
/// Carries the originating file path when the document came from a local
/// file, and `None` for documents fetched from a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub path: Option<PathBuf>,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(path: Option<PathBuf>, errors: Vec<FieldError>) -> Self {
        Self { path, errors }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(
                f,
                "Could not validate the config file \"{}\", error:",
                path.display()
            )?,
            None => write!(f, "Could not validate the configuration, error:")?,
        }
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
