//! Persistence error types.
//!
//! All persistence operations return structured errors that provide
//! user-friendly messages and optional remediation hints.

use std::path::PathBuf;
use thiserror::Error;

/// Persistence operation error.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but is not a document this crate understands.
    #[error("Invalid file format: {reason}")]
    InvalidFormat { path: PathBuf, reason: String },

    /// Store written by a newer schema.
    #[error("Store version {found} is not supported (maximum: {max_supported})")]
    UnsupportedVersion {
        found: u32,
        max_supported: u32,
        path: PathBuf,
    },

    /// Serialization error.
    #[error("Failed to serialize {what}")]
    Serialization {
        what: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Deserialization error.
    #[error("Failed to deserialize {what}")]
    Deserialization {
        what: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to complete save operation")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PersistenceError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn serialize(what: &'static str, source: serde_json::Error) -> Self {
        Self::Serialization {
            what,
            source: Box::new(source),
        }
    }

    pub(crate) fn deserialize(what: &'static str, source: serde_json::Error) -> Self {
        Self::Deserialization {
            what,
            source: Box::new(source),
        }
    }

    /// Get a user-friendly message for this error.
    pub fn user_message(&self) -> String {
        match self {
            Self::Io {
                operation, path, ..
            } => {
                format!("Could not {} the file at {}", operation, path.display())
            }
            Self::InvalidFormat { path, reason } => {
                format!(
                    "The file at {} could not be understood: {}",
                    path.display(),
                    reason
                )
            }
            Self::UnsupportedVersion {
                found,
                max_supported,
                path,
            } => {
                format!(
                    "The store at {} was written by a newer version \
                    (store version {}, this version supports up to {}).",
                    path.display(),
                    found,
                    max_supported
                )
            }
            Self::Serialization { what, .. } => {
                format!("An error occurred while saving the {what}.")
            }
            Self::Deserialization { what, .. } => {
                format!("An error occurred while reading the {what}. The data may be corrupted.")
            }
            Self::AtomicWriteFailed { target_path, .. } => {
                format!(
                    "Could not save the file to {}. Please check disk space and permissions.",
                    target_path.display()
                )
            }
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Io { operation, .. } => {
                if *operation == "read" {
                    Some("Check that the file exists and you have permission to read it.".into())
                } else {
                    Some("Check that you have permission to write to this location.".into())
                }
            }
            Self::InvalidFormat { .. } => Some(
                "Datasets must be a JSON array of rows or an object with `fields` and `data`."
                    .into(),
            ),
            Self::UnsupportedVersion { .. } => {
                Some("Update the application or point it at a different store file.".into())
            }
            Self::Serialization { .. } => None,
            Self::Deserialization { .. } => {
                Some("Remove the damaged entry or start with a fresh store file.".into())
            }
            Self::AtomicWriteFailed { .. } => {
                Some("Free up disk space or try saving to a different location.".into())
            }
        }
    }
}

/// What is wrong with a dataset document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("expected an array of rows or an object with `data`")]
    UnexpectedShape,

    #[error("`fields` must be an array")]
    FieldsNotArray,

    #[error("`data` must be an array of rows")]
    DataNotArray,

    #[error("missing `data` array")]
    MissingData,

    #[error("field without a name: {0}")]
    UnnamedField(String),

    #[error("row {index} is not an object: {found}")]
    RowNotObject { index: usize, found: String },
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
