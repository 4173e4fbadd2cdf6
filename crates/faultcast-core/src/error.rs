//! Error types for settings loading and precondition checks
//!
//! Precondition failures are the only errors surfaced synchronously to a
//! caller; everything about delivery is reported out-of-band by the reporter.

use std::path::PathBuf;

use thiserror::Error;

/// A precondition that must hold before settings are accepted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PreconditionError {
    /// The endpoint is not a well-formed absolute or relative URI
    #[error("Invalid URI: {uri:?} ({reason})")]
    MalformedEndpoint {
        /// The rejected input
        uri: String,
        /// Which rule the input broke
        reason: String,
    },

    /// The storage path does not exist or is not a directory
    #[error("Invalid path to directory: {0}")]
    StorageNotFound(PathBuf),

    /// The storage directory already contains files or subdirectories
    #[error("Directory is not empty: {0}")]
    StorageNotEmpty(PathBuf),

    /// The storage directory exists but could not be listed
    #[error("Cannot read directory {path}: {message}")]
    StorageUnreadable {
        /// Directory that failed to list
        path: PathBuf,
        /// Underlying I/O error text
        message: String,
    },
}

impl PreconditionError {
    pub(crate) fn malformed(uri: &str, reason: impl Into<String>) -> Self {
        PreconditionError::MalformedEndpoint {
            uri: uri.to_string(),
            reason: reason.into(),
        }
    }

    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            PreconditionError::MalformedEndpoint { .. } => "malformed_endpoint",
            PreconditionError::StorageNotFound(_) => "storage_not_found",
            PreconditionError::StorageNotEmpty(_) => "storage_not_empty",
            PreconditionError::StorageUnreadable { .. } => "storage_unreadable",
        }
    }
}

/// Errors raised while loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PreconditionError::StorageNotEmpty(PathBuf::from("/var/reports"));
        assert_eq!(err.to_string(), "Directory is not empty: /var/reports");

        let err = PreconditionError::malformed("a b", "contains whitespace");
        assert_eq!(err.to_string(), "Invalid URI: \"a b\" (contains whitespace)");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let missing = PreconditionError::StorageNotFound(PathBuf::from("/x"));
        let full = PreconditionError::StorageNotEmpty(PathBuf::from("/x"));
        assert_ne!(missing.kind(), full.kind());
        assert_ne!(missing, full);
    }
}
