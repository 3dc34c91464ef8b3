//! Error types for prebuilt
//!
//! All modules use `PrebuiltResult<T>` as their return type. Storage
//! backends report their own [`StorageError`], which the decision
//! procedure wraps with the stage that failed.

use crate::storage::StorageError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for prebuilt operations
pub type PrebuiltResult<T> = Result<T, PrebuiltError>;

/// All errors that can occur in prebuilt
#[derive(Error, Debug)]
pub enum PrebuiltError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Configuration file already exists: {0}")]
    ConfigExists(PathBuf),

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Application not found: {0}")]
    AppNotFound(String),

    // Digest errors
    #[error("Failed to digest {path}: {source}")]
    FileDigest {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("calculating total input digest failed: {source}")]
    TotalInputDigest {
        #[source]
        source: Box<PrebuiltError>,
    },

    #[error("Invalid build status value: {0}")]
    InvalidBuildStatus(u8),

    // Storage errors
    #[error("Checking branch builds failed: {0}")]
    BranchBuilds(#[source] StorageError),

    #[error("fetching latest build failed: {0}")]
    FetchLatestBuild(#[source] StorageError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl PrebuiltError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a digest failure with the total-input-digest stage
    pub fn total_input_digest(source: PrebuiltError) -> Self {
        Self::TotalInputDigest {
            source: Box::new(source),
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => Some("Run: prebuilt config init"),
            Self::ConfigExists(_) => Some("Pass --force to overwrite it"),
            Self::AppNotFound(_) => Some("Declare the application as an [[apps]] entry in .prebuilt.toml"),
            Self::TotalInputDigest { .. } => {
                Some("Check that every declared input exists relative to the repository root")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn error_display() {
        let err = PrebuiltError::AppNotFound("svc".to_string());
        assert!(err.to_string().contains("Application not found: svc"));
    }

    #[test]
    fn error_hint() {
        let err = PrebuiltError::ConfigNotFound(PathBuf::from(".prebuilt.toml"));
        assert_eq!(err.hint(), Some("Run: prebuilt config init"));
        assert_eq!(PrebuiltError::User("x".to_string()).hint(), None);
    }

    #[test]
    fn total_input_digest_wraps_context() {
        let inner = PrebuiltError::FileDigest {
            path: PathBuf::from("/repo/src/main.go"),
            source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
        };
        let err = PrebuiltError::total_input_digest(inner);

        let msg = err.to_string();
        assert!(msg.starts_with("calculating total input digest failed"));
        assert!(msg.contains("/repo/src/main.go"));
    }

    #[test]
    fn storage_failures_carry_stage() {
        let err = PrebuiltError::FetchLatestBuild(StorageError::Internal("down".to_string()));
        assert!(err.to_string().starts_with("fetching latest build failed"));

        let err = PrebuiltError::BranchBuilds(StorageError::Internal("down".to_string()));
        assert!(err.to_string().starts_with("Checking branch builds failed"));
    }
}
