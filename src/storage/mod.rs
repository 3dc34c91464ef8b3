//! Build records and the storage contract
//!
//! A [`Build`] is a historical fact: once saved it is never updated. The
//! [`Storer`] trait is the only way the decision procedure reaches stored
//! builds, so any backend (files, memory, a database) can sit behind it.
//!
//! # Branch scoping
//!
//! Every branch-scoped query takes an optional branch. `None` and an empty
//! branch both mean "no filter": builds from all branches are considered.
//!
//! # Not found
//!
//! Lookups return `Ok(None)` when nothing matches. `Err` is reserved for
//! backend failures.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors reported by storage backends
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt build record {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Build {0} already exists")]
    AlreadyExists(Uuid),

    #[error("Storage lock poisoned")]
    LockPoisoned,

    #[error("Internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Type of a build output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OutputType {
    /// Container image pushed to a registry
    Docker,
    /// File uploaded to an S3 bucket
    S3,
    /// Any other artifact kind
    Other(String),
}

impl OutputType {
    /// Infer the output type from an artifact URI scheme
    pub fn from_uri(uri: &str) -> Self {
        match uri.split_once("://") {
            Some(("docker", _)) => Self::Docker,
            Some(("s3", _)) => Self::S3,
            Some((scheme, _)) => Self::Other(scheme.to_string()),
            None => Self::Other("file".to_string()),
        }
    }
}

impl From<String> for OutputType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "docker" => Self::Docker,
            "s3" => Self::S3,
            _ => Self::Other(s),
        }
    }
}

impl From<OutputType> for String {
    fn from(t: OutputType) -> Self {
        t.to_string()
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Docker => write!(f, "docker"),
            Self::S3 => write!(f, "s3"),
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// A build artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub name: String,
    #[serde(rename = "type")]
    pub output_type: OutputType,
    pub uri: String,
    pub digest: String,
    pub size_bytes: u64,
    #[serde(rename = "upload_duration_ms", with = "duration_ms")]
    pub upload_duration: Duration,
}

/// An input a build was produced from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Input {
    /// Canonical locator, e.g. `file://src/main.go`
    pub url: String,
    pub digest: String,
}

/// A recorded build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    /// Assigned by storage on save
    #[serde(default)]
    pub id: Option<Uuid>,

    pub app_name: String,

    /// Branch the build was recorded on
    #[serde(default)]
    pub branch: Option<String>,

    pub start_timestamp: DateTime<Utc>,
    pub stop_timestamp: DateTime<Utc>,
    pub total_input_digest: String,
    pub outputs: Vec<Output>,
    pub inputs: Vec<Input>,
}

impl Build {
    /// Application name in lowercase
    pub fn app_name_lower(&self) -> String {
        self.app_name.to_lowercase()
    }

    /// Time the build took
    pub fn duration(&self) -> chrono::Duration {
        self.stop_timestamp - self.start_timestamp
    }

    /// Whether the build belongs to `app_name` and lies within `branch`
    pub(crate) fn in_scope(&self, app_name: &str, branch: Option<&str>) -> bool {
        if !self.app_name.eq_ignore_ascii_case(app_name) {
            return false;
        }

        match branch.filter(|b| !b.is_empty()) {
            Some(branch) => self.branch.as_deref() == Some(branch),
            None => true,
        }
    }
}

/// Persistence for build records
///
/// Application names are matched case-insensitively. Implementations are
/// responsible for their own concurrency safety; a saved build must become
/// visible atomically.
#[async_trait]
pub trait Storer: Send + Sync {
    /// Builds of an application, newest first, at most `max_results`
    async fn list_builds_per_app(&self, app_name: &str, max_results: usize)
        -> StorageResult<Vec<Build>>;

    /// Most recent build of the application with the given total input digest
    async fn latest_build_by_digest(
        &self,
        app_name: &str,
        total_input_digest: &str,
        branch: Option<&str>,
    ) -> StorageResult<Option<Build>>;

    /// Most recent build of the application, if its digest equals `digest`
    ///
    /// Only the last build is considered: an older build with a matching
    /// digest is not returned.
    async fn last_build_compare_digest(
        &self,
        app_name: &str,
        digest: &str,
        branch: Option<&str>,
    ) -> StorageResult<Option<Build>>;

    /// Whether any build of the application was recorded on `branch`
    async fn are_builds_for_branch(&self, app_name: &str, branch: &str) -> StorageResult<bool>;

    /// Persist a completed build and return its id
    async fn save(&self, build: &Build) -> StorageResult<Uuid>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Order builds newest first by stop time, then start time
///
/// The sort is stable: builds that tie keep their relative order.
pub(crate) fn sort_newest_first(builds: &mut [Build]) {
    builds.sort_by(|a, b| {
        b.stop_timestamp
            .cmp(&a.stop_timestamp)
            .then(b.start_timestamp.cmp(&a.start_timestamp))
    });
}

/// Serialize durations as whole milliseconds
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
