//! File-backed build storage
//!
//! Each build is one pretty-printed JSON file named `<id>.json` in the
//! store directory. Records are written to a temporary file and hard-linked
//! into place; the link fails if the id is taken, so a committed record is
//! never replaced and a reader never observes a partial build. A record
//! that fails to parse is reported as corrupt rather than skipped.

use crate::storage::{sort_newest_first, Build, StorageError, StorageResult, Storer};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

const RECORD_EXTENSION: &str = "json";

/// Build storage in a directory of JSON records
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await.map_err(|e| {
            StorageError::io(format!("creating store directory {}", dir.display()), e)
        })?;

        debug!("Opened build store at {}", dir.display());
        Ok(Self { dir })
    }

    /// Directory holding the records
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn record_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(format!("{}.{}", id, RECORD_EXTENSION))
    }

    /// Read every record in the store
    async fn load_all(&self) -> StorageResult<Vec<Build>> {
        let mut builds = vec![];
        let mut entries = fs::read_dir(&self.dir).await.map_err(|e| {
            StorageError::io(format!("reading store directory {}", self.dir.display()), e)
        })?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::io("reading store entry", e))?
        {
            let path = entry.path();
            if !path.extension().is_some_and(|ext| ext == RECORD_EXTENSION) {
                continue;
            }

            let content = fs::read_to_string(&path).await.map_err(|e| {
                StorageError::io(format!("reading build record {}", path.display()), e)
            })?;
            let build: Build = serde_json::from_str(&content)
                .map_err(|source| StorageError::Corrupt { path, source })?;
            builds.push(build);
        }

        Ok(builds)
    }

    /// Builds of an application within `branch`, newest first
    ///
    /// Builds with equal timestamps are ordered by descending id, so the
    /// result does not depend on directory listing order.
    async fn scoped(&self, app_name: &str, branch: Option<&str>) -> StorageResult<Vec<Build>> {
        let mut builds: Vec<Build> = self
            .load_all()
            .await?
            .into_iter()
            .filter(|b| b.in_scope(app_name, branch))
            .collect();
        builds.sort_by(|a, b| b.id.cmp(&a.id));
        sort_newest_first(&mut builds);
        Ok(builds)
    }
}

#[async_trait]
impl Storer for FileStore {
    async fn list_builds_per_app(
        &self,
        app_name: &str,
        max_results: usize,
    ) -> StorageResult<Vec<Build>> {
        let mut builds = self.scoped(app_name, None).await?;
        builds.truncate(max_results);
        Ok(builds)
    }

    async fn latest_build_by_digest(
        &self,
        app_name: &str,
        total_input_digest: &str,
        branch: Option<&str>,
    ) -> StorageResult<Option<Build>> {
        Ok(self
            .scoped(app_name, branch)
            .await?
            .into_iter()
            .find(|b| b.total_input_digest == total_input_digest))
    }

    async fn last_build_compare_digest(
        &self,
        app_name: &str,
        digest: &str,
        branch: Option<&str>,
    ) -> StorageResult<Option<Build>> {
        Ok(self
            .scoped(app_name, branch)
            .await?
            .into_iter()
            .next()
            .filter(|b| b.total_input_digest == digest))
    }

    async fn are_builds_for_branch(&self, app_name: &str, branch: &str) -> StorageResult<bool> {
        Ok(self
            .load_all()
            .await?
            .iter()
            .any(|b| b.in_scope(app_name, Some(branch))))
    }

    async fn save(&self, build: &Build) -> StorageResult<Uuid> {
        let id = build.id.unwrap_or_else(Uuid::new_v4);
        let path = self.record_path(id);

        let record = Build {
            id: Some(id),
            ..build.clone()
        };
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| StorageError::Internal(format!("serializing build: {}", e)))?;

        let tmp = self.dir.join(format!("{}.{}.tmp", id, Uuid::new_v4()));
        fs::write(&tmp, content)
            .await
            .map_err(|e| StorageError::io(format!("writing build record {}", tmp.display()), e))?;

        let committed = fs::hard_link(&tmp, &path).await;
        let cleanup = fs::remove_file(&tmp).await;
        match committed {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StorageError::AlreadyExists(id));
            }
            Err(e) => {
                return Err(StorageError::io(
                    format!("committing build record {}", path.display()),
                    e,
                ));
            }
        }
        cleanup.map_err(|e| {
            StorageError::io(format!("removing temporary record {}", tmp.display()), e)
        })?;

        debug!("Saved build {} of {} to {}", id, build.app_name, path.display());
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
