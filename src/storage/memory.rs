//! In-process build storage
//!
//! Holds build records in memory. Used by tests and for dry runs; nothing
//! survives the process.

use crate::storage::{sort_newest_first, Build, StorageError, StorageResult, Storer};
use async_trait::async_trait;
use std::sync::RwLock;
use uuid::Uuid;

/// Build storage kept in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    builds: RwLock<Vec<Build>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds of an application within `branch`, newest first
    ///
    /// On equal timestamps the build saved later counts as newer.
    fn scoped(&self, app_name: &str, branch: Option<&str>) -> StorageResult<Vec<Build>> {
        let builds = self.builds.read().map_err(|_| StorageError::LockPoisoned)?;
        let mut scoped: Vec<Build> = builds
            .iter()
            .rev()
            .filter(|b| b.in_scope(app_name, branch))
            .cloned()
            .collect();
        sort_newest_first(&mut scoped);
        Ok(scoped)
    }
}

#[async_trait]
impl Storer for MemoryStore {
    async fn list_builds_per_app(
        &self,
        app_name: &str,
        max_results: usize,
    ) -> StorageResult<Vec<Build>> {
        let mut builds = self.scoped(app_name, None)?;
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
            .scoped(app_name, branch)?
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
            .scoped(app_name, branch)?
            .into_iter()
            .next()
            .filter(|b| b.total_input_digest == digest))
    }

    async fn are_builds_for_branch(&self, app_name: &str, branch: &str) -> StorageResult<bool> {
        let builds = self.builds.read().map_err(|_| StorageError::LockPoisoned)?;
        Ok(builds.iter().any(|b| b.in_scope(app_name, Some(branch))))
    }

    async fn save(&self, build: &Build) -> StorageResult<Uuid> {
        let mut builds = self.builds.write().map_err(|_| StorageError::LockPoisoned)?;

        let id = build.id.unwrap_or_else(Uuid::new_v4);
        if builds.iter().any(|b| b.id == Some(id)) {
            return Err(StorageError::AlreadyExists(id));
        }

        builds.push(Build {
            id: Some(id),
            ..build.clone()
        });
        Ok(id)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
