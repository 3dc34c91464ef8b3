//! Input files of an application
//!
//! An input is identified by its path relative to the repository root. The
//! absolute path is joined once at construction and never recomputed.

use crate::digest::{self, Digest};
use crate::error::PrebuiltResult;
use crate::storage::Input;
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Scheme tag of input locators
pub const LOCATOR_SCHEME: &str = "file://";

/// A declared input file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    repo_root: PathBuf,
    rel_path: PathBuf,
    abs_path: PathBuf,
}

impl InputFile {
    /// Create an input file from the repository root and a relative path
    pub fn new(repo_root: impl Into<PathBuf>, rel_path: impl Into<PathBuf>) -> Self {
        let repo_root = repo_root.into();
        let rel_path = rel_path.into();
        let abs_path = repo_root.join(&rel_path);

        Self {
            repo_root,
            rel_path,
            abs_path,
        }
    }

    /// Digest of the file's current contents
    pub fn digest(&self) -> PrebuiltResult<Digest> {
        digest::file(&self.abs_path)
    }

    /// Absolute path
    pub fn path(&self) -> &Path {
        &self.abs_path
    }

    /// Path relative to the repository root
    pub fn repo_rel_path(&self) -> &Path {
        &self.rel_path
    }

    /// Repository root the file belongs to
    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Machine independent locator, e.g. `file://src/main.go`
    ///
    /// Built from the relative path with `/` separators so the same input
    /// yields the same locator on every checkout.
    pub fn locator(&self) -> String {
        let parts: Vec<_> = self
            .rel_path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();

        format!("{}{}", LOCATOR_SCHEME, parts.join("/"))
    }

    /// Persisted form of this input with the given digest
    pub fn to_record(&self, digest: &Digest) -> Input {
        Input {
            url: self.locator(),
            digest: digest.to_string(),
        }
    }
}

impl fmt::Display for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abs_path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn paths_are_joined_once() {
        let file = InputFile::new("/repo", "src/main.go");

        assert_eq!(file.path(), Path::new("/repo/src/main.go"));
        assert_eq!(file.repo_rel_path(), Path::new("src/main.go"));
        assert_eq!(file.repo_root(), Path::new("/repo"));
        assert_eq!(file.to_string(), "/repo/src/main.go");
    }

    #[test]
    fn locator_ignores_repo_root() {
        let a = InputFile::new("/home/ci/repo", "src/main.go");
        let b = InputFile::new("/tmp/checkout", "./src/main.go");

        assert_eq!(a.locator(), "file://src/main.go");
        assert_eq!(a.locator(), b.locator());
    }

    #[test]
    fn digest_reads_absolute_path() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        fs::write(dir.path().join("src/main.go"), b"package main").unwrap();

        let file = InputFile::new(dir.path(), "src/main.go");
        let expected = digest::file(&dir.path().join("src/main.go")).unwrap();

        assert_eq!(file.digest().unwrap(), expected);
    }

    #[test]
    fn digest_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = InputFile::new(dir.path(), "src/missing.go");
        assert!(file.digest().is_err());
    }

    #[test]
    fn to_record_uses_locator() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), b"module svc").unwrap();
        let file = InputFile::new(dir.path(), "go.mod");
        let digest = file.digest().unwrap();

        let record = file.to_record(&digest);

        assert_eq!(record.url, "file://go.mod");
        assert_eq!(record.digest, digest.to_string());
    }
}
