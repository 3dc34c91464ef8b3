//! Application descriptors
//!
//! An application is a named unit with a build command and a set of input
//! files. Its total input digest is the cache key looked up in storage.

use crate::config::schema::AppConfig;
use crate::digest::{self, Digest};
use crate::error::PrebuiltResult;
use crate::input::InputFile;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

/// An application and its declared build inputs
#[derive(Debug, Clone)]
pub struct App {
    /// Application name
    pub name: String,

    /// Build command; empty means undefined
    pub build_cmd: Vec<String>,

    /// Compare against the last build instead of any build with the digest
    pub use_last_build: bool,

    inputs: Vec<InputFile>,
}

impl App {
    /// Create an application descriptor
    ///
    /// Inputs are kept sorted by repository-relative path with duplicates
    /// removed, which fixes the order of the total input digest. `.`
    /// components are dropped first, so `./go.mod` and `go.mod` are one input.
    pub fn new<P: Into<PathBuf>>(
        name: impl Into<String>,
        build_cmd: Vec<String>,
        repo_root: &Path,
        inputs: impl IntoIterator<Item = P>,
        use_last_build: bool,
    ) -> Self {
        let mut rel_paths: Vec<PathBuf> = inputs
            .into_iter()
            .map(|p| {
                let path: PathBuf = p.into();
                path.components()
                    .filter(|c| !matches!(c, Component::CurDir))
                    .collect()
            })
            .collect();
        rel_paths.sort();
        rel_paths.dedup();

        Self {
            name: name.into(),
            build_cmd,
            use_last_build,
            inputs: rel_paths
                .into_iter()
                .map(|rel| InputFile::new(repo_root, rel))
                .collect(),
        }
    }

    /// Build a descriptor from an `[[apps]]` config entry
    pub fn from_config(repo_root: &Path, config: &AppConfig) -> Self {
        Self::new(
            config.name.clone(),
            config.build_command.clone(),
            repo_root,
            config.inputs.iter().cloned(),
            config.use_last_build,
        )
    }

    /// Whether any input files are declared
    pub fn has_build_inputs(&self) -> bool {
        !self.inputs.is_empty()
    }

    /// Whether a build command is declared
    pub fn has_build_cmd(&self) -> bool {
        !self.build_cmd.is_empty()
    }

    /// Declared inputs, ordered by repository-relative path
    pub fn inputs(&self) -> &[InputFile] {
        &self.inputs
    }

    /// Digest every input, in input order
    ///
    /// Fails on the first input that cannot be read; no input is skipped.
    pub fn input_digests(&self) -> PrebuiltResult<Vec<(&InputFile, Digest)>> {
        self.inputs
            .iter()
            .map(|input| input.digest().map(|digest| (input, digest)))
            .collect()
    }

    /// Digest over all input digests
    pub fn total_input_digest(&self) -> PrebuiltResult<Digest> {
        let digests = self.input_digests()?;
        let total = digest::sum(digests.iter().map(|(_, d)| d));

        debug!(
            "Total input digest of {} over {} inputs: {}",
            self.name,
            digests.len(),
            total
        );
        Ok(total)
    }
}
