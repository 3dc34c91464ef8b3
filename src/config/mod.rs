//! Configuration management for prebuilt
//!
//! The directory holding `.prebuilt.toml` is the repository root: input
//! paths and a relative storage path are resolved against it.

pub mod schema;

pub use schema::Config;

use crate::app::App;
use crate::error::{PrebuiltError, PrebuiltResult};
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Name of the repository configuration file
pub const CONFIG_FILE_NAME: &str = ".prebuilt.toml";

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Find the config by walking up from `start`, falling back to `start`
    pub fn discover(start: &Path) -> Self {
        let config_path = Self::find_config(start).unwrap_or_else(|| start.join(CONFIG_FILE_NAME));
        Self { config_path }
    }

    /// Search `start` and its ancestors for a config file
    pub fn find_config(start: &Path) -> Option<PathBuf> {
        start
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|path| path.is_file())
    }

    /// Default directory for build records
    pub fn default_storage_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prebuilt")
            .join("builds")
    }

    /// Repository root: the directory containing the config file
    pub fn repo_root(&self) -> &Path {
        match self.config_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Directory build records are stored in
    pub fn storage_dir(&self, config: &Config) -> PathBuf {
        match &config.storage.path {
            Some(path) => self.repo_root().join(path),
            None => Self::default_storage_dir(),
        }
    }

    /// Load configuration, using defaults if the file does not exist
    pub async fn load(&self) -> PrebuiltResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> PrebuiltResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| PrebuiltError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| PrebuiltError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> PrebuiltResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            PrebuiltError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> PrebuiltResult<()> {
        if let Some(parent) = self.config_path.parent() {
            if parent.as_os_str().is_empty() {
                return Ok(());
            }
            fs::create_dir_all(parent)
                .await
                .map_err(|e| PrebuiltError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// All applications declared in the config
    pub fn apps(&self, config: &Config) -> PrebuiltResult<Vec<App>> {
        let mut seen = HashSet::new();
        for app in &config.apps {
            if app.name.is_empty() {
                return Err(self.invalid("application with empty name"));
            }
            if !seen.insert(app.name.to_lowercase()) {
                return Err(self.invalid(format!("duplicate application {}", app.name)));
            }
            if let Some(input) = app.inputs.iter().find(|p| !is_repo_relative(p)) {
                return Err(self.invalid(format!(
                    "input {} of {} must be relative to the repository root",
                    input.display(),
                    app.name
                )));
            }
        }

        Ok(config
            .apps
            .iter()
            .map(|app| App::from_config(self.repo_root(), app))
            .collect())
    }

    /// A single application by name, matched case-insensitively
    pub fn app(&self, config: &Config, name: &str) -> PrebuiltResult<App> {
        self.apps(config)?
            .into_iter()
            .find(|app| app.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| PrebuiltError::AppNotFound(name.to_string()))
    }

    fn invalid(&self, reason: impl Into<String>) -> PrebuiltError {
        PrebuiltError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: reason.into(),
        }
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// A path that stays inside the directory it is joined to
fn is_repo_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::AppConfig;
    use tempfile::TempDir;

    fn app_config(name: &str) -> AppConfig {
        AppConfig {
            name: name.to_string(),
            build_command: vec!["make".to_string()],
            inputs: vec![PathBuf::from("src/main.go")],
            use_last_build: false,
        }
    }

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join(CONFIG_FILE_NAME));

        let config = manager.load().await.unwrap();
        assert!(config.apps.is_empty());
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(temp.path().join(CONFIG_FILE_NAME));

        let mut config = Config::default();
        config.apps.push(app_config("svc"));

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.apps, vec![app_config("svc")]);
    }

    #[tokio::test]
    async fn invalid_toml_reports_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "[[apps]\nname = ").unwrap();

        let err = ConfigManager::with_path(path.clone()).load().await.unwrap_err();
        match err {
            PrebuiltError::ConfigInvalid { path: p, .. } => assert_eq!(p, path),
            other => panic!("expected ConfigInvalid, got {other}"),
        }
    }

    #[test]
    fn discover_walks_up() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "").unwrap();
        let nested = temp.path().join("services/svc/src");
        std::fs::create_dir_all(&nested).unwrap();

        let manager = ConfigManager::discover(&nested);

        assert_eq!(manager.path(), temp.path().join(CONFIG_FILE_NAME));
        assert_eq!(manager.repo_root(), temp.path());
    }

    #[test]
    fn discover_falls_back_to_start() {
        let temp = TempDir::new().unwrap();
        let manager = ConfigManager::discover(temp.path());
        assert_eq!(manager.repo_root(), temp.path());
    }

    #[test]
    fn storage_dir_relative_to_repo_root() {
        let manager = ConfigManager::with_path(PathBuf::from("/repo/.prebuilt.toml"));
        let mut config = Config::default();

        assert_eq!(
            manager.storage_dir(&config),
            ConfigManager::default_storage_dir()
        );

        config.storage.path = Some(PathBuf::from(".prebuilt/builds"));
        assert_eq!(
            manager.storage_dir(&config),
            PathBuf::from("/repo/.prebuilt/builds")
        );
    }

    #[test]
    fn apps_resolved_against_repo_root() {
        let manager = ConfigManager::with_path(PathBuf::from("/repo/.prebuilt.toml"));
        let mut config = Config::default();
        config.apps.push(app_config("svc"));

        let app = manager.app(&config, "SVC").unwrap();
        assert_eq!(app.inputs()[0].path(), Path::new("/repo/src/main.go"));

        assert!(matches!(
            manager.app(&config, "web"),
            Err(PrebuiltError::AppNotFound(_))
        ));
    }

    #[test]
    fn duplicate_apps_rejected() {
        let manager = ConfigManager::with_path(PathBuf::from("/repo/.prebuilt.toml"));
        let mut config = Config::default();
        config.apps.push(app_config("svc"));
        config.apps.push(app_config("Svc"));

        assert!(matches!(
            manager.apps(&config),
            Err(PrebuiltError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn absolute_input_rejected() {
        let manager = ConfigManager::with_path(PathBuf::from("/repo/.prebuilt.toml"));
        let mut config = Config::default();
        let mut app = app_config("svc");
        app.inputs.push(PathBuf::from("/etc/passwd"));
        config.apps.push(app);

        match manager.apps(&config) {
            Err(PrebuiltError::ConfigInvalid { reason, .. }) => {
                assert!(reason.contains("/etc/passwd"));
            }
            other => panic!("expected ConfigInvalid, got {other:?}"),
        }
    }

    #[test]
    fn parent_dir_input_rejected() {
        let manager = ConfigManager::with_path(PathBuf::from("/repo/.prebuilt.toml"));
        let mut config = Config::default();
        let mut app = app_config("svc");
        app.inputs.push(PathBuf::from("src/../../outside.txt"));
        config.apps.push(app);

        assert!(matches!(
            manager.app(&config, "svc"),
            Err(PrebuiltError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn dot_prefixed_input_accepted() {
        let manager = ConfigManager::with_path(PathBuf::from("/repo/.prebuilt.toml"));
        let mut config = Config::default();
        let mut app = app_config("svc");
        app.inputs = vec![PathBuf::from("./go.mod")];
        config.apps.push(app);

        let app = manager.app(&config, "svc").unwrap();
        assert_eq!(app.inputs()[0].path(), Path::new("/repo/go.mod"));
    }
}
