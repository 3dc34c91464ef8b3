//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{PrebuiltError, PrebuiltResult};
use console::style;
use std::path::PathBuf;

/// Storage path written by `config init`
const INIT_STORAGE_PATH: &str = ".prebuilt/builds";

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager) -> PrebuiltResult<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => {
            let config = manager.load().await?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", manager.path().display());
        }
        ConfigAction::Init { force } => {
            if manager.path().exists() && !force {
                return Err(PrebuiltError::ConfigExists(manager.path().to_path_buf()));
            }

            let mut config = Config::default();
            config.storage.path = Some(PathBuf::from(INIT_STORAGE_PATH));
            manager.save(&config).await?;

            println!(
                "{} Wrote {}",
                style("✓").green(),
                manager.path().display()
            );
        }
    }

    Ok(())
}
