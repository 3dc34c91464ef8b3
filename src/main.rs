//! prebuilt - content-digest build cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use prebuilt::cli::{Cli, Commands};
use prebuilt::config::ConfigManager;
use prebuilt::error::{PrebuiltError, PrebuiltResult};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging: 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, json: bool) {
    let filter = match verbose {
        0 => EnvFilter::new("prebuilt=warn"),
        1 => EnvFilter::new("prebuilt=info"),
        _ => EnvFilter::new("prebuilt=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}

async fn run() -> PrebuiltResult<()> {
    let cli = Cli::parse();

    let manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        let cwd = std::env::current_dir()
            .map_err(|e| PrebuiltError::io("getting current directory", e))?;
        ConfigManager::discover(&cwd)
    };

    // Config command works on missing or broken config files
    if let Commands::Config(args) = cli.command {
        init_logging(cli.verbose, cli.log_json);
        return prebuilt::cli::commands::config(args, &manager).await;
    }

    // An explicitly named config must exist; a discovered one may be absent
    if cli.config.is_some() && !manager.path().exists() {
        return Err(PrebuiltError::ConfigNotFound(manager.path().to_path_buf()));
    }

    let config = manager.load().await?;
    init_logging(
        cli.verbose,
        cli.log_json || config.general.log_format == "json",
    );
    debug!("Using config {}", manager.path().display());

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Status(args) => prebuilt::cli::commands::status(args, &manager, &config).await,
        Commands::Ls(args) => prebuilt::cli::commands::ls(args, &manager, &config).await,
        Commands::Record(args) => prebuilt::cli::commands::record(args, &manager, &config).await,
    }
}
