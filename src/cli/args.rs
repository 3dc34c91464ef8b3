//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// prebuilt - content-digest build cache
///
/// Decides whether an application's current inputs were already built by
/// comparing their digest against recorded builds.
#[derive(Parser, Debug)]
#[command(name = "prebuilt")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path (defaults to the nearest .prebuilt.toml)
    #[arg(short, long, global = true, env = "PREBUILT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show whether builds exist for the current inputs
    Status(StatusArgs),

    /// List recorded builds of an application
    Ls(LsArgs),

    /// Record a build of an application's current inputs
    Record(RecordArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Applications to check (defaults to all)
    pub apps: Vec<String>,

    /// Current branch
    #[arg(short, long, env = "PREBUILT_BRANCH", default_value = "")]
    pub branch: String,

    /// Branch to fall back to when the current branch has no builds
    #[arg(long, env = "PREBUILT_COMPARE_BRANCH")]
    pub compare: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the ls command
#[derive(Parser, Debug)]
pub struct LsArgs {
    /// Application name
    pub app: String,

    /// Maximum number of builds (default: from config)
    #[arg(short = 'n', long)]
    pub max: Option<usize>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the record command
#[derive(Parser, Debug)]
pub struct RecordArgs {
    /// Application name
    pub app: String,

    /// Branch the build was made on
    #[arg(short, long, env = "PREBUILT_BRANCH")]
    pub branch: Option<String>,

    /// Build outputs (NAME=URI); the type follows the URI scheme
    #[arg(short, long, value_parser = parse_output)]
    pub output: Vec<(String, String)>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Initialize default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}

/// Parse a build output in NAME=URI format
fn parse_output(s: &str) -> Result<(String, String), String> {
    let (name, uri) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid NAME=URI format: no '=' found in '{s}'"))?;
    if name.is_empty() || uri.is_empty() {
        return Err(format!("invalid NAME=URI format: empty name or URI in '{s}'"));
    }
    Ok((name.to_string(), uri.to_string()))
}
