//! Ls command - list recorded builds of an application

use crate::cli::args::{LsArgs, OutputFormat};
use crate::cli::commands::{open_store, short};
use crate::config::{Config, ConfigManager};
use crate::error::PrebuiltResult;
use crate::storage::{Build, Storer};
use console::style;

/// Execute the ls command
pub async fn execute(args: LsArgs, manager: &ConfigManager, config: &Config) -> PrebuiltResult<()> {
    let store = open_store(manager, config).await?;
    let max = args.max.unwrap_or(config.storage.list_limit);
    let builds = store.list_builds_per_app(&args.app, max).await?;

    if builds.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No builds recorded for {}.", args.app),
        }
        return Ok(());
    }

    match args.format {
        OutputFormat::Table => print_table(&builds),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&builds)?),
        OutputFormat::Plain => print_plain(&builds),
    }

    Ok(())
}

fn print_table(builds: &[Build]) {
    println!(
        "{:<10} {:<15} {:<18} {:<10} {:<22}",
        style("ID").bold(),
        style("BRANCH").bold(),
        style("STOPPED").bold(),
        style("DURATION").bold(),
        style("DIGEST").bold()
    );
    println!("{}", "-".repeat(79));

    for build in builds {
        let id = build.id.map(|id| id.to_string()).unwrap_or_default();
        let stopped = build.stop_timestamp.format("%Y-%m-%d %H:%M").to_string();
        let duration = format!("{}s", build.duration().num_seconds());

        println!(
            "{:<10} {:<15} {:<18} {:<10} {:<22}",
            short(&id, 8),
            build.branch.as_deref().unwrap_or("-"),
            stopped,
            duration,
            short(&build.total_input_digest, 19)
        );
    }

    println!();
    println!("{} build(s)", builds.len());
}

fn print_plain(builds: &[Build]) {
    for build in builds {
        if let Some(id) = build.id {
            println!("{}", id);
        }
    }
}
