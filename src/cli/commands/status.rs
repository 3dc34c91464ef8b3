//! Status command - show whether builds exist for current inputs

use crate::cli::args::{OutputFormat, StatusArgs};
use crate::cli::commands::{open_store, short};
use crate::config::{Config, ConfigManager};
use crate::error::PrebuiltResult;
use crate::status::{build_status, BuildDecision, BuildStatus};
use crate::storage::Build;
use console::style;
use tracing::debug;

/// Execute the status command
pub async fn execute(
    args: StatusArgs,
    manager: &ConfigManager,
    config: &Config,
) -> PrebuiltResult<()> {
    let apps = if args.apps.is_empty() {
        manager.apps(config)?
    } else {
        args.apps
            .iter()
            .map(|name| manager.app(config, name))
            .collect::<PrebuiltResult<Vec<_>>>()?
    };

    if apps.is_empty() {
        match args.format {
            OutputFormat::Json => println!("[]"),
            OutputFormat::Plain => {}
            OutputFormat::Table => println!("No applications configured."),
        }
        return Ok(());
    }

    let store = open_store(manager, config).await?;

    // Apps are checked one after another; a failure aborts the command
    let mut rows = Vec::with_capacity(apps.len());
    for app in &apps {
        debug!("Checking build status of {}", app.name);
        let decision = build_status(&store, app, &args.branch, args.compare.as_deref()).await?;
        rows.push((app.name.clone(), decision));
    }

    match args.format {
        OutputFormat::Table => print_table(&rows),
        OutputFormat::Json => print_json(&rows)?,
        OutputFormat::Plain => print_plain(&rows),
    }

    Ok(())
}

fn print_table(rows: &[(String, BuildDecision)]) {
    println!(
        "{:<20} {:<25} {:<10} {:<20}",
        style("APP").bold(),
        style("STATUS").bold(),
        style("BUILD").bold(),
        style("BRANCH").bold()
    );
    println!("{}", "-".repeat(77));

    for (name, decision) in rows {
        let status = match decision.status {
            BuildStatus::Exist => style(decision.status.to_string()).green(),
            BuildStatus::Pending => style(decision.status.to_string()).yellow(),
            BuildStatus::InputsUndefined | BuildStatus::BuildCommandUndefined => {
                style(decision.status.to_string()).dim()
            }
        };

        let build = decision
            .build
            .as_ref()
            .and_then(|b| b.id)
            .map(|id| short(&id.to_string(), 8).to_string())
            .unwrap_or_else(|| "-".to_string());
        let branch = decision.query_branch.as_deref().unwrap_or("*");

        println!("{:<20} {:<25} {:<10} {:<20}", name, status, build, branch);
    }
}

fn print_json(rows: &[(String, BuildDecision)]) -> PrebuiltResult<()> {
    #[derive(serde::Serialize)]
    struct StatusJson<'a> {
        app: &'a str,
        status: BuildStatus,
        build: Option<&'a Build>,
        query_branch: Option<&'a str>,
    }

    let json: Vec<StatusJson> = rows
        .iter()
        .map(|(name, decision)| StatusJson {
            app: name,
            status: decision.status,
            build: decision.build.as_ref(),
            query_branch: decision.query_branch.as_deref(),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_plain(rows: &[(String, BuildDecision)]) {
    for (name, decision) in rows {
        println!("{} {}", name, decision.status);
    }
}
