//! Record command - persist a build of an application's current inputs
//!
//! Only the build metadata is stored. Running the build and uploading its
//! outputs happen elsewhere.

use crate::cli::args::RecordArgs;
use crate::cli::commands::open_store;
use crate::config::{Config, ConfigManager};
use crate::digest;
use crate::error::{PrebuiltError, PrebuiltResult};
use crate::storage::{Build, Output, OutputType, Storer};
use chrono::Utc;
use console::style;
use std::time::Duration;
use tracing::info;

/// Execute the record command
pub async fn execute(
    args: RecordArgs,
    manager: &ConfigManager,
    config: &Config,
) -> PrebuiltResult<()> {
    let app = manager.app(config, &args.app)?;

    if !app.has_build_cmd() {
        return Err(PrebuiltError::User(format!(
            "{} has no build command, nothing to record",
            app.name
        )));
    }
    if !app.has_build_inputs() {
        return Err(PrebuiltError::User(format!(
            "{} declares no inputs, nothing to record",
            app.name
        )));
    }

    let start = Utc::now();
    let digests = app
        .input_digests()
        .map_err(PrebuiltError::total_input_digest)?;
    let total = digest::sum(digests.iter().map(|(_, d)| d));

    let outputs = args
        .output
        .into_iter()
        .map(|(name, uri)| Output {
            output_type: OutputType::from_uri(&uri),
            name,
            uri,
            digest: String::new(),
            size_bytes: 0,
            upload_duration: Duration::ZERO,
        })
        .collect();

    let build = Build {
        id: None,
        app_name: app.name.clone(),
        branch: args.branch.filter(|b| !b.is_empty()),
        start_timestamp: start,
        stop_timestamp: Utc::now(),
        total_input_digest: total.to_string(),
        outputs,
        inputs: digests
            .iter()
            .map(|(input, digest)| input.to_record(digest))
            .collect(),
    };

    let store = open_store(manager, config).await?;
    let id = store.save(&build).await?;
    info!("Recorded build {} of {} in {} store", id, app.name, store.backend_name());

    println!(
        "{} Recorded build {} of {} ({})",
        style("✓").green(),
        id,
        app.name,
        total
    );
    Ok(())
}
