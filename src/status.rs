//! Build status decision
//!
//! Answers "was this exact input set already built?" for an application.
//!
//! # Precedence
//!
//! | Check | Status |
//! |-------|--------|
//! | build command empty | `BuildCommandUndefined` |
//! | no inputs declared | `InputsUndefined` |
//! | matching build stored | `Exist` |
//! | no matching build | `Pending` |
//!
//! Storage is queried one call at a time, in the order above.

use crate::app::App;
use crate::error::{PrebuiltError, PrebuiltResult};
use crate::storage::{Build, Storer};
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

/// Whether a build exists for the current application inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum BuildStatus {
    /// The application declares no input files
    InputsUndefined = 1,
    /// The application declares no build command
    BuildCommandUndefined = 2,
    /// A build with the same inputs was recorded
    Exist = 3,
    /// No build with the same inputs was recorded
    Pending = 4,
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InputsUndefined => "Inputs Undefined",
            Self::BuildCommandUndefined => "Build Command Undefined",
            Self::Exist => "Exist",
            Self::Pending => "Pending",
        };
        write!(f, "{}", s)
    }
}

impl TryFrom<u8> for BuildStatus {
    type Error = PrebuiltError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::InputsUndefined),
            2 => Ok(Self::BuildCommandUndefined),
            3 => Ok(Self::Exist),
            4 => Ok(Self::Pending),
            _ => Err(PrebuiltError::InvalidBuildStatus(value)),
        }
    }
}

/// Outcome of a build status check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDecision {
    pub status: BuildStatus,

    /// The matching build; set only when `status` is `Exist`
    pub build: Option<Build>,

    /// Branch the lookup was restricted to; `None` searches all branches
    pub query_branch: Option<String>,
}

impl BuildDecision {
    fn without_build(status: BuildStatus) -> Self {
        Self {
            status,
            build: None,
            query_branch: None,
        }
    }
}

/// Pick the branch to look builds up in
///
/// With a comparison branch that differs from `branch`, the current branch
/// is used if it has builds of its own and the comparison branch otherwise.
/// Without one, no branch filter is applied.
pub async fn resolve_query_branch(
    storer: &dyn Storer,
    app_name: &str,
    branch: &str,
    compare: Option<&str>,
) -> PrebuiltResult<Option<String>> {
    let compare = match compare.filter(|c| !c.is_empty()) {
        Some(compare) if compare != branch => compare,
        _ => return Ok(None),
    };

    let has_builds = storer
        .are_builds_for_branch(app_name, branch)
        .await
        .map_err(PrebuiltError::BranchBuilds)?;

    let resolved = if has_builds { branch } else { compare };
    debug!(
        "Branch {} has builds of {}: {}, querying {}",
        branch, app_name, has_builds, resolved
    );

    Ok(Some(resolved.to_string()).filter(|b| !b.is_empty()))
}

/// Check whether a build for the application's current inputs exists
///
/// Computes the total input digest and looks it up in storage, scoped to
/// the branch chosen by [`resolve_query_branch`]. A missing build is not an
/// error; it yields `Pending`.
pub async fn build_status(
    storer: &dyn Storer,
    app: &App,
    branch: &str,
    compare: Option<&str>,
) -> PrebuiltResult<BuildDecision> {
    if !app.has_build_cmd() {
        return Ok(BuildDecision::without_build(BuildStatus::BuildCommandUndefined));
    }

    if !app.has_build_inputs() {
        return Ok(BuildDecision::without_build(BuildStatus::InputsUndefined));
    }

    let digest = app
        .total_input_digest()
        .map_err(PrebuiltError::total_input_digest)?
        .to_string();

    let query_branch = resolve_query_branch(storer, &app.name, branch, compare).await?;

    let lookup = if app.use_last_build {
        storer
            .last_build_compare_digest(&app.name, &digest, query_branch.as_deref())
            .await
    } else {
        storer
            .latest_build_by_digest(&app.name, &digest, query_branch.as_deref())
            .await
    };

    let decision = match lookup.map_err(PrebuiltError::FetchLatestBuild)? {
        Some(build) => BuildDecision {
            status: BuildStatus::Exist,
            build: Some(build),
            query_branch,
        },
        None => BuildDecision {
            status: BuildStatus::Pending,
            build: None,
            query_branch,
        },
    };

    info!("Build status of {}: {}", app.name, decision.status);
    Ok(decision)
}
