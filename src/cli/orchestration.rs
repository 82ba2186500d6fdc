//! Build orchestration
//!
//! Drives one build through the action lifecycle. This is what a CI host does
//! around its own build step, kept free of clap so it can be called
//! programmatically and tested with mock clients.

use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::info;

use crate::action::GitflowAction;
use crate::buildtype::BuildType;
use crate::config::GitflowConfig;
use crate::domain::{BuildOutcome, BuildResult, GitflowCause};
use crate::error::{GitflowError, Result};
use crate::git::GitClient;
use crate::ledger::{BranchLedger, LedgerStore};
use crate::ui;

/// Everything the host knows about the build it is about to run
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRequest {
    pub cause: GitflowCause,

    /// Explicit build number; defaults to one past the latest stored snapshot
    pub build_number: Option<u64>,

    /// Host environment made available to the action and the main build
    pub environment: BTreeMap<String, String>,

    /// Remote branches checked out by the main build, e.g. `origin/develop`
    pub built_branches: Vec<String>,
}

impl BuildRequest {
    pub fn new(cause: GitflowCause) -> Self {
        BuildRequest {
            cause,
            build_number: None,
            environment: BTreeMap::new(),
            built_branches: Vec::new(),
        }
    }
}

/// Result of a completed build
#[derive(Debug, Clone, PartialEq)]
pub struct BuildRecord {
    pub build_number: u64,

    pub result: BuildResult,

    /// Whether the action skipped the main build
    pub main_build_omitted: bool,

    /// Where the ledger snapshot of this build was stored
    pub ledger_path: PathBuf,
}

fn resolve_build_number(store: &LedgerStore, requested: Option<u64>) -> Result<u64> {
    let next = store.next_build_number()?;
    match requested {
        None => Ok(next),
        Some(n) if n >= next => Ok(n),
        Some(n) => Err(GitflowError::ledger(format!(
            "build #{} is not newer than the latest recorded build #{}",
            n,
            next - 1
        ))),
    }
}

/// Run one build
///
/// 1. Copy the latest ledger snapshot forward (or start an empty one)
/// 2. Run the action's before phase
/// 3. Run the main build unless the action omitted it
/// 4. Run the action's after phase with the build result
/// 5. Store the ledger snapshot under the build number
///
/// A failing phase aborts the build and no snapshot is stored.
/// An omitted main build counts as successful.
pub fn run_build<G, B, F>(
    request: BuildRequest,
    config: &GitflowConfig,
    git: G,
    build_type: B,
    store: &LedgerStore,
    main_build: F,
) -> Result<BuildRecord>
where
    G: GitClient,
    B: BuildType,
    F: FnOnce(&BTreeMap<String, String>) -> Result<BuildResult>,
{
    let build_number = resolve_build_number(store, request.build_number)?;

    let ledger = match store.latest()? {
        Some((previous, ledger)) => {
            info!(previous, build_number, "continuing ledger");
            ledger.copy_forward()
        }
        None => BranchLedger::new(config.branches.clone()),
    };

    info!(
        build_number,
        action = request.cause.action_name(),
        dry_run = request.cause.is_dry_run(),
        "starting build"
    );

    let mut action = GitflowAction::new(request.cause, config.clone(), git, build_type, ledger)
        .with_environment(request.environment);

    action.before_main_build()?;

    let main_build_omitted = action.is_main_build_omitted();
    let result = if main_build_omitted {
        ui::display_status(&format!(
            "{}main build omitted",
            ui::action_prefix(action.action_name())
        ));
        BuildResult::Success
    } else {
        main_build(action.build_env_vars())?
    };

    let outcome = BuildOutcome::new(result).with_built_branches(request.built_branches);
    action.after_main_build(&outcome)?;

    let ledger_path = store.save(build_number, &action.into_ledger())?;
    info!(build_number, result = %result, "build finished");

    Ok(BuildRecord {
        build_number,
        result,
        main_build_omitted,
        ledger_path,
    })
}
