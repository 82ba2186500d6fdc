use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use gitflow_ci::buildtype;
use gitflow_ci::cli::{run_build, BuildRequest, MainBuild};
use gitflow_ci::config::{self, GitflowConfig};
use gitflow_ci::domain::{
    FinishFeatureCause, FinishHotfixCause, FinishReleaseCause, GitflowCause, PublishHotfixCause,
    PublishReleaseCause, StartFeatureCause, StartHotfixCause, StartReleaseCause,
};
use gitflow_ci::git::Git2Client;
use gitflow_ci::ledger::LedgerStore;
use gitflow_ci::ui;

#[derive(clap::Parser)]
#[command(
    name = "gitflow-ci",
    version,
    about = "Run a build wrapped in a Gitflow release, hotfix or feature action"
)]
struct Args {
    #[arg(short, long, global = true, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(
        short,
        long,
        global = true,
        default_value = ".",
        help = "Path inside the Git repository"
    )]
    repo: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Create a release branch from develop and bump develop afterwards
    StartRelease {
        release_version: String,
        next_development_version: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Delete a release branch
    FinishRelease {
        release_branch: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Tag a release branch and push the tag
    PublishRelease {
        release_branch: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Create a hotfix branch from master
    StartHotfix {
        hotfix_name: String,
        next_patch_development_version: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Tag a hotfix branch and push the tag
    PublishHotfix {
        hotfix_branch: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Merge a hotfix into master and develop, then delete it
    FinishHotfix {
        hotfix_branch: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Create a feature branch from develop
    StartFeature {
        feature_name: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Merge a feature into develop and delete it after a successful build
    FinishFeature {
        feature_branch: String,
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Standard build without a Gitflow action
    Build {
        #[command(flatten)]
        build: BuildArgs,
    },
    /// Show a stored ledger snapshot
    Ledger {
        #[arg(long, help = "Build number (default: latest)")]
        build_number: Option<u64>,
    },
}

#[derive(clap::Args)]
struct BuildArgs {
    #[arg(long, help = "Do not push anything to the remote")]
    dry_run: bool,

    #[arg(long, help = "Build number (default: one past the latest ledger snapshot)")]
    build_number: Option<u64>,

    #[arg(last = true, help = "Main build command")]
    command: Vec<String>,
}

impl Commands {
    fn into_build(self) -> Option<(GitflowCause, BuildArgs)> {
        let pair = match self {
            Commands::StartRelease {
                release_version,
                next_development_version,
                build,
            } => (
                GitflowCause::StartRelease(StartReleaseCause::new(
                    release_version,
                    next_development_version,
                    build.dry_run,
                )),
                build,
            ),
            Commands::FinishRelease {
                release_branch,
                build,
            } => (
                GitflowCause::FinishRelease(FinishReleaseCause::new(release_branch, build.dry_run)),
                build,
            ),
            Commands::PublishRelease {
                release_branch,
                build,
            } => (
                GitflowCause::PublishRelease(PublishReleaseCause::new(
                    release_branch,
                    build.dry_run,
                )),
                build,
            ),
            Commands::StartHotfix {
                hotfix_name,
                next_patch_development_version,
                build,
            } => (
                GitflowCause::StartHotfix(StartHotfixCause::new(
                    hotfix_name,
                    next_patch_development_version,
                    build.dry_run,
                )),
                build,
            ),
            Commands::PublishHotfix {
                hotfix_branch,
                build,
            } => (
                GitflowCause::PublishHotfix(PublishHotfixCause::new(hotfix_branch, build.dry_run)),
                build,
            ),
            Commands::FinishHotfix {
                hotfix_branch,
                build,
            } => (
                GitflowCause::FinishHotfix(FinishHotfixCause::new(hotfix_branch, build.dry_run)),
                build,
            ),
            Commands::StartFeature {
                feature_name,
                build,
            } => (
                GitflowCause::StartFeature(StartFeatureCause::new(feature_name, build.dry_run)),
                build,
            ),
            Commands::FinishFeature {
                feature_branch,
                build,
            } => (
                GitflowCause::FinishFeature(FinishFeatureCause::new(
                    feature_branch,
                    build.dry_run,
                )),
                build,
            ),
            Commands::Build { build } => (GitflowCause::NoGitflow, build),
            Commands::Ledger { .. } => return None,
        };
        Some(pair)
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            ui::display_error(&format!("Error loading config: {}", e));
            std::process::exit(1);
        }
    };

    if let Commands::Ledger { build_number } = args.command {
        return show_ledger(&args.repo, &config, build_number);
    }

    let Some((cause, build)) = args.command.into_build() else {
        return Ok(());
    };

    match run(&args.repo, &config, cause, build) {
        Ok(true) => Ok(()),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            ui::display_error(&error_message(&e));
            std::process::exit(1);
        }
    }
}

/// Error chain on one line; causes already quoted by an outer message are skipped
fn error_message(error: &anyhow::Error) -> String {
    let mut message = error.to_string();
    for cause in error.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            message = format!("{}: {}", message, cause);
        }
    }
    message
}

/// Run one build; `Ok(false)` if the main build did not succeed
fn run(repo: &Path, config: &GitflowConfig, cause: GitflowCause, build: BuildArgs) -> Result<bool> {
    let git = Git2Client::open(repo)
        .with_context(|| format!("cannot open Git repository at {}", repo.display()))?;
    let root = git
        .workdir()
        .ok_or_else(|| anyhow!("bare repositories have no working tree to build"))?;
    let store = LedgerStore::new(config.ledger_directory(&git.git_dir()));
    let build_type = buildtype::for_project(config, &root);

    let built_branches = match cause {
        GitflowCause::NoGitflow => git.remote_branches_at_head()?,
        _ => Vec::new(),
    };
    let environment: BTreeMap<String, String> = std::env::vars().collect();

    let request = BuildRequest {
        cause,
        build_number: build.build_number,
        environment,
        built_branches,
    };
    let main_build = MainBuild::new(build.command, root);

    let record = run_build(request, config, git, build_type, &store, |env| {
        main_build.run(env)
    })?;

    let summary = format!(
        "Build #{} finished with {} (ledger: {})",
        record.build_number,
        record.result,
        record.ledger_path.display()
    );
    if record.result.is_success() {
        ui::display_success(&summary);
    } else {
        ui::display_error(&summary);
    }
    Ok(record.result.is_success())
}

fn show_ledger(repo: &Path, config: &GitflowConfig, build_number: Option<u64>) -> Result<()> {
    let git = Git2Client::open(repo)
        .with_context(|| format!("cannot open Git repository at {}", repo.display()))?;
    let store = LedgerStore::new(config.ledger_directory(&git.git_dir()));

    let snapshot = match build_number {
        Some(n) => store.load(n)?.map(|ledger| (n, ledger)),
        None => store.latest()?,
    };

    match snapshot {
        Some((n, ledger)) => {
            ui::display_ledger(n, &ledger.with_naming(config.branches.clone()));
            Ok(())
        }
        None => {
            ui::display_warning(&format!(
                "No ledger snapshot found in {}",
                store.directory().display()
            ));
            Ok(())
        }
    }
}
