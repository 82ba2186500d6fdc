//! Workflow actions
//!
//! A [`GitflowAction`] wraps the host's main build for exactly one build:
//!
//! 1. [`GitflowAction::before_main_build`] validates the cause parameters,
//!    cleans the working directory (unless the behaviour opts out) and runs the
//!    behaviour's pre-steps. A behaviour may decide that the main build must not
//!    run at all ([`ActionContext::omit_main_build`]).
//! 2. The host runs the main build, or skips it.
//! 3. [`GitflowAction::after_main_build`] runs the behaviour's post-steps with
//!    the build outcome; typically push and ledger record.
//!
//! The behaviour itself is chosen from the cause by [`select_action`]. Errors are
//! never swallowed: the first failing step aborts the phase, and nothing that
//! already happened in Git is rolled back.

mod finish_feature;
mod finish_hotfix;
mod finish_release;
mod no_gitflow;
mod publish;
mod start_feature;
mod start_hotfix;
mod start_release;

#[cfg(test)]
mod testing;

use crate::buildtype::BuildType;
use crate::config::GitflowConfig;
use crate::domain::{BranchNaming, BuildOutcome, BuildResult, GitflowCause};
use crate::error::{GitflowError, Result};
use crate::git::GitClient;
use crate::ledger::BranchLedger;
use crate::ui::ActionConsole;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const ENV_SIMPLE_BRANCH_NAME: &str = "GIT_SIMPLE_BRANCH_NAME";
pub const ENV_REMOTE_BRANCH_NAME: &str = "GIT_REMOTE_BRANCH_NAME";
pub const ENV_BRANCH_TYPE: &str = "GIT_BRANCH_TYPE";

const MSG_CLEAN_WORKING_DIRECTORY: &str = "Ensuring clean working/checkout directory";

static REF_NAME_RE: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

/// Behaviour of one workflow operation
pub trait ActionBehavior: Send {
    /// Check the cause parameters; runs before any Git operation
    fn validate(&self) -> Result<()>;

    /// Whether the working directory is cleaned before [`ActionBehavior::before`]
    fn cleans_checkout(&self) -> bool {
        true
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()>;

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()>;
}

/// Pick the behaviour for a cause
pub fn select_action(cause: &GitflowCause) -> Box<dyn ActionBehavior> {
    match cause {
        GitflowCause::StartRelease(c) => Box::new(start_release::StartRelease::new(c.clone())),
        GitflowCause::FinishRelease(c) => {
            Box::new(finish_release::FinishRelease::new(c.clone()))
        }
        GitflowCause::PublishRelease(c) => Box::new(publish::Publish::release(c)),
        GitflowCause::StartHotfix(c) => Box::new(start_hotfix::StartHotfix::new(c.clone())),
        GitflowCause::PublishHotfix(c) => Box::new(publish::Publish::hotfix(c)),
        GitflowCause::FinishHotfix(c) => Box::new(finish_hotfix::FinishHotfix::new(c.clone())),
        GitflowCause::StartFeature(c) => Box::new(start_feature::StartFeature::new(c.clone())),
        GitflowCause::FinishFeature(c) => {
            Box::new(finish_feature::FinishFeature::new(c.clone()))
        }
        GitflowCause::NoGitflow => Box::new(no_gitflow::NoGitflow),
    }
}

/// Return the trimmed value of a workflow parameter.
///
/// Fails with a parameter error if the value is blank or cannot be part of a
/// Git branch or tag name.
pub fn require<'v>(name: &str, value: &'v str) -> Result<&'v str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(GitflowError::missing_parameter(name));
    }

    let allowed = REF_NAME_RE
        .get_or_init(|| Regex::new(r"^[^\s~^:?*\[\\]+$"))
        .as_ref()
        .map_err(|e| GitflowError::config(e.to_string()))?;
    let malformed = !allowed.is_match(value)
        || value.contains("..")
        || value.contains("@{")
        || value.contains("//")
        || value.starts_with(&['-', '.', '/'][..])
        || value.ends_with(&['.', '/'][..])
        || value.ends_with(".lock");

    if malformed {
        return Err(GitflowError::InvalidParameter {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(value)
}

/// What a behaviour may touch while one of its phases runs
pub struct ActionContext<'a> {
    git: &'a dyn GitClient,
    build_type: &'a dyn BuildType,
    config: &'a GitflowConfig,
    console: &'a ActionConsole,
    ledger: &'a mut BranchLedger,
    env: &'a mut BTreeMap<String, String>,
    omit_main_build: &'a mut bool,
    dry_run: bool,
}

impl<'a> ActionContext<'a> {
    pub fn git(&self) -> &dyn GitClient {
        self.git
    }

    pub fn build_type(&self) -> &dyn BuildType {
        self.build_type
    }

    pub fn naming(&self) -> &BranchNaming {
        &self.config.branches
    }

    pub fn config(&self) -> &GitflowConfig {
        self.config
    }

    pub fn remote(&self) -> &str {
        &self.config.remote
    }

    /// Remote tracking name of a branch, e.g. `origin/develop`
    pub fn remote_ref(&self, branch: &str) -> String {
        self.config.remote_ref(branch)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn ledger(&self) -> &BranchLedger {
        self.ledger
    }

    pub fn env(&self) -> &BTreeMap<String, String> {
        self.env
    }

    pub fn console(&self) -> &ActionConsole {
        self.console
    }

    /// Tell the host to skip the main build. Cannot be undone.
    pub fn omit_main_build(&mut self) {
        *self.omit_main_build = true;
    }

    /// Stage the given files, in order
    pub fn add_files_to_git_stage(&self, files: &[String]) -> Result<()> {
        for file in files {
            self.git.add(file)?;
        }
        Ok(())
    }

    /// Check out `branch` freshly from its counterpart on the remote
    pub fn checkout_from_remote(&self, branch: &str) -> Result<()> {
        self.console
            .status(&format!("Checking out {} from {}", branch, self.remote_ref(branch)));
        self.git.checkout_branch(branch, &self.remote_ref(branch))
    }

    /// Bump the version through the build type, then stage and commit the modified files
    pub fn commit_version(&self, version: &str, message: &str) -> Result<()> {
        self.console.status(&format!("Updating project version to {}", version));
        let modified_files = self.build_type.update_version(version)?;
        self.add_files_to_git_stage(&modified_files)?;
        self.git.commit(message)
    }

    pub fn push_branch(&self, branch: &str) -> Result<()> {
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        self.push(&refspec, &format!("branch {}", branch))
    }

    pub fn push_tag(&self, tag: &str) -> Result<()> {
        let refspec = format!("refs/tags/{0}:refs/tags/{0}", tag);
        self.push(&refspec, &format!("tag {}", tag))
    }

    fn push(&self, refspec: &str, what: &str) -> Result<()> {
        if self.dry_run {
            self.console
                .warning(&format!("Dry run: not pushing {} to {}", what, self.remote()));
            return Ok(());
        }
        self.console.status(&format!("Pushing {} to {}", what, self.remote()));
        self.git.push(self.remote(), refspec)?;
        self.console.success(&format!("Pushed {} to {}", what, self.remote()));
        Ok(())
    }

    /// Delete a branch locally and on the remote
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        self.git.delete_branch(branch)?;
        if self.dry_run {
            self.console.warning(&format!(
                "Dry run: not deleting branch {} on {}",
                branch,
                self.remote()
            ));
            return Ok(());
        }
        self.console
            .status(&format!("Deleting branch {} on {}", branch, self.remote()));
        self.git
            .push(self.remote(), &format!(":refs/heads/{}", branch))
    }

    /// Flag the ledger snapshot with the dry-run setting of this invocation
    pub fn set_dry_run(&mut self) {
        self.ledger.set_dry_run(self.dry_run);
    }

    /// Record the build of a branch on the configured remote
    pub fn record(&mut self, branch: &str, result: BuildResult, version: &str) {
        let remote = self.config.remote.clone();
        self.ledger
            .record_remote_branch(&remote, branch, result, version);
    }

    /// Record the build of a branch on an explicit remote
    pub fn record_on(&mut self, remote: &str, branch: &str, result: BuildResult, version: &str) {
        self.ledger
            .record_remote_branch(remote, branch, result, version);
    }

    /// Expose the branch the action works on to the main build
    pub fn export_branch_vars(&mut self, branch: &str) {
        let remote_ref = self.remote_ref(branch);
        let branch_type = self.config.branches.branch_type(branch);
        self.env
            .insert(ENV_SIMPLE_BRANCH_NAME.to_string(), branch.to_string());
        self.env
            .insert(ENV_REMOTE_BRANCH_NAME.to_string(), remote_ref);
        self.env
            .insert(ENV_BRANCH_TYPE.to_string(), branch_type.as_str().to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Created,
    BeforeDone,
    AfterDone,
    Failed,
}

/// One Gitflow action bound to a Git client, a build type and a ledger snapshot
/// for the duration of one build.
pub struct GitflowAction<G: GitClient, B: BuildType> {
    cause: GitflowCause,
    config: GitflowConfig,
    git: G,
    build_type: B,
    ledger: BranchLedger,
    env: BTreeMap<String, String>,
    omit_main_build: bool,
    behavior: Box<dyn ActionBehavior>,
    console: ActionConsole,
    phase: Phase,
}

impl<G: GitClient, B: BuildType> GitflowAction<G, B> {
    pub fn new(
        cause: GitflowCause,
        config: GitflowConfig,
        git: G,
        build_type: B,
        ledger: BranchLedger,
    ) -> Self {
        let behavior = select_action(&cause);
        let console = ActionConsole::new(cause.action_name());
        let ledger = ledger.with_naming(config.branches.clone());

        GitflowAction {
            cause,
            config,
            git,
            build_type,
            ledger,
            env: BTreeMap::new(),
            omit_main_build: false,
            behavior,
            console,
            phase: Phase::Created,
        }
    }

    /// Environment variables supplied by the host
    pub fn with_environment(mut self, env: BTreeMap<String, String>) -> Self {
        self.env = env;
        self
    }

    pub fn cause(&self) -> &GitflowCause {
        &self.cause
    }

    pub fn action_name(&self) -> &'static str {
        self.cause.action_name()
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    pub fn build_type(&self) -> &B {
        &self.build_type
    }

    pub fn ledger(&self) -> &BranchLedger {
        &self.ledger
    }

    /// Hand the ledger snapshot back to the host for persistence
    pub fn into_ledger(self) -> BranchLedger {
        self.ledger
    }

    pub fn is_main_build_omitted(&self) -> bool {
        self.omit_main_build
    }

    /// Host environment plus the variables exported by the action
    pub fn build_env_vars(&self) -> &BTreeMap<String, String> {
        &self.env
    }

    fn parts(&mut self) -> (&mut dyn ActionBehavior, ActionContext<'_>) {
        let ctx = ActionContext {
            git: &self.git,
            build_type: &self.build_type,
            config: &self.config,
            console: &self.console,
            ledger: &mut self.ledger,
            env: &mut self.env,
            omit_main_build: &mut self.omit_main_build,
            dry_run: self.cause.is_dry_run(),
        };
        (self.behavior.as_mut(), ctx)
    }

    fn enter(&mut self, expected: Phase, phase_name: &str) -> Result<()> {
        if self.phase != expected {
            return Err(GitflowError::Lifecycle(format!(
                "{} called in state {:?}",
                phase_name, self.phase
            ))
            .in_action(self.action_name()));
        }
        Ok(())
    }

    /// Runs the Gitflow steps that must be executed before the main build.
    pub fn before_main_build(&mut self) -> Result<()> {
        self.enter(Phase::Created, "before_main_build")?;

        let result = self.run_before();
        self.phase = if result.is_ok() {
            Phase::BeforeDone
        } else {
            Phase::Failed
        };
        result.map_err(|e| e.in_action(self.action_name()))
    }

    fn run_before(&mut self) -> Result<()> {
        self.behavior.validate()?;
        if self.behavior.cleans_checkout() {
            self.clean_checkout()?;
        }
        let (behavior, mut ctx) = self.parts();
        behavior.before(&mut ctx)
    }

    /// Runs the Gitflow steps that must be executed after the main build.
    pub fn after_main_build(&mut self, outcome: &BuildOutcome) -> Result<()> {
        self.enter(Phase::BeforeDone, "after_main_build")?;

        let (behavior, mut ctx) = self.parts();
        let result = behavior.after(&mut ctx, outcome);
        self.phase = if result.is_ok() {
            Phase::AfterDone
        } else {
            Phase::Failed
        };
        result.map_err(|e| e.in_action(self.action_name()))
    }

    fn clean_checkout(&self) -> Result<()> {
        self.console.status(MSG_CLEAN_WORKING_DIRECTORY);
        self.git.clean()
    }
}
