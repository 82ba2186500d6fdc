use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, StartReleaseCause};
use crate::error::Result;

/// Branch a release off develop; after a successful build, move develop on to
/// the next development version.
pub(crate) struct StartRelease {
    cause: StartReleaseCause,
}

impl StartRelease {
    pub(crate) fn new(cause: StartReleaseCause) -> Self {
        StartRelease { cause }
    }

    fn release_version(&self) -> &str {
        self.cause.release_version().trim()
    }

    fn next_development_version(&self) -> &str {
        self.cause.next_development_version().trim()
    }
}

impl ActionBehavior for StartRelease {
    fn validate(&self) -> Result<()> {
        require("Release version", self.cause.release_version())?;
        require(
            "Next development version",
            self.cause.next_development_version(),
        )?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let release_branch = ctx.naming().release_branch(self.release_version());
        let develop = ctx.naming().develop.clone();

        ctx.console().status(&format!(
            "Creating {} from {}",
            release_branch,
            ctx.remote_ref(&develop)
        ));
        ctx.git()
            .checkout_branch(&release_branch, &ctx.remote_ref(&develop))?;
        ctx.commit_version(
            self.release_version(),
            &format!("Gitflow: Start release {}", self.release_version()),
        )?;
        ctx.export_branch_vars(&release_branch);
        Ok(())
    }

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()> {
        let release_branch = ctx.naming().release_branch(self.release_version());

        if outcome.result.is_success() {
            ctx.push_branch(&release_branch)?;
        }
        ctx.set_dry_run();
        ctx.record(&release_branch, outcome.result, self.release_version());

        if !outcome.result.is_success() {
            return Ok(());
        }

        let develop = ctx.naming().develop.clone();
        ctx.checkout_from_remote(&develop)?;
        ctx.commit_version(
            self.next_development_version(),
            &format!(
                "Gitflow: Update develop to next development version {}",
                self.next_development_version()
            ),
        )?;
        ctx.push_branch(&develop)?;
        ctx.record(&develop, outcome.result, self.next_development_version());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::testing::{action_with, add, checkout, push};
    use crate::buildtype::MockBuildType;
    use crate::domain::{BuildOutcome, BuildResult, GitflowCause, StartReleaseCause};
    use crate::git::{GitCall, MockGitClient};

    fn start_release(git: MockGitClient) -> crate::action::testing::MockAction {
        action_with(
            GitflowCause::StartRelease(StartReleaseCause::new("1.2.0", "1.3.0-SNAPSHOT", false)),
            git,
            MockBuildType::new("1.2.0-SNAPSHOT").with_modified_files(&["VERSION"]),
        )
    }

    #[test]
    fn test_before_creates_release_branch_from_develop() {
        let mut action = start_release(MockGitClient::new());
        action.before_main_build().unwrap();

        assert_eq!(
            action.git().calls(),
            vec![
                GitCall::Clean,
                checkout("release/1.2.0", "origin/develop"),
                add("VERSION"),
                GitCall::Commit("Gitflow: Start release 1.2.0".to_string()),
            ]
        );
        assert_eq!(
            action.build_env_vars().get("GIT_SIMPLE_BRANCH_NAME").map(String::as_str),
            Some("release/1.2.0")
        );
    }

    #[test]
    fn test_after_success_pushes_release_and_updates_develop() {
        let mut action = start_release(MockGitClient::new());
        action.before_main_build().unwrap();
        action.git().clear();

        action
            .after_main_build(&BuildOutcome::new(BuildResult::Success))
            .unwrap();

        assert_eq!(
            action.git().calls(),
            vec![
                push("refs/heads/release/1.2.0:refs/heads/release/1.2.0"),
                checkout("develop", "origin/develop"),
                add("VERSION"),
                GitCall::Commit(
                    "Gitflow: Update develop to next development version 1.3.0-SNAPSHOT"
                        .to_string()
                ),
                push("refs/heads/develop:refs/heads/develop"),
            ]
        );
        assert_eq!(
            action.build_type().updated_versions(),
            vec!["1.2.0", "1.3.0-SNAPSHOT"]
        );

        let ledger = action.ledger();
        assert_eq!(ledger.len(), 2);
        assert_eq!(
            ledger
                .remote_branch("origin", "release/1.2.0")
                .and_then(|b| b.last_build_version()),
            Some("1.2.0")
        );
        assert_eq!(
            ledger
                .remote_branch("origin", "develop")
                .and_then(|b| b.last_build_version()),
            Some("1.3.0-SNAPSHOT")
        );
    }

    #[test]
    fn test_after_failure_only_records_release() {
        let mut action = start_release(MockGitClient::new());
        action.before_main_build().unwrap();
        action.git().clear();

        action
            .after_main_build(&BuildOutcome::new(BuildResult::Unstable))
            .unwrap();

        assert!(action.git().calls().is_empty());
        assert_eq!(action.ledger().len(), 1);
        assert_eq!(
            action
                .ledger()
                .remote_branch("origin", "release/1.2.0")
                .and_then(|b| b.last_build_result()),
            Some(BuildResult::Unstable)
        );
    }

    #[test]
    fn test_push_failure_is_fatal() {
        let mut action = start_release(MockGitClient::failing_on("push"));
        action.before_main_build().unwrap();

        let err = action
            .after_main_build(&BuildOutcome::new(BuildResult::Success))
            .unwrap_err();
        assert!(err.to_string().starts_with("Gitflow - Start Release: "));
        assert!(action.ledger().is_empty());
    }
}
