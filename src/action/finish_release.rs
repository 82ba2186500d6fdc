use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, FinishReleaseCause};
use crate::error::Result;

pub(crate) struct FinishRelease {
    cause: FinishReleaseCause,
}

impl FinishRelease {
    pub(crate) fn new(cause: FinishReleaseCause) -> Self {
        FinishRelease { cause }
    }
}

impl ActionBehavior for FinishRelease {
    fn validate(&self) -> Result<()> {
        require("Release branch", self.cause.release_branch())?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let release_branch = self.cause.release_branch().trim();

        ctx.export_branch_vars(release_branch);
        ctx.delete_branch(release_branch)?;

        // Nothing left to build once the release branch is gone.
        ctx.omit_main_build();
        Ok(())
    }

    fn after(&mut self, _ctx: &mut ActionContext<'_>, _outcome: &BuildOutcome) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::testing::{action, push};
    use crate::domain::{BuildOutcome, BuildResult, FinishReleaseCause, GitflowCause};
    use crate::git::GitCall;

    #[test]
    fn test_deletes_branch_and_omits_main_build() {
        let mut action = action(GitflowCause::FinishRelease(FinishReleaseCause::new(
            "release/1.2.0",
            false,
        )));
        action.before_main_build().unwrap();

        assert_eq!(
            action.git().calls(),
            vec![
                GitCall::Clean,
                GitCall::DeleteBranch("release/1.2.0".to_string()),
                push(":refs/heads/release/1.2.0"),
            ]
        );
        assert!(action.is_main_build_omitted());

        action.git().clear();
        action
            .after_main_build(&BuildOutcome::new(BuildResult::NotBuilt))
            .unwrap();
        assert!(action.git().calls().is_empty());
        assert!(action.ledger().is_empty());
    }

    #[test]
    fn test_dry_run_keeps_remote_branch() {
        let mut action = action(GitflowCause::FinishRelease(FinishReleaseCause::new(
            "release/1.2.0",
            true,
        )));
        action.before_main_build().unwrap();

        assert_eq!(
            action.git().calls(),
            vec![
                GitCall::Clean,
                GitCall::DeleteBranch("release/1.2.0".to_string()),
            ]
        );
        assert!(action.is_main_build_omitted());
    }

    #[test]
    fn test_missing_release_branch() {
        let mut action = action(GitflowCause::FinishRelease(FinishReleaseCause::new("", false)));
        let err = action.before_main_build().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Gitflow - Finish Release: Release branch must be set with a non-empty value"
        );
        assert!(action.git().calls().is_empty());
    }
}
