use super::{ActionBehavior, ActionContext};
use crate::domain::BuildOutcome;
use crate::error::Result;

/// A standard build: no Git operations, only ledger bookkeeping for the built branches
pub(crate) struct NoGitflow;

impl ActionBehavior for NoGitflow {
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    fn cleans_checkout(&self) -> bool {
        false
    }

    fn before(&mut self, _ctx: &mut ActionContext<'_>) -> Result<()> {
        Ok(())
    }

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()> {
        if outcome.built_branches.is_empty() {
            return Ok(());
        }

        let version = ctx.build_type().current_version()?;
        for built in &outcome.built_branches {
            let (remote, branch) = match built.split_once('/') {
                Some((remote, branch)) => (remote.to_string(), branch.to_string()),
                None => (ctx.remote().to_string(), built.clone()),
            };
            ctx.record_on(&remote, &branch, outcome.result, &version);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::testing::action;
    use crate::domain::{BranchType, BuildOutcome, BuildResult, GitflowCause};

    #[test]
    fn test_no_git_calls_and_no_cleanup() {
        let mut action = action(GitflowCause::NoGitflow);
        action.before_main_build().unwrap();
        action
            .after_main_build(&BuildOutcome::new(BuildResult::Success))
            .unwrap();

        assert!(action.git().calls().is_empty());
        assert!(action.ledger().is_empty());
        assert!(!action.is_main_build_omitted());
    }

    #[test]
    fn test_records_built_branches() {
        let mut action = action(GitflowCause::NoGitflow);
        action.before_main_build().unwrap();
        action
            .after_main_build(
                &BuildOutcome::new(BuildResult::Unstable).with_built_branches(vec![
                    "origin/feature/a/b".to_string(),
                    "upstream/develop".to_string(),
                    "master".to_string(),
                ]),
            )
            .unwrap();

        let ledger = action.ledger();
        assert_eq!(ledger.len(), 3);
        let feature = ledger.remote_branch("origin", "feature/a/b").unwrap();
        assert_eq!(feature.branch_type(), BranchType::Feature);
        assert_eq!(feature.last_build_result(), Some(BuildResult::Unstable));
        assert_eq!(feature.last_build_version(), Some("1.0.0"));
        assert_eq!(
            ledger.remote_branch("upstream", "develop").map(|b| b.branch_type()),
            Some(BranchType::Develop)
        );
        assert!(ledger.remote_branch("origin", "master").is_some());
        assert!(!ledger.is_dry_run());
    }
}
