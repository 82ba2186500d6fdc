use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, FinishHotfixCause};
use crate::error::Result;

pub(crate) struct FinishHotfix {
    cause: FinishHotfixCause,
}

impl FinishHotfix {
    pub(crate) fn new(cause: FinishHotfixCause) -> Self {
        FinishHotfix { cause }
    }
}

/// Merge the remote hotfix branch into `target` and publish the result
fn merge_into(ctx: &ActionContext<'_>, hotfix_branch: &str, target: &str) -> Result<()> {
    ctx.checkout_from_remote(target)?;
    ctx.console().status(&format!(
        "Merging {} into {}",
        ctx.remote_ref(hotfix_branch),
        target
    ));
    ctx.git().merge(&ctx.remote_ref(hotfix_branch))?;
    ctx.push_branch(target)
}

impl ActionBehavior for FinishHotfix {
    fn validate(&self) -> Result<()> {
        require("Hotfix branch", self.cause.hotfix_branch())?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let hotfix_branch = self.cause.hotfix_branch().trim();
        let policy = ctx.config().finish_hotfix.clone();

        if policy.merge_into_master {
            let master = ctx.naming().master.clone();
            merge_into(ctx, hotfix_branch, &master)?;
        }
        if policy.merge_into_develop {
            let develop = ctx.naming().develop.clone();
            merge_into(ctx, hotfix_branch, &develop)?;
        }

        ctx.export_branch_vars(hotfix_branch);
        ctx.delete_branch(hotfix_branch)?;
        ctx.omit_main_build();
        Ok(())
    }

    fn after(&mut self, _ctx: &mut ActionContext<'_>, _outcome: &BuildOutcome) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::action::testing::{checkout, push};
    use crate::action::GitflowAction;
    use crate::buildtype::MockBuildType;
    use crate::config::{FinishHotfixPolicy, GitflowConfig};
    use crate::domain::{BranchNaming, FinishHotfixCause, GitflowCause};
    use crate::git::{GitCall, MockGitClient};
    use crate::ledger::BranchLedger;

    fn finish_hotfix(
        policy: FinishHotfixPolicy,
        git: MockGitClient,
        dry_run: bool,
    ) -> GitflowAction<MockGitClient, MockBuildType> {
        let config = GitflowConfig {
            finish_hotfix: policy,
            ..GitflowConfig::default()
        };
        GitflowAction::new(
            GitflowCause::FinishHotfix(FinishHotfixCause::new("hotfix/login", dry_run)),
            config,
            git,
            MockBuildType::new("1.0.2"),
            BranchLedger::new(BranchNaming::default()),
        )
    }

    #[test]
    fn test_merges_into_master_and_develop() {
        let mut action = finish_hotfix(FinishHotfixPolicy::default(), MockGitClient::new(), false);
        action.before_main_build().unwrap();

        assert_eq!(
            action.git().calls(),
            vec![
                GitCall::Clean,
                checkout("master", "origin/master"),
                GitCall::Merge("origin/hotfix/login".to_string()),
                push("refs/heads/master:refs/heads/master"),
                checkout("develop", "origin/develop"),
                GitCall::Merge("origin/hotfix/login".to_string()),
                push("refs/heads/develop:refs/heads/develop"),
                GitCall::DeleteBranch("hotfix/login".to_string()),
                push(":refs/heads/hotfix/login"),
            ]
        );
        assert!(action.is_main_build_omitted());
    }

    #[test]
    fn test_policy_can_skip_develop() {
        let policy = FinishHotfixPolicy {
            merge_into_master: true,
            merge_into_develop: false,
        };
        let mut action = finish_hotfix(policy, MockGitClient::new(), true);
        action.before_main_build().unwrap();

        assert_eq!(
            action.git().calls(),
            vec![
                GitCall::Clean,
                checkout("master", "origin/master"),
                GitCall::Merge("origin/hotfix/login".to_string()),
                GitCall::DeleteBranch("hotfix/login".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_conflict_aborts_before_delete() {
        let mut action = finish_hotfix(
            FinishHotfixPolicy::default(),
            MockGitClient::failing_on("merge"),
            false,
        );
        let err = action.before_main_build().unwrap_err();

        assert!(err.to_string().starts_with("Gitflow - Finish Hotfix: "));
        assert!(!action
            .git()
            .calls()
            .iter()
            .any(|call| matches!(call, GitCall::DeleteBranch(_) | GitCall::Push { .. })));
        assert!(!action.is_main_build_omitted());
    }
}
