use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, StartHotfixCause};
use crate::error::Result;

/// Branch `hotfix/<name>` off master and bump it to the next patch development version
pub(crate) struct StartHotfix {
    cause: StartHotfixCause,
}

impl StartHotfix {
    pub(crate) fn new(cause: StartHotfixCause) -> Self {
        StartHotfix { cause }
    }

    fn hotfix_branch(&self, ctx: &ActionContext<'_>) -> String {
        ctx.naming().hotfix_branch(self.cause.hotfix_name().trim())
    }

    fn version(&self) -> &str {
        self.cause.next_patch_development_version().trim()
    }
}

impl ActionBehavior for StartHotfix {
    fn validate(&self) -> Result<()> {
        require("Hotfix name", self.cause.hotfix_name())?;
        require(
            "Next patch development version",
            self.cause.next_patch_development_version(),
        )?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let branch = self.hotfix_branch(ctx);
        let master = ctx.naming().master.clone();

        ctx.console()
            .status(&format!("Creating {} from {}", branch, ctx.remote_ref(&master)));
        ctx.git().checkout_branch(&branch, &ctx.remote_ref(&master))?;

        ctx.commit_version(
            self.version(),
            &format!(
                "Gitflow: Start hotfix {} with version {}",
                self.cause.hotfix_name().trim(),
                self.version()
            ),
        )?;
        ctx.export_branch_vars(&branch);
        Ok(())
    }

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()> {
        let branch = self.hotfix_branch(ctx);

        if outcome.result.is_success() {
            ctx.push_branch(&branch)?;
        }

        ctx.set_dry_run();
        ctx.record(&branch, outcome.result, self.version());
        Ok(())
    }
}
