use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, StartFeatureCause};
use crate::error::Result;

pub(crate) struct StartFeature {
    cause: StartFeatureCause,
}

impl StartFeature {
    pub(crate) fn new(cause: StartFeatureCause) -> Self {
        StartFeature { cause }
    }

    fn feature_branch(&self, ctx: &ActionContext<'_>) -> String {
        ctx.naming().feature_branch(self.cause.feature_name().trim())
    }
}

impl ActionBehavior for StartFeature {
    fn validate(&self) -> Result<()> {
        require("Feature name", self.cause.feature_name())?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let branch = self.feature_branch(ctx);
        let develop = ctx.naming().develop.clone();

        ctx.console()
            .status(&format!("Creating {} from {}", branch, ctx.remote_ref(&develop)));
        ctx.git().checkout_branch(&branch, &ctx.remote_ref(&develop))?;
        ctx.export_branch_vars(&branch);
        Ok(())
    }

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()> {
        let branch = self.feature_branch(ctx);
        let version = ctx.build_type().current_version()?;

        if outcome.result.is_success() {
            ctx.push_branch(&branch)?;
        }
        ctx.set_dry_run();
        ctx.record(&branch, outcome.result, &version);
        Ok(())
    }
}
