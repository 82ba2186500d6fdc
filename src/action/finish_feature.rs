use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, FinishFeatureCause};
use crate::error::Result;

/// Merge a feature into develop; the main build verifies the merge result
pub(crate) struct FinishFeature {
    cause: FinishFeatureCause,
}

impl FinishFeature {
    pub(crate) fn new(cause: FinishFeatureCause) -> Self {
        FinishFeature { cause }
    }

    fn feature_branch(&self) -> &str {
        self.cause.feature_branch().trim()
    }
}

impl ActionBehavior for FinishFeature {
    fn validate(&self) -> Result<()> {
        require("Feature branch", self.cause.feature_branch())?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let develop = ctx.naming().develop.clone();
        let feature_ref = ctx.remote_ref(self.feature_branch());

        ctx.checkout_from_remote(&develop)?;
        ctx.console()
            .status(&format!("Merging {} into {}", feature_ref, develop));
        ctx.git().merge(&feature_ref)?;
        ctx.export_branch_vars(&develop);
        Ok(())
    }

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()> {
        let develop = ctx.naming().develop.clone();
        let version = ctx.build_type().current_version()?;

        if outcome.result.is_success() {
            ctx.push_branch(&develop)?;
            ctx.delete_branch(self.feature_branch())?;
        }
        ctx.set_dry_run();
        ctx.record(&develop, outcome.result, &version);
        Ok(())
    }
}
