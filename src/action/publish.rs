//! Publish Release and Publish Hotfix: tag the branch with the version it was
//! last built with and push the tag after a successful build.

use super::{require, ActionBehavior, ActionContext};
use crate::domain::{BuildOutcome, PublishHotfixCause, PublishReleaseCause};
use crate::error::{GitflowError, Result};

pub(crate) struct Publish {
    parameter: &'static str,
    branch: String,
    tagged: Option<Tagged>,
}

struct Tagged {
    tag: String,
    version: String,
}

impl Publish {
    pub(crate) fn release(cause: &PublishReleaseCause) -> Self {
        Publish {
            parameter: "Release branch",
            branch: cause.release_branch().to_string(),
            tagged: None,
        }
    }

    pub(crate) fn hotfix(cause: &PublishHotfixCause) -> Self {
        Publish {
            parameter: "Hotfix branch",
            branch: cause.hotfix_branch().to_string(),
            tagged: None,
        }
    }

    fn branch(&self) -> &str {
        self.branch.trim()
    }
}

impl ActionBehavior for Publish {
    fn validate(&self) -> Result<()> {
        require(self.parameter, &self.branch)?;
        Ok(())
    }

    fn before(&mut self, ctx: &mut ActionContext<'_>) -> Result<()> {
        let branch = self.branch().to_string();
        ctx.checkout_from_remote(&branch)?;

        let recorded = ctx
            .ledger()
            .remote_branch(ctx.remote(), &branch)
            .and_then(|b| b.last_build_version())
            .map(str::to_string);
        let version = match recorded {
            Some(version) => version,
            None => ctx.build_type().current_version()?,
        };

        let tag = ctx.naming().version_tag(&version);
        ctx.console()
            .status(&format!("Tagging {} as {}", branch, tag));
        ctx.git()
            .tag(&tag, &format!("Gitflow: Publish version {} from {}", version, branch))?;
        ctx.export_branch_vars(&branch);

        self.tagged = Some(Tagged { tag, version });
        Ok(())
    }

    fn after(&mut self, ctx: &mut ActionContext<'_>, outcome: &BuildOutcome) -> Result<()> {
        let branch = self.branch().to_string();
        let tagged = self.tagged.as_ref().ok_or_else(|| {
            GitflowError::Lifecycle(format!("{} has not been tagged yet", branch))
        })?;
        if outcome.result.is_success() {
            ctx.push_tag(&tagged.tag)?;
        }
        let version = tagged.version.clone();

        ctx.set_dry_run();
        ctx.record(&branch, outcome.result, &version);
        Ok(())
    }
}
