use super::GitflowAction;
use crate::buildtype::MockBuildType;
use crate::config::GitflowConfig;
use crate::domain::{BranchNaming, GitflowCause};
use crate::git::{GitCall, MockGitClient};
use crate::ledger::BranchLedger;

pub(crate) type MockAction = GitflowAction<MockGitClient, MockBuildType>;

pub(crate) fn action_with(
    cause: GitflowCause,
    git: MockGitClient,
    build_type: MockBuildType,
) -> MockAction {
    GitflowAction::new(
        cause,
        GitflowConfig::default(),
        git,
        build_type,
        BranchLedger::new(BranchNaming::default()),
    )
}

pub(crate) fn action(cause: GitflowCause) -> MockAction {
    action_with(cause, MockGitClient::new(), MockBuildType::new("1.0.0"))
}

pub(crate) fn checkout(branch: &str, start_point: &str) -> GitCall {
    GitCall::CheckoutBranch {
        branch: branch.to_string(),
        start_point: start_point.to_string(),
    }
}

pub(crate) fn push(refspec: &str) -> GitCall {
    GitCall::Push {
        remote: "origin".to_string(),
        refspec: refspec.to_string(),
    }
}

pub(crate) fn add(path: &str) -> GitCall {
    GitCall::Add(path.to_string())
}
