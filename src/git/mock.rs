use crate::error::{GitflowError, Result};
use crate::git::GitClient;
use std::sync::Mutex;

/// One recorded call on a [`MockGitClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCall {
    CheckoutBranch { branch: String, start_point: String },
    Add(String),
    Commit(String),
    Merge(String),
    Push { remote: String, refspec: String },
    DeleteBranch(String),
    Tag { name: String, message: String },
    Clean,
}

impl GitCall {
    fn kind(&self) -> &'static str {
        match self {
            GitCall::CheckoutBranch { .. } => "checkout",
            GitCall::Add(_) => "add",
            GitCall::Commit(_) => "commit",
            GitCall::Merge(_) => "merge",
            GitCall::Push { .. } => "push",
            GitCall::DeleteBranch(_) => "delete",
            GitCall::Tag { .. } => "tag",
            GitCall::Clean => "clean",
        }
    }
}

/// Git client that records calls instead of touching a repository
#[derive(Debug, Default)]
pub struct MockGitClient {
    calls: Mutex<Vec<GitCall>>,
    failing: Option<&'static str>,
}

impl MockGitClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call of one kind fail, e.g. `"push"` or `"merge"`.
    ///
    /// The failing call is still recorded.
    pub fn failing_on(kind: &'static str) -> Self {
        MockGitClient {
            calls: Mutex::new(Vec::new()),
            failing: Some(kind),
        }
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<GitCall> {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }

    fn record(&self, call: GitCall) -> Result<()> {
        let kind = call.kind();
        self.calls
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(call);

        if self.failing == Some(kind) {
            return Err(GitflowError::GitCommand {
                command: format!("git {}", kind),
                details: "simulated failure".to_string(),
            });
        }
        Ok(())
    }
}

impl GitClient for MockGitClient {
    fn checkout_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        self.record(GitCall::CheckoutBranch {
            branch: branch.to_string(),
            start_point: start_point.to_string(),
        })
    }

    fn add(&self, path: &str) -> Result<()> {
        self.record(GitCall::Add(path.to_string()))
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.record(GitCall::Commit(message.to_string()))
    }

    fn merge(&self, branch: &str) -> Result<()> {
        self.record(GitCall::Merge(branch.to_string()))
    }

    fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        self.record(GitCall::Push {
            remote: remote.to_string(),
            refspec: refspec.to_string(),
        })
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        self.record(GitCall::DeleteBranch(branch.to_string()))
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        self.record(GitCall::Tag {
            name: name.to_string(),
            message: message.to_string(),
        })
    }

    fn clean(&self) -> Result<()> {
        self.record(GitCall::Clean)
    }
}
