//! Git operations façade
//!
//! The workflow actions never talk to libgit2 directly. They go through the
//! [`GitClient`] trait, which offers exactly the primitives a Gitflow action
//! needs and owns no policy of its own.
//!
//! - [repository::Git2Client]: real implementation using the `git2` crate
//! - [mock::MockGitClient]: records every call, for tests
//!
//! ```rust
//! # use gitflow_ci::git::GitClient;
//! # fn example<G: GitClient>(git: &G) -> gitflow_ci::Result<()> {
//! git.checkout_branch("hotfix/1.0.1", "origin/master")?;
//! git.add("pom.xml")?;
//! git.commit("Gitflow: Start hotfix 1.0.1")?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::{GitCall, MockGitClient};
pub use repository::Git2Client;

use crate::error::Result;

/// Capability surface consumed by all workflow actions.
///
/// All calls are synchronous and fail with [crate::error::GitflowError] when the
/// underlying Git operation fails.
pub trait GitClient: Send + Sync {
    /// Create (or reset) the local branch `branch` at `start_point` and check it out.
    ///
    /// `start_point` is any revision, typically a remote tracking branch such as
    /// `origin/develop`.
    fn checkout_branch(&self, branch: &str, start_point: &str) -> Result<()>;

    /// Stage one file, given relative to the working directory
    fn add(&self, path: &str) -> Result<()>;

    /// Commit the staged changes on top of HEAD
    fn commit(&self, message: &str) -> Result<()>;

    /// Merge a revision into the checked out branch
    fn merge(&self, branch: &str) -> Result<()>;

    /// Push a single refspec to a remote.
    ///
    /// A refspec with an empty source (`:refs/heads/name`) deletes the remote ref.
    fn push(&self, remote: &str, refspec: &str) -> Result<()>;

    /// Delete a local branch. Deleting a branch that does not exist is not an error.
    fn delete_branch(&self, branch: &str) -> Result<()>;

    /// Create an annotated tag on HEAD
    fn tag(&self, name: &str, message: &str) -> Result<()>;

    /// Discard all modifications and untracked files in the working directory
    fn clean(&self) -> Result<()>;
}
