use crate::error::{GitflowError, Result};
use crate::git::GitClient;
use git2::build::CheckoutBuilder;
use git2::{BranchType, ObjectType, Repository, ResetType, Signature, StatusOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// [`GitClient`] backed by a libgit2 repository
pub struct Git2Client {
    repo: Mutex<Repository>,
}

impl Git2Client {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path)?;
        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        Git2Client {
            repo: Mutex::new(repo),
        }
    }

    fn repo(&self) -> MutexGuard<'_, Repository> {
        self.repo
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The `.git` directory of the repository
    pub fn git_dir(&self) -> PathBuf {
        self.repo().path().to_path_buf()
    }

    /// Root of the working tree; `None` for bare repositories
    pub fn workdir(&self) -> Option<PathBuf> {
        self.repo().workdir().map(Path::to_path_buf)
    }

    /// Remote tracking branches (e.g. `origin/develop`) pointing at HEAD.
    ///
    /// These are the branches a standard build has effectively built.
    pub fn remote_branches_at_head(&self) -> Result<Vec<String>> {
        let repo = self.repo();
        let head_oid = match repo.head() {
            Ok(head) => head.target(),
            Err(_) => return Ok(Vec::new()),
        };
        let Some(head_oid) = head_oid else {
            return Ok(Vec::new());
        };

        let mut names = Vec::new();
        for branch in repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = branch?;
            let Some(name) = branch.name()? else {
                continue;
            };
            if name.ends_with("/HEAD") {
                continue;
            }
            if branch.get().target() == Some(head_oid) {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>> {
        match repo.signature() {
            Ok(signature) => Ok(signature),
            Err(_) => Ok(Signature::now("gitflow-ci", "gitflow-ci@localhost")?),
        }
    }

    fn fast_forward(repo: &Repository, target: git2::Oid, branch: &str) -> Result<()> {
        let mut head = repo.head()?;
        head.set_target(target, &format!("gitflow: fast-forward to {}", branch))?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))?;
        Ok(())
    }

    fn merge_commit(repo: &Repository, branch: &str, theirs: git2::Oid) -> Result<()> {
        let annotated = repo.find_annotated_commit(theirs)?;
        repo.merge(&[&annotated], None, None)?;

        let mut index = repo.index()?;
        if index.has_conflicts() {
            repo.cleanup_state()?;
            let head = repo.head()?.peel(ObjectType::Commit)?;
            repo.reset(&head, ResetType::Hard, None)?;
            return Err(GitflowError::merge(format!(
                "merging '{}' produced conflicts",
                branch
            )));
        }

        let tree = repo.find_tree(index.write_tree()?)?;
        let ours = repo.head()?.peel_to_commit()?;
        let theirs = repo.find_commit(theirs)?;
        let head_name = repo.head()?.shorthand().unwrap_or("HEAD").to_string();
        let signature = Self::signature(repo)?;

        repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            &format!("Merge branch '{}' into {}", branch, head_name),
            &tree,
            &[&ours, &theirs],
        )?;
        repo.cleanup_state()?;
        Ok(())
    }
}

impl GitClient for Git2Client {
    fn checkout_branch(&self, branch: &str, start_point: &str) -> Result<()> {
        debug!(branch, start_point, "git checkout -B");
        let repo = self.repo();

        let commit = repo
            .revparse_single(start_point)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| GitflowError::GitCommand {
                command: format!("git checkout -B {} {}", branch, start_point),
                details: e.to_string(),
            })?;

        // Detach first: libgit2 refuses to reset the branch HEAD points to.
        repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;
        repo.set_head_detached(commit.id())?;
        repo.branch(branch, &commit, true)?;
        repo.set_head(&format!("refs/heads/{}", branch))?;
        Ok(())
    }

    fn add(&self, path: &str) -> Result<()> {
        debug!(path, "git add");
        let repo = self.repo();
        let relative = path.strip_prefix("./").unwrap_or(path);

        let mut index = repo.index()?;
        index.add_path(Path::new(relative))?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        debug!(message, "git commit");
        let repo = self.repo();

        let mut index = repo.index()?;
        let tree = repo.find_tree(index.write_tree()?)?;
        let parent = repo.head()?.peel_to_commit()?;
        let signature = Self::signature(&repo)?;

        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &[&parent])?;
        Ok(())
    }

    fn merge(&self, branch: &str) -> Result<()> {
        debug!(branch, "git merge");
        let repo = self.repo();

        let theirs = repo
            .revparse_single(branch)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| GitflowError::GitCommand {
                command: format!("git merge {}", branch),
                details: e.to_string(),
            })?
            .id();

        let annotated = repo.find_annotated_commit(theirs)?;
        let (analysis, _) = repo.merge_analysis(&[&annotated])?;

        if analysis.is_up_to_date() {
            debug!(branch, "already up to date");
            Ok(())
        } else if analysis.is_fast_forward() {
            Self::fast_forward(&repo, theirs, branch)
        } else {
            Self::merge_commit(&repo, branch, theirs)
        }
    }

    fn push(&self, remote: &str, refspec: &str) -> Result<()> {
        debug!(remote, refspec, "git push");
        let repo = self.repo();

        let mut remote_handle = repo.find_remote(remote).map_err(|e| GitflowError::GitCommand {
            command: format!("git push {} {}", remote, refspec),
            details: format!("no remote named '{}': {}", remote, e),
        })?;

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                if let Ok(cred) =
                    git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
                {
                    return Ok(cred);
                }
            }
            git2::Cred::default()
        });

        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        remote_handle
            .push(&[refspec], Some(&mut push_options))
            .map_err(|e| GitflowError::GitCommand {
                command: format!("git push {} {}", remote, refspec),
                details: e.to_string(),
            })?;
        Ok(())
    }

    fn delete_branch(&self, branch: &str) -> Result<()> {
        debug!(branch, "git branch -D");
        let repo = self.repo();

        let mut local = match repo.find_branch(branch, BranchType::Local) {
            Ok(local) => local,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {
                debug!(branch, "no local branch to delete");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        // libgit2 refuses to delete the branch HEAD points to.
        if local.is_head() {
            let oid = local.get().peel_to_commit()?.id();
            debug!(branch, %oid, "detaching HEAD before delete");
            repo.set_head_detached(oid)?;
        }

        local.delete()?;
        Ok(())
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        debug!(name, "git tag -a");
        let repo = self.repo();

        let head = repo.head()?.peel(ObjectType::Commit)?;
        let signature = Self::signature(&repo)?;
        repo.tag(name, &head, &signature, message, false)?;
        Ok(())
    }

    fn clean(&self) -> Result<()> {
        debug!("git reset --hard && git clean -fdx");
        let repo = self.repo();

        let head = repo.head()?.peel(ObjectType::Commit)?;
        repo.reset(&head, ResetType::Hard, None)?;

        let workdir = repo
            .workdir()
            .ok_or_else(|| GitflowError::GitCommand {
                command: "git clean -fdx".to_string(),
                details: "repository has no working directory".to_string(),
            })?
            .to_path_buf();

        let mut options = StatusOptions::new();
        options.include_untracked(true).include_ignored(true);

        let mut leftovers = Vec::new();
        for entry in repo.statuses(Some(&mut options))?.iter() {
            let status = entry.status();
            if status.is_wt_new() || status.is_ignored() {
                if let Some(path) = entry.path() {
                    leftovers.push(path.to_string());
                }
            }
        }

        for path in leftovers {
            let full_path = workdir.join(&path);
            if path.ends_with('/') || full_path.is_dir() {
                fs::remove_dir_all(&full_path)?;
            } else {
                fs::remove_file(&full_path)?;
            }
        }
        Ok(())
    }
}
