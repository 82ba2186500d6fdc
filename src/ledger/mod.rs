//! Remote-branch ledger
//!
//! Every build carries a snapshot of all remote branches known to the project,
//! together with the result and version of the last build of each branch. A new
//! build starts from a copy of the previous snapshot ([`BranchLedger::copy_forward`]),
//! applies its own updates and is persisted under its own build number by the
//! [`store::LedgerStore`]. Older snapshots are never rewritten.
//!
//! Entries are only ever added, so a branch stays in the ledger after it has
//! been deleted from Git.

pub mod store;

pub use store::LedgerStore;

use crate::domain::{BranchNaming, BuildResult, BranchType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One branch on one remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteBranch {
    remote_alias: String,
    branch_name: String,
    branch_type: BranchType,
    #[serde(default)]
    last_build_result: Option<BuildResult>,
    #[serde(default)]
    last_build_version: Option<String>,
}

impl RemoteBranch {
    fn new(remote_alias: &str, branch_name: &str, branch_type: BranchType) -> Self {
        RemoteBranch {
            remote_alias: remote_alias.to_string(),
            branch_name: branch_name.to_string(),
            branch_type,
            last_build_result: None,
            last_build_version: None,
        }
    }

    pub fn remote_alias(&self) -> &str {
        &self.remote_alias
    }

    pub fn branch_name(&self) -> &str {
        &self.branch_name
    }

    pub fn branch_type(&self) -> BranchType {
        self.branch_type
    }

    pub fn last_build_result(&self) -> Option<BuildResult> {
        self.last_build_result
    }

    pub fn last_build_version(&self) -> Option<&str> {
        self.last_build_version.as_deref()
    }

    pub fn set_last_build_result(&mut self, result: BuildResult) {
        self.last_build_result = Some(result);
    }

    pub fn set_last_build_version(&mut self, version: impl Into<String>) {
        self.last_build_version = Some(version.into());
    }
}

/// Ledger snapshot attached to one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchLedger {
    #[serde(default)]
    dry_run: bool,

    /// remote alias -> branch name -> entry
    #[serde(default)]
    remote_branches: BTreeMap<String, BTreeMap<String, RemoteBranch>>,

    #[serde(skip)]
    naming: BranchNaming,
}

impl BranchLedger {
    pub fn new(naming: BranchNaming) -> Self {
        BranchLedger {
            dry_run: false,
            remote_branches: BTreeMap::new(),
            naming,
        }
    }

    /// Replace the naming rules used to classify branches added from now on
    pub fn with_naming(mut self, naming: BranchNaming) -> Self {
        self.naming = naming;
        self
    }

    /// Copy of this snapshot to be extended by the next build
    pub fn copy_forward(&self) -> Self {
        self.clone()
    }

    /// Look up the entry for a branch, creating it on first reference
    pub fn get_or_add_remote_branch(
        &mut self,
        remote_alias: &str,
        branch_name: &str,
    ) -> &mut RemoteBranch {
        let naming = &self.naming;
        self.remote_branches
            .entry(remote_alias.to_string())
            .or_default()
            .entry(branch_name.to_string())
            .or_insert_with(|| {
                RemoteBranch::new(remote_alias, branch_name, naming.branch_type(branch_name))
            })
    }

    /// Set result and version of the last build of a branch
    pub fn record_remote_branch(
        &mut self,
        remote_alias: &str,
        branch_name: &str,
        result: BuildResult,
        version: &str,
    ) {
        let remote_branch = self.get_or_add_remote_branch(remote_alias, branch_name);
        remote_branch.set_last_build_result(result);
        remote_branch.set_last_build_version(version);
    }

    pub fn remote_branch(&self, remote_alias: &str, branch_name: &str) -> Option<&RemoteBranch> {
        self.remote_branches
            .get(remote_alias)
            .and_then(|branches| branches.get(branch_name))
    }

    /// All known branches, ordered by remote alias and branch name
    pub fn remote_branches(&self) -> impl Iterator<Item = &RemoteBranch> {
        self.remote_branches.values().flat_map(|branches| branches.values())
    }

    pub fn len(&self) -> usize {
        self.remote_branches.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set_dry_run(&mut self, dry_run: bool) {
        self.dry_run = dry_run;
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_add_classifies() {
        let mut ledger = BranchLedger::new(BranchNaming::default());
        assert_eq!(
            ledger
                .get_or_add_remote_branch("origin", "hotfix/VeryHotFix")
                .branch_type(),
            BranchType::Hotfix
        );
        assert_eq!(
            ledger.get_or_add_remote_branch("origin", "wip").branch_type(),
            BranchType::Other
        );
    }

    #[test]
    fn test_get_or_add_is_idempotent() {
        let mut ledger = BranchLedger::new(BranchNaming::default());
        for _ in 0..5 {
            ledger.get_or_add_remote_branch("origin", "develop");
        }
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_get_or_add_returns_same_entry() {
        let mut ledger = BranchLedger::new(BranchNaming::default());
        ledger
            .get_or_add_remote_branch("origin", "develop")
            .set_last_build_version("2.0.0-SNAPSHOT");
        let again = ledger.get_or_add_remote_branch("origin", "develop");
        assert_eq!(again.last_build_version(), Some("2.0.0-SNAPSHOT"));
    }

    #[test]
    fn test_same_branch_on_two_remotes() {
        let mut ledger = BranchLedger::new(BranchNaming::default());
        ledger.get_or_add_remote_branch("origin", "master");
        ledger.get_or_add_remote_branch("upstream", "master");
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_record_round_trip() {
        let mut ledger = BranchLedger::new(BranchNaming::default());
        ledger.record_remote_branch("origin", "release/1.0", BuildResult::Unstable, "1.0");

        let entry = ledger.remote_branch("origin", "release/1.0").unwrap();
        assert_eq!(entry.last_build_result(), Some(BuildResult::Unstable));
        assert_eq!(entry.last_build_version(), Some("1.0"));
        assert_eq!(entry.branch_type(), BranchType::Release);
        assert!(ledger.remote_branch("upstream", "release/1.0").is_none());
    }

    #[test]
    fn test_copy_forward_leaves_original_untouched() {
        let mut previous = BranchLedger::new(BranchNaming::default());
        previous.record_remote_branch("origin", "develop", BuildResult::Success, "1.1-SNAPSHOT");

        let mut current = previous.copy_forward();
        current.record_remote_branch("origin", "develop", BuildResult::Failure, "1.2-SNAPSHOT");
        current.set_dry_run(true);

        let old = previous.remote_branch("origin", "develop").unwrap();
        assert_eq!(old.last_build_result(), Some(BuildResult::Success));
        assert!(!previous.is_dry_run());
        assert!(current.is_dry_run());
    }
}
