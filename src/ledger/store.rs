use crate::error::{GitflowError, Result};
use crate::ledger::BranchLedger;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FILE_PREFIX: &str = "build-";
const FILE_SUFFIX: &str = ".json";

/// Directory of ledger snapshots, one JSON file per build number.
///
/// History is append-only: a snapshot is written once for a build number that
/// is greater than every number already stored, and never rewritten.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    directory: PathBuf,
}

impl LedgerStore {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        LedgerStore {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn snapshot_path(&self, build_number: u64) -> PathBuf {
        self.directory
            .join(format!("{}{}{}", FILE_PREFIX, build_number, FILE_SUFFIX))
    }

    /// Build numbers of all stored snapshots, ascending
    pub fn build_numbers(&self) -> Result<Vec<u64>> {
        if !self.directory.exists() {
            return Ok(Vec::new());
        }

        let mut numbers = Vec::new();
        for entry in fs::read_dir(&self.directory)? {
            let file_name = entry?.file_name();
            let number = file_name
                .to_str()
                .and_then(|name| name.strip_prefix(FILE_PREFIX))
                .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
                .and_then(|digits| digits.parse::<u64>().ok());
            if let Some(number) = number {
                numbers.push(number);
            }
        }

        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Load the snapshot of one build, if it was stored
    pub fn load(&self, build_number: u64) -> Result<Option<BranchLedger>> {
        let path = self.snapshot_path(build_number);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let ledger: BranchLedger = serde_json::from_str(&content)?;
        Ok(Some(ledger))
    }

    /// The most recent snapshot together with its build number
    pub fn latest(&self) -> Result<Option<(u64, BranchLedger)>> {
        match self.build_numbers()?.last() {
            Some(&number) => Ok(self.load(number)?.map(|ledger| (number, ledger))),
            None => Ok(None),
        }
    }

    pub fn next_build_number(&self) -> Result<u64> {
        match self.build_numbers()?.last() {
            Some(&last) => last.checked_add(1).ok_or_else(|| {
                GitflowError::ledger(format!("no build number left after build #{}", last))
            }),
            None => Ok(1),
        }
    }

    /// Persist the snapshot of a build.
    ///
    /// Fails if a snapshot for this or a later build already exists.
    pub fn save(&self, build_number: u64, ledger: &BranchLedger) -> Result<PathBuf> {
        if let Some(&latest) = self.build_numbers()?.last() {
            if build_number <= latest {
                return Err(GitflowError::ledger(format!(
                    "cannot store ledger for build #{}: build #{} is already recorded",
                    build_number, latest
                )));
            }
        }

        fs::create_dir_all(&self.directory)?;

        let path = self.snapshot_path(build_number);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, serde_json::to_string_pretty(ledger)?)?;
        fs::rename(&temp_path, &path)?;

        debug!(build_number, path = %path.display(), "stored ledger snapshot");
        Ok(path)
    }
}
