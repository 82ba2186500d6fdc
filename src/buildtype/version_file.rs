use crate::buildtype::BuildType;
use crate::error::{GitflowError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Projects that keep their version in a single plain-text file
#[derive(Debug, Clone)]
pub struct VersionFileBuildType {
    root: PathBuf,
    relative_path: PathBuf,
}

impl VersionFileBuildType {
    pub fn new(root: impl Into<PathBuf>, relative_path: impl AsRef<Path>) -> Self {
        VersionFileBuildType {
            root: root.into(),
            relative_path: relative_path.as_ref().to_path_buf(),
        }
    }

    fn path(&self) -> PathBuf {
        self.root.join(&self.relative_path)
    }
}

impl BuildType for VersionFileBuildType {
    fn current_version(&self) -> Result<String> {
        let path = self.path();
        let content = fs::read_to_string(&path).map_err(|e| {
            GitflowError::version(format!("cannot read {}: {}", path.display(), e))
        })?;

        let version = content.trim();
        if version.is_empty() {
            return Err(GitflowError::version(format!("{} is empty", path.display())));
        }
        Ok(version.to_string())
    }

    fn update_version(&self, new_version: &str) -> Result<Vec<String>> {
        fs::write(self.path(), format!("{}\n", new_version))?;
        Ok(vec![self.relative_path.to_string_lossy().replace('\\', "/")])
    }
}
