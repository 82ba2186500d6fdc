use crate::buildtype::BuildType;
use crate::error::{GitflowError, Result};
use std::sync::Mutex;

/// Build type for testing: fixed modified-file list, records version updates
#[derive(Debug)]
pub struct MockBuildType {
    version: Mutex<String>,
    modified_files: Vec<String>,
    updates: Mutex<Vec<String>>,
    failing: bool,
}

impl MockBuildType {
    pub fn new(current_version: impl Into<String>) -> Self {
        MockBuildType {
            version: Mutex::new(current_version.into()),
            modified_files: Vec::new(),
            updates: Mutex::new(Vec::new()),
            failing: false,
        }
    }

    /// Files reported as modified by every `update_version` call
    pub fn with_modified_files<S: AsRef<str>>(mut self, files: &[S]) -> Self {
        self.modified_files = files.iter().map(|f| f.as_ref().to_string()).collect();
        self
    }

    /// Make `update_version` fail like a broken build tool
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Versions passed to `update_version`, in order
    pub fn updated_versions(&self) -> Vec<String> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl BuildType for MockBuildType {
    fn current_version(&self) -> Result<String> {
        Ok(self
            .version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn update_version(&self, new_version: &str) -> Result<Vec<String>> {
        self.updates
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(new_version.to_string());

        if self.failing {
            return Err(GitflowError::BuildTool {
                command: format!("mock-build -DnewVersion={}", new_version),
                details: "exit code 1".to_string(),
            });
        }

        *self
            .version
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = new_version.to_string();
        Ok(self.modified_files.clone())
    }
}
