use serde::{Deserialize, Serialize};
use std::fmt;

/// Final status of a build, as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    /// Only successful builds publish anything to the remote
    pub fn is_success(&self) -> bool {
        matches!(self, BuildResult::Success)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BuildResult::Success => "SUCCESS",
            BuildResult::Unstable => "UNSTABLE",
            BuildResult::Failure => "FAILURE",
            BuildResult::NotBuilt => "NOT_BUILT",
            BuildResult::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host hands to the after phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutcome {
    pub result: BuildResult,
    /// Remote branches the main build checked out, e.g. `origin/develop`
    pub built_branches: Vec<String>,
}

impl BuildOutcome {
    pub fn new(result: BuildResult) -> Self {
        BuildOutcome {
            result,
            built_branches: Vec::new(),
        }
    }

    pub fn with_built_branches(mut self, branches: Vec<String>) -> Self {
        self.built_branches = branches;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_success_is_success() {
        assert!(BuildResult::Success.is_success());
        assert!(!BuildResult::Unstable.is_success());
        assert!(!BuildResult::Failure.is_success());
        assert!(!BuildResult::NotBuilt.is_success());
        assert!(!BuildResult::Aborted.is_success());
    }

    #[test]
    fn test_serialized_upper_case() {
        let json = serde_json::to_string(&BuildResult::NotBuilt).unwrap();
        assert_eq!(json, "\"NOT_BUILT\"");
        let parsed: BuildResult = serde_json::from_str("\"UNSTABLE\"").unwrap();
        assert_eq!(parsed, BuildResult::Unstable);
    }
}
