use crate::domain::BranchNaming;
use crate::error::{GitflowError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "gitflow.toml";

/// Represents the complete configuration for gitflow-ci.
///
/// Contains the branch model, the build type used to read and bump versions,
/// the Finish Hotfix merge policy and where ledger snapshots are stored.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitflowConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default)]
    pub build_type: BuildTypeKind,

    #[serde(default)]
    pub branches: BranchNaming,

    #[serde(default)]
    pub finish_hotfix: FinishHotfixPolicy,

    #[serde(default)]
    pub maven: MavenConfig,

    #[serde(default)]
    pub version_file: VersionFileConfig,

    #[serde(default)]
    pub ledger: LedgerConfig,
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

fn default_maven_command() -> String {
    "mvn".to_string()
}

fn default_version_file() -> PathBuf {
    PathBuf::from("VERSION")
}

/// Which build tool owns the project version
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum BuildTypeKind {
    Maven,
    Cargo,
    #[default]
    VersionFile,
}

/// Where a finished hotfix gets merged before its branch is deleted.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct FinishHotfixPolicy {
    #[serde(default = "default_true")]
    pub merge_into_master: bool,

    #[serde(default = "default_true")]
    pub merge_into_develop: bool,
}

impl Default for FinishHotfixPolicy {
    fn default() -> Self {
        FinishHotfixPolicy {
            merge_into_master: true,
            merge_into_develop: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MavenConfig {
    #[serde(default = "default_maven_command")]
    pub command: String,
}

impl Default for MavenConfig {
    fn default() -> Self {
        MavenConfig {
            command: default_maven_command(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct VersionFileConfig {
    /// Relative to the repository root
    #[serde(default = "default_version_file")]
    pub path: PathBuf,
}

impl Default for VersionFileConfig {
    fn default() -> Self {
        VersionFileConfig {
            path: default_version_file(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
pub struct LedgerConfig {
    /// Defaults to `<git dir>/gitflow/ledger`, out of reach of `clean()`
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

impl Default for GitflowConfig {
    fn default() -> Self {
        GitflowConfig {
            remote: default_remote(),
            build_type: BuildTypeKind::default(),
            branches: BranchNaming::default(),
            finish_hotfix: FinishHotfixPolicy::default(),
            maven: MavenConfig::default(),
            version_file: VersionFileConfig::default(),
            ledger: LedgerConfig::default(),
        }
    }
}

impl GitflowConfig {
    /// Remote tracking name of a branch, e.g. `origin/develop`
    pub fn remote_ref(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }

    /// Ledger directory, resolved against the repository's `.git` directory
    pub fn ledger_directory(&self, git_dir: &Path) -> PathBuf {
        self.ledger
            .directory
            .clone()
            .unwrap_or_else(|| git_dir.join("gitflow").join("ledger"))
    }

    fn validate(self) -> Result<Self> {
        if self.remote.trim().is_empty() {
            return Err(GitflowError::config("remote must not be empty"));
        }
        if self.branches.master.trim().is_empty() || self.branches.develop.trim().is_empty() {
            return Err(GitflowError::config(
                "branches.master and branches.develop must not be empty",
            ));
        }
        if self.branches.master == self.branches.develop {
            return Err(GitflowError::config(
                "branches.master and branches.develop must differ",
            ));
        }
        Ok(self)
    }
}

/// Parse configuration from TOML text
pub fn parse_config(content: &str) -> Result<GitflowConfig> {
    let config: GitflowConfig = toml::from_str(content)
        .map_err(|e| GitflowError::config(format!("invalid {}: {}", CONFIG_FILE_NAME, e)))?;
    config.validate()
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `gitflow.toml` in current directory
/// 3. `gitflow.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
///
/// # Returns
/// * `Ok(GitflowConfig)` - Loaded or default configuration
/// * `Err` - If file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<GitflowConfig> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(GitflowConfig::default());
        }
    } else {
        return Ok(GitflowConfig::default());
    };

    parse_config(&config_str)
}
