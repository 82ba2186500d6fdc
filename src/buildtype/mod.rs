//! Build-type strategies
//!
//! A build type knows how the project declares its version: it reports the
//! current version and rewrites it for the Start Release / Start Hotfix
//! actions. It never commits; the action stages and commits the files it
//! reports as modified.

pub mod cargo;
pub mod maven;
pub mod mock;
pub mod version_file;

pub use cargo::CargoBuildType;
pub use maven::MavenBuildType;
pub use mock::MockBuildType;
pub use version_file::VersionFileBuildType;

use crate::config::{BuildTypeKind, GitflowConfig};
use crate::error::{GitflowError, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Version handling of one build tool
pub trait BuildType: Send + Sync {
    /// The version the project currently declares
    fn current_version(&self) -> Result<String>;

    /// Rewrite all version declarations to `new_version`.
    ///
    /// Returns the modified files relative to the repository root, in the
    /// order they should be staged.
    fn update_version(&self, new_version: &str) -> Result<Vec<String>>;
}

impl<T: BuildType + ?Sized> BuildType for Box<T> {
    fn current_version(&self) -> Result<String> {
        (**self).current_version()
    }

    fn update_version(&self, new_version: &str) -> Result<Vec<String>> {
        (**self).update_version(new_version)
    }
}

/// Build type configured for the project rooted at `root`
pub fn for_project(config: &GitflowConfig, root: &Path) -> Box<dyn BuildType> {
    match config.build_type {
        BuildTypeKind::Maven => Box::new(MavenBuildType::new(root, &config.maven.command)),
        BuildTypeKind::Cargo => Box::new(CargoBuildType::new(root)),
        BuildTypeKind::VersionFile => {
            Box::new(VersionFileBuildType::new(root, &config.version_file.path))
        }
    }
}

/// Run a build tool and fail unless it exits successfully
pub(crate) fn run_build_tool(program: &str, args: &[String], cwd: &Path) -> Result<()> {
    let command_line = format!("{} {}", program, args.join(" "));
    debug!(command = %command_line, cwd = %cwd.display(), "running build tool");

    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .status()
        .map_err(|e| GitflowError::BuildTool {
            command: command_line.clone(),
            details: e.to_string(),
        })?;

    match status.code() {
        Some(0) => Ok(()),
        Some(code) => Err(GitflowError::BuildTool {
            command: command_line,
            details: format!("exit code {}", code),
        }),
        None => Err(GitflowError::Interrupted {
            command: command_line,
        }),
    }
}
