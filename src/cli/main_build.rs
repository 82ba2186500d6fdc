use crate::domain::BuildResult;
use crate::error::{GitflowError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// The host's main build: an external command run between the two action phases
#[derive(Debug, Clone)]
pub struct MainBuild {
    command: Vec<String>,
    cwd: PathBuf,
}

impl MainBuild {
    pub fn new(command: Vec<String>, cwd: impl Into<PathBuf>) -> Self {
        MainBuild {
            command,
            cwd: cwd.into(),
        }
    }

    fn command_line(&self) -> String {
        self.command.join(" ")
    }

    /// Execute the main build with the given environment variables
    ///
    /// The variables are added on top of the inherited process environment.
    ///
    /// # Returns
    /// * `SUCCESS` on exit code 0, and when no command was given
    /// * `FAILURE` on any other exit code
    /// * `ABORTED` if the command was terminated by a signal
    /// * `Err` if the command could not be started
    pub fn run(&self, env: &BTreeMap<String, String>) -> Result<BuildResult> {
        let Some((program, args)) = self.command.split_first() else {
            debug!("no main build command given");
            return Ok(BuildResult::Success);
        };

        debug!(command = %self.command_line(), cwd = %self.cwd.display(), "running main build");

        let status = Command::new(program)
            .args(args)
            .envs(env)
            .current_dir(&self.cwd)
            .status()
            .map_err(|e| GitflowError::MainBuild {
                command: self.command_line(),
                details: e.to_string(),
            })?;

        let result = match status.code() {
            Some(0) => BuildResult::Success,
            Some(_) => BuildResult::Failure,
            None => BuildResult::Aborted,
        };
        debug!(result = %result, "main build finished");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_no_command_is_success() {
        let build = MainBuild::new(Vec::new(), ".");
        assert_eq!(build.run(&BTreeMap::new()).unwrap(), BuildResult::Success);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_codes() {
        let env = BTreeMap::new();
        assert_eq!(
            MainBuild::new(sh("exit 0"), ".").run(&env).unwrap(),
            BuildResult::Success
        );
        assert_eq!(
            MainBuild::new(sh("exit 3"), ".").run(&env).unwrap(),
            BuildResult::Failure
        );
        assert_eq!(
            MainBuild::new(sh("kill -9 $$"), ".").run(&env).unwrap(),
            BuildResult::Aborted
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_exported_variables_reach_the_build() {
        let mut env = BTreeMap::new();
        env.insert("GIT_BRANCH_TYPE".to_string(), "hotfix".to_string());

        let build = MainBuild::new(sh("test \"$GIT_BRANCH_TYPE\" = hotfix"), ".");
        assert_eq!(build.run(&env).unwrap(), BuildResult::Success);
    }

    #[test]
    fn test_unknown_program_fails_to_start() {
        let build = MainBuild::new(vec!["gitflow-ci-no-such-build".to_string()], ".");
        let err = build.run(&BTreeMap::new()).unwrap_err();
        assert!(matches!(err, GitflowError::MainBuild { .. }));
        assert!(err.to_string().contains("gitflow-ci-no-such-build"));
    }
}
