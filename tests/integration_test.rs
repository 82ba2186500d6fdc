// tests/integration_test.rs
use git2::{Repository, Signature};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn gitflow_ci(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gitflow-ci"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("Failed to execute gitflow-ci")
}

/// Repository with one commit on master and a `VERSION` file
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();
    fs::write(dir.path().join("VERSION"), "0.4.0\n").unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new("VERSION")).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let signature = Signature::now("Test User", "test@example.com").unwrap();
    let oid = repo
        .commit(
            Some("refs/heads/master"),
            &signature,
            &signature,
            "Initial commit",
            &tree,
            &[],
        )
        .unwrap();
    repo.set_head("refs/heads/master").unwrap();
    repo.reference("refs/remotes/origin/master", oid, true, "test")
        .unwrap();

    fs::write(dir.path().join("gitflow.toml"), "build_type = \"version-file\"\n").unwrap();
    dir
}

#[test]
fn test_gitflow_ci_help() {
    let output = gitflow_ci(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("gitflow-ci"));
    assert!(stdout.contains("start-hotfix"));
    assert!(stdout.contains("finish-release"));
}

#[test]
fn test_gitflow_ci_version() {
    let output = gitflow_ci(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[cfg(unix)]
#[test]
fn test_standard_build_records_ledger() {
    let dir = project();
    let repo_path = dir.path().to_str().unwrap();
    let config_path = dir.path().join("gitflow.toml");
    let config = config_path.to_str().unwrap();

    let output = gitflow_ci(&[
        "--repo", repo_path, "--config", config, "build", "--", "sh", "-c", "exit 0",
    ]);
    assert!(output.status.success(), "{:?}", output);
    assert!(dir.path().join(".git/gitflow/ledger/build-1.json").exists());

    let output = gitflow_ci(&["--repo", repo_path, "--config", config, "ledger"]);
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("origin/master"));
    assert!(stdout.contains("SUCCESS"));
    assert!(stdout.contains("0.4.0"));
}

#[cfg(unix)]
#[test]
fn test_failed_main_build_exits_non_zero() {
    let dir = project();
    let repo_path = dir.path().to_str().unwrap();
    let config_path = dir.path().join("gitflow.toml");

    let output = gitflow_ci(&[
        "--repo",
        repo_path,
        "--config",
        config_path.to_str().unwrap(),
        "build",
        "--",
        "sh",
        "-c",
        "exit 2",
    ]);
    assert_eq!(output.status.code(), Some(1));
    assert!(dir.path().join(".git/gitflow/ledger/build-1.json").exists());
}

#[test]
fn test_blank_parameter_reports_action() {
    let dir = project();
    let config_path = dir.path().join("gitflow.toml");

    let output = gitflow_ci(&[
        "--repo",
        dir.path().to_str().unwrap(),
        "--config",
        config_path.to_str().unwrap(),
        "start-hotfix",
        " ",
        "0.4.1-SNAPSHOT",
    ]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Gitflow - Start Hotfix: Hotfix name must be set with a non-empty value"));
}
