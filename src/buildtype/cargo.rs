use crate::buildtype::BuildType;
use crate::error::{GitflowError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item};

const CARGO_TOML: &str = "Cargo.toml";

/// Cargo packages and workspaces, edited in place with `toml_edit`
#[derive(Debug, Clone)]
pub struct CargoBuildType {
    root: PathBuf,
}

fn read_manifest(path: &Path) -> Result<DocumentMut> {
    let content = fs::read_to_string(path)
        .map_err(|e| GitflowError::version(format!("cannot read {}: {}", path.display(), e)))?;
    Ok(content.parse::<DocumentMut>()?)
}

fn version_item<'a>(doc: &'a DocumentMut, table_path: &[&str]) -> Option<&'a Item> {
    let mut item = doc.as_item();
    for key in table_path {
        item = item.get(key)?;
    }
    item.get("version")
}

/// Set `version` under `table_path` if it is declared there as a literal string
fn set_literal_version(doc: &mut DocumentMut, table_path: &[&str], new_version: &str) -> bool {
    let is_literal = version_item(doc, table_path)
        .and_then(Item::as_str)
        .is_some();
    if !is_literal {
        return false;
    }

    let mut item = doc.as_item_mut();
    for key in table_path {
        match item.get_mut(key) {
            Some(next) => item = next,
            None => return false,
        }
    }
    item["version"] = toml_edit::value(new_version);
    true
}

impl CargoBuildType {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        CargoBuildType { root: root.into() }
    }

    /// Member manifests of the workspace, relative to the root.
    ///
    /// Trailing `/*` globs are expanded one directory level deep.
    fn member_manifests(&self, root_doc: &DocumentMut) -> Result<Vec<String>> {
        let members = root_doc
            .get("workspace")
            .and_then(|w| w.get("members"))
            .and_then(Item::as_array);
        let Some(members) = members else {
            return Ok(Vec::new());
        };

        let mut manifests = Vec::new();
        for member in members.iter().filter_map(|m| m.as_str()) {
            if let Some(parent) = member.strip_suffix("/*") {
                let mut expanded = Vec::new();
                let dir = self.root.join(parent);
                if dir.is_dir() {
                    for entry in fs::read_dir(&dir)? {
                        let entry = entry?;
                        if entry.path().join(CARGO_TOML).is_file() {
                            expanded.push(format!(
                                "{}/{}/{}",
                                parent,
                                entry.file_name().to_string_lossy(),
                                CARGO_TOML
                            ));
                        }
                    }
                }
                expanded.sort();
                manifests.extend(expanded);
            } else {
                manifests.push(format!("{}/{}", member.trim_end_matches('/'), CARGO_TOML));
            }
        }
        Ok(manifests)
    }
}

impl BuildType for CargoBuildType {
    fn current_version(&self) -> Result<String> {
        let doc = read_manifest(&self.root.join(CARGO_TOML))?;

        version_item(&doc, &["workspace", "package"])
            .and_then(Item::as_str)
            .or_else(|| version_item(&doc, &["package"]).and_then(Item::as_str))
            .map(str::to_string)
            .ok_or_else(|| GitflowError::version("Cargo.toml declares no version"))
    }

    fn update_version(&self, new_version: &str) -> Result<Vec<String>> {
        semver::Version::parse(new_version).map_err(|e| {
            GitflowError::version(format!("'{}' is not a valid SemVer version: {}", new_version, e))
        })?;

        let mut modified = Vec::new();

        let root_path = self.root.join(CARGO_TOML);
        let mut root_doc = read_manifest(&root_path)?;
        let workspace_changed =
            set_literal_version(&mut root_doc, &["workspace", "package"], new_version);
        let package_changed = set_literal_version(&mut root_doc, &["package"], new_version);
        if workspace_changed || package_changed {
            fs::write(&root_path, root_doc.to_string())?;
            modified.push(CARGO_TOML.to_string());
        }

        for manifest in self.member_manifests(&root_doc)? {
            let path = self.root.join(&manifest);
            let mut doc = read_manifest(&path)?;
            if set_literal_version(&mut doc, &["package"], new_version) {
                fs::write(&path, doc.to_string())?;
                modified.push(manifest);
            }
        }

        if modified.is_empty() {
            return Err(GitflowError::version(
                "no literal package version found to update",
            ));
        }
        Ok(modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[workspace]\nmembers = [\"crates/*\", \"tools\"]\n\n[workspace.package]\nversion = \"0.3.0\" # shared\n",
        )
        .unwrap();
        for (member, manifest) in [
            ("crates/core", "[package]\nname = \"core\"\nversion.workspace = true\n"),
            ("crates/extra", "[package]\nname = \"extra\"\nversion = \"0.1.0\"\n"),
            ("tools", "[package]\nname = \"tools\"\nversion = \"0.0.1\"\n"),
        ] {
            fs::create_dir_all(dir.path().join(member)).unwrap();
            fs::write(dir.path().join(member).join("Cargo.toml"), manifest).unwrap();
        }
        dir
    }

    #[test]
    fn test_current_version_prefers_workspace_package() {
        let dir = workspace();
        assert_eq!(CargoBuildType::new(dir.path()).current_version().unwrap(), "0.3.0");
    }

    #[test]
    fn test_update_workspace_and_literal_members() {
        let dir = workspace();
        let cargo = CargoBuildType::new(dir.path());

        let modified = cargo.update_version("0.4.0-SNAPSHOT").unwrap();
        assert_eq!(
            modified,
            vec![
                "Cargo.toml".to_string(),
                "crates/extra/Cargo.toml".to_string(),
                "tools/Cargo.toml".to_string(),
            ]
        );
        assert_eq!(cargo.current_version().unwrap(), "0.4.0-SNAPSHOT");

        let root = fs::read_to_string(dir.path().join("Cargo.toml")).unwrap();
        assert!(root.contains("members = [\"crates/*\", \"tools\"]"));
        let core = fs::read_to_string(dir.path().join("crates/core/Cargo.toml")).unwrap();
        assert!(core.contains("version.workspace = true"));
    }

    #[test]
    fn test_single_package() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"app\"\nversion = \"1.0.0\"\n",
        )
        .unwrap();
        let cargo = CargoBuildType::new(dir.path());

        assert_eq!(cargo.update_version("1.0.1").unwrap(), vec!["Cargo.toml".to_string()]);
        assert_eq!(cargo.current_version().unwrap(), "1.0.1");
    }

    #[test]
    fn test_rejects_non_semver() {
        let dir = workspace();
        let err = CargoBuildType::new(dir.path())
            .update_version("1.0.2-Snapshot.")
            .unwrap_err();
        assert!(err.to_string().contains("SemVer"));
    }
}
