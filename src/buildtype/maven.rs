use crate::buildtype::{run_build_tool, BuildType};
use crate::error::{GitflowError, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const VERSIONS_SET_GOAL: &str = "org.codehaus.mojo:versions-maven-plugin:2.1:set";
const POM_XML: &str = "pom.xml";

const PROJECT_VERSION: &str = "project/version";
const PARENT_VERSION: &str = "project/parent/version";
const MODULE: &str = "project/modules/module";

type CachedRegex = OnceLock<std::result::Result<Regex, regex::Error>>;

static COMMENT_RE: CachedRegex = OnceLock::new();
static TAG_RE: CachedRegex = OnceLock::new();

fn cached(cell: &'static CachedRegex, pattern: &str) -> Result<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern))
        .as_ref()
        .map_err(|e| GitflowError::version(e.to_string()))
}

/// Text of every element without child elements, keyed by its path from the
/// document root (e.g. `project/parent/version`), in document order.
///
/// Comments are dropped first; declarations and CDATA are not elements.
fn leaf_elements(xml: &str) -> Result<Vec<(String, String)>> {
    let xml = cached(&COMMENT_RE, r"(?s)<!--.*?-->")?.replace_all(xml, "");
    let tag_re = cached(&TAG_RE, r"<(/)?([A-Za-z_][\w.:-]*)[^>]*?(/)?>")?;

    let mut path: Vec<&str> = Vec::new();
    let mut text_start = None;
    let mut leaves = Vec::new();

    for caps in tag_re.captures_iter(&xml) {
        let (Some(tag), Some(name)) = (caps.get(0), caps.get(2)) else {
            continue;
        };
        let name = name.as_str();

        if caps.get(1).is_some() {
            if let Some(start) = text_start.take() {
                if path.last() == Some(&name) {
                    let text = xml[start..tag.start()].trim().to_string();
                    leaves.push((path.join("/"), text));
                }
            }
            if let Some(open) = path.iter().rposition(|open| *open == name) {
                path.truncate(open);
            }
        } else if caps.get(3).is_some() {
            text_start = None;
        } else {
            path.push(name);
            text_start = Some(tag.end());
        }
    }

    Ok(leaves)
}

/// Maven projects: versions are rewritten by the versions-maven-plugin
#[derive(Debug, Clone)]
pub struct MavenBuildType {
    root: PathBuf,
    command: String,
}

impl MavenBuildType {
    pub fn new(root: impl Into<PathBuf>, command: impl Into<String>) -> Self {
        MavenBuildType {
            root: root.into(),
            command: command.into(),
        }
    }

    fn read_pom(&self, relative: &str) -> Result<String> {
        let path = self.root.join(relative);
        fs::read_to_string(&path).map_err(|e| {
            GitflowError::version(format!("cannot read {}: {}", path.display(), e))
        })
    }

    /// POM files of the root project and all (nested) modules, root first
    pub fn module_poms(&self) -> Result<Vec<String>> {
        let mut poms = Vec::new();
        let mut pending = vec![POM_XML.to_string()];

        while let Some(pom) = pending.pop() {
            let content = self.read_pom(&pom)?;
            let base = Path::new(&pom)
                .parent()
                .map(|p| p.to_string_lossy().to_string())
                .unwrap_or_default();

            let mut children: Vec<String> = leaf_elements(&content)?
                .into_iter()
                .filter(|(path, module)| path == MODULE && !module.is_empty())
                .map(|(_, module)| {
                    let module = module.trim_end_matches('/');
                    let module_pom = if module.ends_with(".xml") {
                        module.to_string()
                    } else {
                        format!("{}/{}", module, POM_XML)
                    };
                    if base.is_empty() {
                        module_pom
                    } else {
                        format!("{}/{}", base, module_pom)
                    }
                })
                .collect();

            poms.push(pom);
            children.reverse();
            pending.extend(children);
        }

        Ok(poms)
    }
}

fn project_version(pom: &str) -> Result<Option<String>> {
    let leaves = leaf_elements(pom)?;
    let find = |wanted: &str| {
        leaves
            .iter()
            .find(|(path, _)| path == wanted)
            .map(|(_, text)| text.clone())
    };
    // Inherited from the parent when the project declares none
    Ok(find(PROJECT_VERSION).or_else(|| find(PARENT_VERSION)))
}

impl BuildType for MavenBuildType {
    fn current_version(&self) -> Result<String> {
        let pom = self.read_pom(POM_XML)?;
        project_version(&pom)?
            .ok_or_else(|| GitflowError::version("root pom.xml declares no project version"))
    }

    fn update_version(&self, new_version: &str) -> Result<Vec<String>> {
        let args = vec![
            VERSIONS_SET_GOAL.to_string(),
            format!("-DnewVersion={}", new_version),
            "-DgenerateBackupPoms=false".to_string(),
        ];
        run_build_tool(&self.command, &args, &self.root)?;

        // Each module's POM should have been modified.
        self.module_poms()
    }
}
