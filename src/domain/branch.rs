use serde::{Deserialize, Serialize};
use std::fmt;

/// Gitflow role of a branch, derived from the configured branch names and prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchType {
    Master,
    Develop,
    Release,
    Hotfix,
    Feature,
    Other,
}

impl BranchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchType::Master => "master",
            BranchType::Develop => "develop",
            BranchType::Release => "release",
            BranchType::Hotfix => "hotfix",
            BranchType::Feature => "feature",
            BranchType::Other => "other",
        }
    }
}

impl fmt::Display for BranchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_master() -> String {
    "master".to_string()
}

fn default_develop() -> String {
    "develop".to_string()
}

fn default_release_prefix() -> String {
    "release/".to_string()
}

fn default_hotfix_prefix() -> String {
    "hotfix/".to_string()
}

fn default_feature_prefix() -> String {
    "feature/".to_string()
}

fn default_version_tag_prefix() -> String {
    "v".to_string()
}

/// Branch names and prefixes that define the Gitflow branch model.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BranchNaming {
    #[serde(default = "default_master")]
    pub master: String,

    #[serde(default = "default_develop")]
    pub develop: String,

    #[serde(default = "default_release_prefix")]
    pub release_prefix: String,

    #[serde(default = "default_hotfix_prefix")]
    pub hotfix_prefix: String,

    #[serde(default = "default_feature_prefix")]
    pub feature_prefix: String,

    #[serde(default = "default_version_tag_prefix")]
    pub version_tag_prefix: String,
}

impl Default for BranchNaming {
    fn default() -> Self {
        BranchNaming {
            master: default_master(),
            develop: default_develop(),
            release_prefix: default_release_prefix(),
            hotfix_prefix: default_hotfix_prefix(),
            feature_prefix: default_feature_prefix(),
            version_tag_prefix: default_version_tag_prefix(),
        }
    }
}

impl BranchNaming {
    /// Classify a branch name.
    ///
    /// The master and develop branches match by exact name. All other names are
    /// matched against the release, hotfix and feature prefixes, and the longest
    /// matching prefix wins. Names matching nothing are [`BranchType::Other`].
    pub fn branch_type(&self, branch_name: &str) -> BranchType {
        if branch_name == self.master {
            return BranchType::Master;
        }
        if branch_name == self.develop {
            return BranchType::Develop;
        }

        let prefixes = [
            (self.release_prefix.as_str(), BranchType::Release),
            (self.hotfix_prefix.as_str(), BranchType::Hotfix),
            (self.feature_prefix.as_str(), BranchType::Feature),
        ];

        prefixes
            .iter()
            .filter(|(prefix, _)| !prefix.is_empty() && branch_name.starts_with(prefix))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, branch_type)| *branch_type)
            .unwrap_or(BranchType::Other)
    }

    pub fn release_branch(&self, release_version: &str) -> String {
        format!("{}{}", self.release_prefix, release_version)
    }

    pub fn hotfix_branch(&self, hotfix_name: &str) -> String {
        format!("{}{}", self.hotfix_prefix, hotfix_name)
    }

    pub fn feature_branch(&self, feature_name: &str) -> String {
        format!("{}{}", self.feature_prefix, feature_name)
    }

    pub fn version_tag(&self, version: &str) -> String {
        format!("{}{}", self.version_tag_prefix, version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_master_and_develop_exact() {
        let naming = BranchNaming::default();
        assert_eq!(naming.branch_type("master"), BranchType::Master);
        assert_eq!(naming.branch_type("develop"), BranchType::Develop);
        assert_eq!(naming.branch_type("developer"), BranchType::Other);
    }

    #[test]
    fn test_prefixes() {
        let naming = BranchNaming::default();
        assert_eq!(naming.branch_type("release/1.0"), BranchType::Release);
        assert_eq!(naming.branch_type("hotfix/VeryHotFix"), BranchType::Hotfix);
        assert_eq!(naming.branch_type("feature/login"), BranchType::Feature);
        assert_eq!(naming.branch_type("bugfix/x"), BranchType::Other);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let naming = BranchNaming {
            release_prefix: "rel".to_string(),
            hotfix_prefix: "rel/hotfix-".to_string(),
            ..BranchNaming::default()
        };
        assert_eq!(naming.branch_type("rel/hotfix-1"), BranchType::Hotfix);
        assert_eq!(naming.branch_type("rel/2.0"), BranchType::Release);
    }

    #[test]
    fn test_empty_prefix_never_matches() {
        let naming = BranchNaming {
            feature_prefix: String::new(),
            ..BranchNaming::default()
        };
        assert_eq!(naming.branch_type("anything"), BranchType::Other);
    }

    #[test]
    fn test_branch_name_builders() {
        let naming = BranchNaming::default();
        assert_eq!(naming.release_branch("1.2.0"), "release/1.2.0");
        assert_eq!(naming.hotfix_branch("VeryHotFix"), "hotfix/VeryHotFix");
        assert_eq!(naming.feature_branch("login"), "feature/login");
        assert_eq!(naming.version_tag("1.2.0"), "v1.2.0");
    }
}
