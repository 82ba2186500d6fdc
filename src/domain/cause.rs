//! Workflow causes: which Gitflow operation was requested, and with which parameters.
//!
//! Causes are plain immutable values. All decisions about what to do with them
//! live in [`crate::action`].

macro_rules! cause_accessors {
    ($($field:ident),*) => {
        $(
            pub fn $field(&self) -> &str {
                &self.$field
            }
        )*

        pub fn is_dry_run(&self) -> bool {
            self.dry_run
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReleaseCause {
    release_version: String,
    next_development_version: String,
    dry_run: bool,
}

impl StartReleaseCause {
    pub fn new(
        release_version: impl Into<String>,
        next_development_version: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        StartReleaseCause {
            release_version: release_version.into(),
            next_development_version: next_development_version.into(),
            dry_run,
        }
    }

    cause_accessors!(release_version, next_development_version);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishReleaseCause {
    release_branch: String,
    dry_run: bool,
}

impl FinishReleaseCause {
    pub fn new(release_branch: impl Into<String>, dry_run: bool) -> Self {
        FinishReleaseCause {
            release_branch: release_branch.into(),
            dry_run,
        }
    }

    cause_accessors!(release_branch);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReleaseCause {
    release_branch: String,
    dry_run: bool,
}

impl PublishReleaseCause {
    pub fn new(release_branch: impl Into<String>, dry_run: bool) -> Self {
        PublishReleaseCause {
            release_branch: release_branch.into(),
            dry_run,
        }
    }

    cause_accessors!(release_branch);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartHotfixCause {
    hotfix_name: String,
    next_patch_development_version: String,
    dry_run: bool,
}

impl StartHotfixCause {
    pub fn new(
        hotfix_name: impl Into<String>,
        next_patch_development_version: impl Into<String>,
        dry_run: bool,
    ) -> Self {
        StartHotfixCause {
            hotfix_name: hotfix_name.into(),
            next_patch_development_version: next_patch_development_version.into(),
            dry_run,
        }
    }

    cause_accessors!(hotfix_name, next_patch_development_version);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishHotfixCause {
    hotfix_branch: String,
    dry_run: bool,
}

impl PublishHotfixCause {
    pub fn new(hotfix_branch: impl Into<String>, dry_run: bool) -> Self {
        PublishHotfixCause {
            hotfix_branch: hotfix_branch.into(),
            dry_run,
        }
    }

    cause_accessors!(hotfix_branch);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishHotfixCause {
    hotfix_branch: String,
    dry_run: bool,
}

impl FinishHotfixCause {
    pub fn new(hotfix_branch: impl Into<String>, dry_run: bool) -> Self {
        FinishHotfixCause {
            hotfix_branch: hotfix_branch.into(),
            dry_run,
        }
    }

    cause_accessors!(hotfix_branch);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartFeatureCause {
    feature_name: String,
    dry_run: bool,
}

impl StartFeatureCause {
    pub fn new(feature_name: impl Into<String>, dry_run: bool) -> Self {
        StartFeatureCause {
            feature_name: feature_name.into(),
            dry_run,
        }
    }

    cause_accessors!(feature_name);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishFeatureCause {
    feature_branch: String,
    dry_run: bool,
}

impl FinishFeatureCause {
    pub fn new(feature_branch: impl Into<String>, dry_run: bool) -> Self {
        FinishFeatureCause {
            feature_branch: feature_branch.into(),
            dry_run,
        }
    }

    cause_accessors!(feature_branch);
}

/// The Gitflow operation requested for a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitflowCause {
    StartRelease(StartReleaseCause),
    FinishRelease(FinishReleaseCause),
    PublishRelease(PublishReleaseCause),
    StartHotfix(StartHotfixCause),
    PublishHotfix(PublishHotfixCause),
    FinishHotfix(FinishHotfixCause),
    StartFeature(StartFeatureCause),
    FinishFeature(FinishFeatureCause),
    /// A standard build of a Gitflow-enabled project
    NoGitflow,
}

impl GitflowCause {
    /// Human readable name, used in console prefixes
    pub fn action_name(&self) -> &'static str {
        match self {
            GitflowCause::StartRelease(_) => "Start Release",
            GitflowCause::FinishRelease(_) => "Finish Release",
            GitflowCause::PublishRelease(_) => "Publish Release",
            GitflowCause::StartHotfix(_) => "Start Hotfix",
            GitflowCause::PublishHotfix(_) => "Publish Hotfix",
            GitflowCause::FinishHotfix(_) => "Finish Hotfix",
            GitflowCause::StartFeature(_) => "Start Feature",
            GitflowCause::FinishFeature(_) => "Finish Feature",
            GitflowCause::NoGitflow => "Standard Build",
        }
    }

    pub fn is_dry_run(&self) -> bool {
        match self {
            GitflowCause::StartRelease(c) => c.is_dry_run(),
            GitflowCause::FinishRelease(c) => c.is_dry_run(),
            GitflowCause::PublishRelease(c) => c.is_dry_run(),
            GitflowCause::StartHotfix(c) => c.is_dry_run(),
            GitflowCause::PublishHotfix(c) => c.is_dry_run(),
            GitflowCause::FinishHotfix(c) => c.is_dry_run(),
            GitflowCause::StartFeature(c) => c.is_dry_run(),
            GitflowCause::FinishFeature(c) => c.is_dry_run(),
            GitflowCause::NoGitflow => false,
        }
    }
}
