use thiserror::Error;

/// Unified error type for gitflow operations
#[derive(Error, Debug)]
pub enum GitflowError {
    #[error("{0} must be set with a non-empty value")]
    MissingParameter(String),

    #[error("{name} has an invalid value '{value}' (not usable in a Git branch or tag name)")]
    InvalidParameter { name: String, value: String },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Git command '{command}' failed: {details}")]
    GitCommand { command: String, details: String },

    #[error("Merge failed: {0}")]
    Merge(String),

    #[error("Error while executing {command}: {details}")]
    BuildTool { command: String, details: String },

    #[error("Interrupted while executing {command}")]
    Interrupted { command: String },

    #[error("Main build '{command}' could not be started: {details}")]
    MainBuild { command: String, details: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Ledger error: {0}")]
    Ledger(String),

    #[error("Version error: {0}")]
    Version(String),

    #[error("Action lifecycle violated: {0}")]
    Lifecycle(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ledger serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot edit manifest: {0}")]
    TomlEdit(#[from] toml_edit::TomlError),

    #[error("Gitflow - {action}: {source}")]
    Action {
        action: String,
        #[source]
        source: Box<GitflowError>,
    },
}

/// Convenience type alias for Results in gitflow-ci
pub type Result<T> = std::result::Result<T, GitflowError>;

impl GitflowError {
    /// Create a missing parameter error naming the parameter
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        GitflowError::MissingParameter(name.into())
    }

    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GitflowError::Config(msg.into())
    }

    /// Create a ledger error with context
    pub fn ledger(msg: impl Into<String>) -> Self {
        GitflowError::Ledger(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        GitflowError::Version(msg.into())
    }

    /// Create a merge error with context
    pub fn merge(msg: impl Into<String>) -> Self {
        GitflowError::Merge(msg.into())
    }

    /// Wrap an error with the console prefix of the failing action.
    ///
    /// Errors that already carry an action prefix are returned unchanged.
    pub fn in_action(self, action: impl Into<String>) -> Self {
        match self {
            GitflowError::Action { .. } => self,
            other => GitflowError::Action {
                action: action.into(),
                source: Box::new(other),
            },
        }
    }

    /// True for errors caused by a blank or malformed workflow parameter
    pub fn is_parameter_error(&self) -> bool {
        match self {
            GitflowError::MissingParameter(_) | GitflowError::InvalidParameter { .. } => true,
            GitflowError::Action { source, .. } => source.is_parameter_error(),
            _ => false,
        }
    }
}
