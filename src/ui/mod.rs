//! User interface module - console output.
//!
//! - `formatter` - Pure formatting functions
//! - [`ActionConsole`] - console lines prefixed with the running Gitflow action

pub mod formatter;

pub use formatter::{
    display_error, display_ledger, display_status, display_success, display_warning,
    format_ledger_lines,
};

/// Console prefix of a Gitflow action, e.g. `Gitflow - Start Hotfix: `
pub fn action_prefix(action_name: &str) -> String {
    format!("Gitflow - {}: ", action_name)
}

/// Writes console lines on behalf of one action
#[derive(Debug, Clone)]
pub struct ActionConsole {
    prefix: String,
}

impl ActionConsole {
    pub fn new(action_name: &str) -> Self {
        ActionConsole {
            prefix: action_prefix(action_name),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn status(&self, message: &str) {
        display_status(&format!("{}{}", self.prefix, message));
    }

    pub fn success(&self, message: &str) {
        display_success(&format!("{}{}", self.prefix, message));
    }

    pub fn warning(&self, message: &str) {
        display_warning(&format!("{}{}", self.prefix, message));
    }
}
