pub mod action;
pub mod buildtype;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod git;
pub mod ledger;
pub mod ui;

pub use error::{GitflowError, Result};
