//! Domain logic - pure values independent of git operations

pub mod branch;
pub mod cause;
pub mod result;

pub use branch::{BranchNaming, BranchType};
pub use cause::{
    FinishFeatureCause, FinishHotfixCause, FinishReleaseCause, GitflowCause, PublishHotfixCause,
    PublishReleaseCause, StartFeatureCause, StartHotfixCause, StartReleaseCause,
};
pub use result::{BuildOutcome, BuildResult};
