//! Host side of the lifecycle: running the main build and orchestrating one build.

pub mod main_build;
pub mod orchestration;

pub use main_build::MainBuild;
pub use orchestration::{run_build, BuildRecord, BuildRequest};
