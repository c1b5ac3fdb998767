//! The frame-processing pipeline: orchestrator, per-frame results, and run
//! statistics.

pub mod result;
pub mod spotter;
pub mod stats;

pub use result::{FrameResult, TextRegion};
pub use spotter::{TextSpotter, TextSpotterBuilder};
pub use stats::RunStats;
