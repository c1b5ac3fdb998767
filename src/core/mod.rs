//! Core error handling, configuration, and collaborator traits.

pub mod config;
pub mod errors;
pub mod traits;

pub use config::{Connectivity, SpotterConfig};
pub use errors::{SpotError, SpotResult, Stage};
pub use traits::{DetectionMaps, Detector, FrameSource, ImageListSource, Recognizer};
