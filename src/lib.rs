//! # textspot
//!
//! Post-processing for scene-text spotting: turns raw detector and
//! recognizer tensors into located, rectified, and decoded text.
//!
//! ## Components
//!
//! - **Region decoding**: group linked text pixels from text/link score maps
//!   into oriented rectangles
//! - **Rectification**: warp each oriented region into a fixed-size upright
//!   crop with a stable anchor corner
//! - **Sequence decoding**: greedy CTC decoding of per-timestep character
//!   probabilities with a full-path confidence product
//!
//! Inference itself stays outside the crate: detectors, recognizers, and
//! frame sources plug in behind the traits in [`core::traits`].
//!
//! ## Modules
//!
//! * [`core`] - Configuration, error handling, and collaborator traits
//! * [`pipeline`] - The per-frame orchestrator, results, and run statistics
//! * [`processors`] - Region decoding, rectification, and CTC decoding
//! * [`utils`] - Affine estimation, warping, and logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textspot::prelude::*;
//! use std::sync::atomic::AtomicBool;
//!
//! # struct MyDetector;
//! # impl Detector for MyDetector {
//! #     fn infer(&self, _: &image::RgbImage) -> SpotResult<DetectionMaps> {
//! #         unimplemented!()
//! #     }
//! # }
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SpotterConfig::from_json(r#"{ "text_threshold": 0.8 }"#)?;
//! let mut spotter = TextSpotterBuilder::new(config)
//!     .detector(Box::new(MyDetector))
//!     .build()?;
//!
//! let mut source = ImageListSource::new([image::RgbImage::new(640, 480)]);
//! let stop = AtomicBool::new(false);
//! let stats = spotter.run(&mut source, &stop, |frame| {
//!     for line in frame.csv_lines() {
//!         println!("{line}");
//!     }
//! })?;
//! println!("processed {} frames", stats.frames_processed);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::{
        Connectivity, DetectionMaps, Detector, FrameSource, ImageListSource, Recognizer,
        SpotError, SpotResult, SpotterConfig, Stage,
    };
    pub use crate::pipeline::{FrameResult, RunStats, TextRegion, TextSpotter, TextSpotterBuilder};
    pub use crate::processors::{
        Alphabet, CtcGreedyDecoder, DecodedText, OrientedRect, Point, RegionDecoder,
        RegionRectifier, PAD_SYMBOL,
    };
}
