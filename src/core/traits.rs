//! Traits for the external collaborators the pipeline consumes.
//!
//! The detector and recognizer are opaque functions mapping an image to
//! tensors; the frame source yields images until exhaustion. The core stays
//! agnostic to which concrete backend implements them, so device or plugin
//! dispatch belongs behind these traits, never inside the pipeline.

use crate::core::errors::{SpotError, SpotResult};
use image::RgbImage;
use ndarray::{Array2, Array3};
use std::collections::VecDeque;
use std::path::Path;

/// Score maps emitted by a text detector for one frame.
///
/// Both maps share the same spatial resolution, at a fixed stride relative to
/// the input image. Values are probabilities in [0, 1].
#[derive(Debug, Clone)]
pub struct DetectionMaps {
    /// Per-cell text confidence, shape (height, width).
    pub text: Array2<f32>,
    /// Per-cell link confidence toward each neighbor direction, shape
    /// (directions, height, width). The direction order must match the
    /// configured [`Connectivity`](crate::core::config::Connectivity).
    pub links: Array3<f32>,
}

impl DetectionMaps {
    /// Creates a new set of detection maps.
    pub fn new(text: Array2<f32>, links: Array3<f32>) -> Self {
        Self { text, links }
    }

    /// The spatial resolution (height, width) of the maps.
    pub fn map_size(&self) -> (usize, usize) {
        (self.text.nrows(), self.text.ncols())
    }
}

/// A text detector: infers per-pixel text and link score maps from a frame.
pub trait Detector {
    /// Runs detection inference on a frame.
    fn infer(&self, frame: &RgbImage) -> SpotResult<DetectionMaps>;
}

/// A text recognizer: infers a per-timestep character probability sequence
/// from a rectified crop.
pub trait Recognizer {
    /// Runs recognition inference on a crop. The result has shape
    /// (timesteps, alphabet size including the pad symbol).
    fn infer(&self, crop: &RgbImage) -> SpotResult<Array2<f32>>;
}

/// A source of frames, e.g. an image list or a video stream.
pub trait FrameSource {
    /// Returns the next frame, or `None` once the source is exhausted.
    /// Exhaustion terminates the processing loop normally and is not an
    /// error.
    fn next_frame(&mut self) -> SpotResult<Option<RgbImage>>;
}

/// A frame source over an in-memory list of images.
#[derive(Debug, Default)]
pub struct ImageListSource {
    frames: VecDeque<RgbImage>,
}

impl ImageListSource {
    /// Creates a source that yields the given frames in order.
    pub fn new(frames: impl IntoIterator<Item = RgbImage>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    /// Loads every image file up front and yields them in order.
    ///
    /// # Errors
    ///
    /// Returns [`SpotError::ImageLoad`] for the first file that cannot be
    /// read or decoded.
    pub fn from_paths<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> SpotResult<Self> {
        let mut frames = VecDeque::new();
        for path in paths {
            let image = image::open(path.as_ref())
                .map_err(SpotError::ImageLoad)?
                .to_rgb8();
            frames.push_back(image);
        }
        Ok(Self { frames })
    }
}

impl FrameSource for ImageListSource {
    fn next_frame(&mut self) -> SpotResult<Option<RgbImage>> {
        Ok(self.frames.pop_front())
    }
}
