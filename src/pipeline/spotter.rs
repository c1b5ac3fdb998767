//! The text spotting orchestrator.
//!
//! `TextSpotter` wires the per-frame flow together: detector inference,
//! region decoding, the optional area cap, per-region rectification,
//! recognizer inference, sequence decoding, and confidence filtering. Frames
//! are processed synchronously and independently; a collaborator failure
//! discards the frame's partial output, and the run loop can be stopped
//! between frames.

use crate::core::config::SpotterConfig;
use crate::core::errors::{SpotError, SpotResult};
use crate::core::traits::{Detector, FrameSource, Recognizer};
use crate::pipeline::result::{FrameResult, TextRegion};
use crate::pipeline::stats::RunStats;
use crate::processors::ctc::{Alphabet, CtcGreedyDecoder};
use crate::processors::geometry::OrientedRect;
use crate::processors::link_decode::RegionDecoder;
use crate::processors::rectify::RegionRectifier;
use image::RgbImage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Builder for [`TextSpotter`].
pub struct TextSpotterBuilder {
    config: SpotterConfig,
    detector: Option<Box<dyn Detector>>,
    recognizer: Option<Box<dyn Recognizer>>,
}

impl TextSpotterBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: SpotterConfig) -> Self {
        Self {
            config,
            detector: None,
            recognizer: None,
        }
    }

    /// Sets the detector collaborator.
    pub fn detector(mut self, detector: Box<dyn Detector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Sets the recognizer collaborator.
    pub fn recognizer(mut self, recognizer: Box<dyn Recognizer>) -> Self {
        self.recognizer = Some(recognizer);
        self
    }

    /// Validates the configuration and builds the spotter.
    ///
    /// # Errors
    ///
    /// Returns a fatal [`SpotError::Config`] when the configuration is
    /// invalid, when the alphabet contains the reserved pad symbol, or when
    /// neither a detector nor a recognizer is configured.
    pub fn build(self) -> SpotResult<TextSpotter> {
        self.config.validate()?;

        if self.detector.is_none() && self.recognizer.is_none() {
            return Err(SpotError::config(
                "neither a detector nor a recognizer is configured",
            ));
        }

        let alphabet = Alphabet::new(&self.config.symbols)?;
        let ctc = self
            .recognizer
            .is_some()
            .then(|| CtcGreedyDecoder::new(alphabet));

        let region_decoder = RegionDecoder::new(
            self.config.text_threshold,
            self.config.link_threshold,
            self.config.connectivity,
        );
        let rectifier = RegionRectifier::new(self.config.crop_size)?;

        info!(
            "text spotter ready: detector={}, recognizer={}",
            self.detector.is_some(),
            self.recognizer.is_some()
        );

        Ok(TextSpotter {
            config: self.config,
            detector: self.detector,
            recognizer: self.recognizer,
            region_decoder,
            rectifier,
            ctc,
            stats: RunStats::default(),
        })
    }
}

/// The synchronous, per-frame text spotting pipeline.
pub struct TextSpotter {
    config: SpotterConfig,
    detector: Option<Box<dyn Detector>>,
    recognizer: Option<Box<dyn Recognizer>>,
    region_decoder: RegionDecoder,
    rectifier: RegionRectifier,
    ctc: Option<CtcGreedyDecoder>,
    stats: RunStats,
}

impl std::fmt::Debug for TextSpotter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSpotter")
            .field("config", &self.config)
            .field("detector", &self.detector.as_ref().map(|_| "dyn Detector"))
            .field("recognizer", &self.recognizer.as_ref().map(|_| "dyn Recognizer"))
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl TextSpotter {
    /// The active configuration.
    pub fn config(&self) -> &SpotterConfig {
        &self.config
    }

    /// The statistics accumulated so far.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Processes one frame through the full pipeline.
    ///
    /// On error the frame's partial output is discarded; nothing is emitted
    /// for a frame that did not complete.
    pub fn process_frame(&mut self, frame: &RgbImage) -> SpotResult<FrameResult> {
        let frame_start = Instant::now();
        let frame_size = frame.dimensions();

        let regions = self.detect_regions(frame, frame_size)?;
        let regions = self.apply_region_cap(regions);

        let mut result = FrameResult::default();
        for region in &regions {
            let text_region = self.process_region(frame, region, frame_size)?;
            result.regions.push(text_region);
        }

        result.found = if self.recognizer.is_some() {
            result.regions.iter().filter(|r| r.has_text()).count()
        } else {
            result.regions.len()
        };

        self.stats.regions_detected += result.regions.len();
        self.stats.regions_recognized += result
            .regions
            .iter()
            .filter(|r| r.has_text())
            .count();
        self.stats
            .record_frame(frame_start.elapsed().as_secs_f64() * 1000.0);

        debug!(
            "frame {}x{}: {} regions, {} found",
            frame_size.0,
            frame_size.1,
            result.regions.len(),
            result.found
        );

        Ok(result)
    }

    /// Runs the pipeline over a frame source until exhaustion or until the
    /// stop flag is raised, invoking `on_frame` for every completed frame.
    ///
    /// The stop flag is only checked between frames; in-flight region
    /// processing is never interrupted. Collaborator failures discard the
    /// affected frame and the run continues; fatal configuration errors and
    /// frame-source failures terminate the run.
    pub fn run<S, F>(
        &mut self,
        source: &mut S,
        stop: &AtomicBool,
        mut on_frame: F,
    ) -> SpotResult<RunStats>
    where
        S: FrameSource,
        F: FnMut(&FrameResult),
    {
        while !stop.load(Ordering::Relaxed) {
            let Some(frame) = source.next_frame()? else {
                break;
            };

            match self.process_frame(&frame) {
                Ok(result) => on_frame(&result),
                Err(err) if err.is_fatal() => return Err(err),
                Err(err) => {
                    warn!("frame discarded: {err}");
                }
            }
        }

        info!(
            "run finished: {} frames, {} regions, {} recognized",
            self.stats.frames_processed, self.stats.regions_detected, self.stats.regions_recognized
        );

        Ok(self.stats.clone())
    }

    /// Decodes the detector's score maps into regions, or substitutes the
    /// whole-frame sentinel when no detector is configured.
    fn detect_regions(
        &mut self,
        frame: &RgbImage,
        frame_size: (u32, u32),
    ) -> SpotResult<Vec<OrientedRect>> {
        let Some(detector) = &self.detector else {
            return Ok(vec![OrientedRect::sentinel()]);
        };

        let maps = detector.infer(frame)?;

        let decode_start = Instant::now();
        let regions = self.region_decoder.decode(&maps, frame_size)?;
        self.stats.region_decode_ms += decode_start.elapsed().as_secs_f64() * 1000.0;

        Ok(regions)
    }

    /// Applies the maximum-region cap: rank by area descending, truncate.
    fn apply_region_cap(&self, mut regions: Vec<OrientedRect>) -> Vec<OrientedRect> {
        if let Some(cap) = self.config.max_regions {
            if regions.len() > cap {
                regions.sort_by(|a, b| {
                    b.area()
                        .partial_cmp(&a.area())
                        .unwrap_or(std::cmp::Ordering::Equal)
                });
                regions.truncate(cap);
            }
        }
        regions
    }

    /// Rectifies and recognizes one region.
    fn process_region(
        &mut self,
        frame: &RgbImage,
        region: &OrientedRect,
        frame_size: (u32, u32),
    ) -> SpotResult<TextRegion> {
        let (frame_w, frame_h) = frame_size;

        // Rectify, or fall back for the whole-frame sentinel.
        let (crop, corners, anchor_index);
        if !region.is_degenerate() && self.detector.is_some() {
            let rectify_start = Instant::now();
            let points = region.corner_points();
            let (rectified, anchor) = self.rectifier.rectify(frame, region)?;
            self.stats.rectify_ms += rectify_start.elapsed().as_secs_f64() * 1000.0;

            crop = rectified;
            corners = points
                .iter()
                .map(|p| p.clamp_to_image(frame_w, frame_h))
                .collect();
            anchor_index = anchor;
        } else if self.config.center_crop_fallback {
            let (window, top_left) = self.rectifier.center_crop(frame);
            crop = window;
            corners = vec![top_left.clamp_to_image(frame_w, frame_h)];
            anchor_index = 0;
        } else {
            crop = frame.clone();
            corners = Vec::new();
            anchor_index = 0;
        }

        let (text, confidence) = match (&self.recognizer, &self.ctc) {
            (Some(recognizer), Some(ctc)) => {
                let probs = recognizer.infer(&crop)?;

                let decode_start = Instant::now();
                let decoded = ctc.decode(&probs)?.thresholded(self.config.min_confidence);
                self.stats.sequence_decode_ms += decode_start.elapsed().as_secs_f64() * 1000.0;

                (Some(decoded.text.into()), Some(decoded.confidence))
            }
            _ => (None, None),
        };

        Ok(TextRegion {
            corners,
            anchor_index,
            text,
            confidence,
        })
    }
}
