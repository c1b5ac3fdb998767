//! Per-run statistics for the text spotting pipeline.
//!
//! Timing and count accumulation is explicit state owned by the spotter and
//! returned to the caller, never ambient globals.

/// Decay factor of the exponentially smoothed per-frame time.
const FRAME_TIME_DECAY: f64 = 0.8;

/// Statistics accumulated over one run.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Number of frames processed to completion.
    pub frames_processed: usize,
    /// Total regions produced by the region decoder (after the cap).
    pub regions_detected: usize,
    /// Regions with a non-empty post-threshold recognition result.
    pub regions_recognized: usize,
    /// Cumulative region decoding time in milliseconds.
    pub region_decode_ms: f64,
    /// Cumulative rectification time in milliseconds.
    pub rectify_ms: f64,
    /// Cumulative sequence decoding time in milliseconds.
    pub sequence_decode_ms: f64,
    /// Exponentially smoothed per-frame wall time in milliseconds.
    pub smoothed_frame_ms: f64,
}

impl RunStats {
    /// Records the wall time of one completed frame.
    pub fn record_frame(&mut self, frame_ms: f64) {
        self.frames_processed += 1;
        if self.frames_processed == 1 {
            self.smoothed_frame_ms = frame_ms;
        } else {
            self.smoothed_frame_ms =
                self.smoothed_frame_ms * FRAME_TIME_DECAY + (1.0 - FRAME_TIME_DECAY) * frame_ms;
        }
    }

    /// The smoothed frame rate, or `None` before the first frame.
    pub fn fps(&self) -> Option<f64> {
        if self.frames_processed == 0 || self.smoothed_frame_ms <= 0.0 {
            None
        } else {
            Some(1000.0 / self.smoothed_frame_ms)
        }
    }

    /// Resets all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
