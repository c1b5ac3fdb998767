//! Result types for the text spotting pipeline.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::sync::Arc;

/// A single spotted text region within a frame.
///
/// Groups the reported geometry (clamped integer corner points in traversal
/// order), the anchor corner, and the recognition result. `text` is `None`
/// when no recognizer is configured; an empty string means recognition ran
/// but the result fell below the confidence threshold (the confidence is
/// still reported for diagnostics).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextRegion {
    /// Corner points in traversal order, clamped to `[0, dimension - 1]`.
    /// Empty for the whole-frame sentinel without a center-crop window; a
    /// single point for the center-crop fallback window.
    pub corners: Vec<(i32, i32)>,
    /// Index of the anchor ("top-left") corner within `corners`.
    pub anchor_index: usize,
    /// The decoded string, possibly empty. `None` without a recognizer.
    pub text: Option<Arc<str>>,
    /// The recognition confidence. `None` without a recognizer.
    pub confidence: Option<f64>,
}

impl TextRegion {
    /// Returns true if recognition produced a non-empty, above-threshold
    /// string.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Formats the region as one CSV line: comma-separated clamped integer
    /// coordinates of all corner points in traversal order, followed by the
    /// decoded string when recognition is enabled.
    pub fn csv_line(&self) -> String {
        let mut line = String::new();
        for (i, (x, y)) in self.corners.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let _ = write!(line, "{x},{y}");
        }
        if let Some(text) = &self.text {
            if !self.corners.is_empty() {
                line.push(',');
            }
            line.push_str(text);
        }
        line
    }
}

/// The result of processing one frame.
#[derive(Debug, Clone, Default)]
pub struct FrameResult {
    /// The spotted regions, in detection order (or area-descending order
    /// when the maximum-region cap reordered them).
    pub regions: Vec<TextRegion>,
    /// Number of regions counted as found: every region when no recognizer
    /// is configured, otherwise only regions with a non-empty post-threshold
    /// string.
    pub found: usize,
}

impl FrameResult {
    /// Formats every region as a CSV line, one per region.
    pub fn csv_lines(&self) -> Vec<String> {
        self.regions.iter().map(TextRegion::csv_line).collect()
    }
}
