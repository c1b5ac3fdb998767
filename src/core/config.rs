//! Configuration for the text spotting pipeline.
//!
//! All values that the core depends on live here: score-map thresholds, the
//! recognition confidence cutoff, the target crop size, the alphabet symbol
//! set, the optional region cap, and the neighbor connectivity used when
//! grouping text pixels. Configurations are plain serde-friendly values and
//! are validated once, before any frame is processed.

use crate::core::errors::{SpotError, SpotResult};
use crate::processors::ctc::PAD_SYMBOL;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Neighbor connectivity used when linking text pixels into components.
///
/// The detector emits one link score map per direction; the number of
/// directions must match the variant chosen here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Connectivity {
    /// Horizontal and vertical neighbors only.
    Four,
    /// Horizontal, vertical, and diagonal neighbors.
    Eight,
}

impl Connectivity {
    /// Returns the (dx, dy) offset of each link direction, in the order the
    /// detector's link map channels are expected to be laid out.
    pub fn offsets(&self) -> &'static [(i32, i32)] {
        match self {
            Connectivity::Four => &[(1, 0), (0, 1), (-1, 0), (0, -1)],
            Connectivity::Eight => &[
                (1, 0),
                (1, 1),
                (0, 1),
                (-1, 1),
                (-1, 0),
                (-1, -1),
                (0, -1),
                (1, -1),
            ],
        }
    }

    /// The number of link directions, i.e. the expected number of link map
    /// channels.
    pub fn direction_count(&self) -> usize {
        self.offsets().len()
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Connectivity::Eight
    }
}

fn default_text_threshold() -> f32 {
    0.8
}

fn default_link_threshold() -> f32 {
    0.8
}

fn default_min_confidence() -> f64 {
    0.2
}

fn default_crop_size() -> [u32; 2] {
    [120, 32]
}

fn default_symbols() -> String {
    "0123456789abcdefghijklmnopqrstuvwxyz".to_string()
}

/// Configuration for the [`TextSpotter`](crate::pipeline::TextSpotter)
/// pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotterConfig {
    /// Minimum text-pixel score for a cell to be admitted as text. Inclusive.
    #[serde(default = "default_text_threshold")]
    pub text_threshold: f32,

    /// Minimum link score for two admitted neighbors to be merged. Inclusive.
    #[serde(default = "default_link_threshold")]
    pub link_threshold: f32,

    /// Minimum recognition confidence. Results below this value are reported
    /// with an empty string while keeping their confidence for diagnostics.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,

    /// Target crop size [width, height]; must equal the recognizer's expected
    /// input size.
    #[serde(default = "default_crop_size")]
    pub crop_size: [u32; 2],

    /// The recognizer's symbol set, without the reserved pad symbol.
    #[serde(default = "default_symbols")]
    pub symbols: String,

    /// Optional cap on the number of regions per frame. When exceeded,
    /// regions are ranked by rectangle area descending and truncated.
    #[serde(default)]
    pub max_regions: Option<usize>,

    /// Neighbor connectivity of the detector's link maps.
    #[serde(default)]
    pub connectivity: Connectivity,

    /// When no detector is configured, crop a fixed-fraction centered window
    /// of the frame instead of feeding the whole frame to the recognizer.
    #[serde(default)]
    pub center_crop_fallback: bool,
}

impl Default for SpotterConfig {
    fn default() -> Self {
        Self {
            text_threshold: default_text_threshold(),
            link_threshold: default_link_threshold(),
            min_confidence: default_min_confidence(),
            crop_size: default_crop_size(),
            symbols: default_symbols(),
            max_regions: None,
            connectivity: Connectivity::default(),
            center_crop_fallback: false,
        }
    }
}

impl SpotterConfig {
    /// Validates the configuration, returning a fatal [`SpotError::Config`]
    /// on the first problem found.
    pub fn validate(&self) -> SpotResult<()> {
        if !(0.0..=1.0).contains(&self.text_threshold) {
            return Err(SpotError::config(format!(
                "text threshold {} is outside [0, 1]",
                self.text_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.link_threshold) {
            return Err(SpotError::config(format!(
                "link threshold {} is outside [0, 1]",
                self.link_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            return Err(SpotError::config(format!(
                "minimum confidence {} is outside [0, 1]",
                self.min_confidence
            )));
        }
        if self.crop_size[0] == 0 || self.crop_size[1] == 0 {
            return Err(SpotError::config(format!(
                "crop size {}x{} has a zero dimension",
                self.crop_size[0], self.crop_size[1]
            )));
        }
        if self.symbols.contains(PAD_SYMBOL) {
            return Err(SpotError::config(format!(
                "symbol set must not contain the reserved pad symbol '{PAD_SYMBOL}'"
            )));
        }
        Ok(())
    }

    /// Parses a configuration from a JSON document.
    pub fn from_json(json: &str) -> SpotResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> SpotResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SpotterConfig::default().validate().is_ok());
    }

    #[test]
    fn test_pad_symbol_in_symbols_is_fatal() {
        let config = SpotterConfig {
            symbols: "abc#def".to_string(),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_threshold_out_of_range() {
        let config = SpotterConfig {
            text_threshold: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SpotterConfig {
            link_threshold: -0.1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_crop_size() {
        let config = SpotterConfig {
            crop_size: [0, 32],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_with_defaults() {
        let config = SpotterConfig::from_json(
            r#"{ "text_threshold": 0.5, "symbols": "abc", "max_regions": 10 }"#,
        )
        .unwrap();
        assert_eq!(config.text_threshold, 0.5);
        assert_eq!(config.symbols, "abc");
        assert_eq!(config.max_regions, Some(10));
        assert_eq!(config.link_threshold, 0.8);
        assert_eq!(config.connectivity, Connectivity::Eight);
    }

    #[test]
    fn test_connectivity_direction_counts() {
        assert_eq!(Connectivity::Four.direction_count(), 4);
        assert_eq!(Connectivity::Eight.direction_count(), 8);
    }
}
