//! Error types for the text spotting pipeline.
//!
//! This module defines the error taxonomy of the crate: fatal configuration
//! errors that abort a run before any frame is processed, collaborator errors
//! raised by the external detector/recognizer/frame source, and invalid-input
//! errors caught at API boundaries. Degenerate geometry (zero-area regions)
//! and frame-source exhaustion are deliberately not errors.

use thiserror::Error;

/// The pipeline stage an external collaborator error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// The detector inference call.
    Detection,
    /// The recognizer inference call.
    Recognition,
    /// Frame acquisition from the image source.
    FrameSource,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Detection => write!(f, "detection"),
            Stage::Recognition => write!(f, "recognition"),
            Stage::FrameSource => write!(f, "frame source"),
        }
    }
}

/// Errors produced by the text spotting pipeline.
#[derive(Error, Debug)]
pub enum SpotError {
    /// A fatal configuration error. Surfaces before any frame is processed
    /// and terminates the whole run; it reflects a setup mistake, not a
    /// transient condition.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration problem.
        message: String,
    },

    /// Invalid input caught at an API boundary.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// An external collaborator call failed. Fatal for the frame being
    /// processed; the frame's partial output is discarded.
    #[error("{stage} failed: {context}")]
    Collaborator {
        /// The stage the failing collaborator serves.
        stage: Stage,
        /// Additional context about the failure.
        context: String,
        /// The underlying error reported by the collaborator.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error parsing a JSON configuration document.
    #[error("config parse")]
    ConfigParse(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl SpotError {
    /// Creates a fatal configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid-input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wraps an error reported by an external collaborator.
    pub fn collaborator(
        stage: Stage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Collaborator {
            stage,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Returns true if this error is fatal for the whole run rather than a
    /// single frame.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config { .. } | Self::ConfigParse(_))
    }
}

/// Result alias used throughout the crate.
pub type SpotResult<T> = Result<T, SpotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_is_fatal() {
        let err = SpotError::config("alphabet contains pad symbol");
        assert!(err.is_fatal());
        assert_eq!(
            err.to_string(),
            "configuration: alphabet contains pad symbol"
        );
    }

    #[test]
    fn test_collaborator_error_is_frame_scoped() {
        let io = std::io::Error::other("backend down");
        let err = SpotError::collaborator(Stage::Detection, "infer call", io);
        assert!(!err.is_fatal());
        assert_eq!(err.to_string(), "detection failed: infer call");
    }
}
