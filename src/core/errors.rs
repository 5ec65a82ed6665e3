//! Error types for ruling line detection and cell grid reconstruction.
//!
//! A detector either finds no usable ruling lines on an axis, cannot measure
//! skew (callers only see that as a warning string), or receives input it
//! cannot work with. Configuration and image decoding failures are wrapped.

use crate::domain::Axis;
use thiserror::Error;

/// The step of line detection in which a failure was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionStage {
    /// Edge/segment extraction on the morphological path found nothing.
    Hough,
    /// Segments were found but no line group survived clustering.
    Clustering,
    /// The pixel-contrast search produced no candidate lines.
    ContrastSearch,
    /// The two line masks did not produce any cell.
    CellGrid,
}

impl std::fmt::Display for DetectionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DetectionStage::Hough => write!(f, "hough"),
            DetectionStage::Clustering => write!(f, "clustering"),
            DetectionStage::ContrastSearch => write!(f, "contrast search"),
            DetectionStage::CellGrid => write!(f, "cell grid"),
        }
    }
}

/// Errors raised while detecting table cells.
#[derive(Error, Debug)]
pub enum TableGridError {
    /// No usable ruling line candidates on a required axis.
    #[error("No cells detected: {axis} lines not detected ({stage})")]
    NoLinesDetected {
        /// Axis on which detection failed.
        axis: Axis,
        /// Step where the failure was raised.
        stage: DetectionStage,
    },

    /// The line masks were valid but no cell could be reconstructed from them.
    #[error("No cells detected: {message}")]
    NoCellsDetected {
        /// A message describing why no cell survived.
        message: String,
    },

    /// Skew could not be measured. Detectors turn this into a warning.
    #[error("Skew cannot be detected: {reason}")]
    SkewUndetectable {
        /// Why the measurement was impossible.
        reason: String,
    },

    /// Input violated a precondition (empty image, mismatched masks, bad region).
    #[error("malformed input: {message}")]
    MalformedInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Invalid configuration.
    #[error("configuration: {0}")]
    Config(#[from] crate::core::config::ConfigError),

    /// Every configured detection attempt failed.
    #[error("all line detection attempts failed: {}", attempts.join("; "))]
    Exhausted {
        /// One message per failed attempt, in the order they were tried.
        attempts: Vec<String>,
    },

    /// External token source failure (text-masked detection).
    #[error("token source: {0}")]
    TokenSource(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[from] image::ImageError),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl TableGridError {
    /// Creates a `NoLinesDetected` error for the given axis and stage.
    pub fn no_lines(axis: Axis, stage: DetectionStage) -> Self {
        Self::NoLinesDetected { axis, stage }
    }

    /// Creates a `MalformedInput` error.
    ///
    /// # Arguments
    ///
    /// * `message` - A message describing the violated precondition.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
        }
    }

    /// Creates a `SkewUndetectable` error.
    pub fn skew_undetectable(reason: impl Into<String>) -> Self {
        Self::SkewUndetectable {
            reason: reason.into(),
        }
    }

    /// Wraps an error coming from an external token source.
    pub fn token_source(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::TokenSource(Box::new(error))
    }

    /// Returns true when the failure means "no lines/cells found", as opposed to
    /// bad input or configuration. Only these failures are worth retrying with
    /// a different detection strategy.
    pub fn is_detection_failure(&self) -> bool {
        matches!(
            self,
            Self::NoLinesDetected { .. } | Self::NoCellsDetected { .. } | Self::Exhausted { .. }
        )
    }
}

/// Convenient result alias for table grid operations.
pub type TableGridResult<T> = Result<T, TableGridError>;
