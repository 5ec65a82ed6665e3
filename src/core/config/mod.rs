//! Configuration for line detection and cell grid reconstruction.
//!
//! This module provides the configuration types, validation traits, and JSON
//! loading used by the detectors and the bordered cell extractor.

pub mod detection;
pub mod errors;

pub use detection::{
    CellGridConfig, ContrastMethod, DebugConfig, LineDetectionMethod, MorphologicalConfig,
    PixelContrastConfig, TableGridConfig,
};
pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
