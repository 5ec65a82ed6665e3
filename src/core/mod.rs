//! The core module of the table grid extractor.
//!
//! This module contains the fundamental components shared by both line
//! detectors:
//! - Configuration management
//! - Default constants
//! - Error handling
//! - Traits defining the detector and token source interfaces

pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;

pub use config::{
    CellGridConfig, ConfigError, ConfigValidator, ConfigValidatorExt, ContrastMethod,
    DebugConfig, LineDetectionMethod, MorphologicalConfig, PixelContrastConfig, TableGridConfig,
};
pub use constants::*;
pub use errors::{DetectionStage, TableGridError, TableGridResult};
pub use traits::{LineDetector, TextToken, TokenSource};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging, e.g. with
/// `RUST_LOG=table_grid=debug`.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
