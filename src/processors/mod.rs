//! Image processing for ruling line detection.
//!
//! This module provides the two line detectors and the building blocks they
//! share.
//!
//! # Modules
//!
//! * `morphology` - Binarization and separable erosion/dilation
//! * `segments` - Horizontal segment extraction, clustering and acceptance
//! * `skew` - Skew estimation from detected lines
//! * `morphological` - Line detector based on binarization and morphology
//! * `pixel_contrast` - Line detector based on RGB pixel contrast
//! * `cell_grid` - Cell reconstruction from horizontal and vertical masks

pub mod cell_grid;
pub mod morphological;
pub mod morphology;
pub mod pixel_contrast;
pub mod segments;
pub mod skew;

pub use cell_grid::CellGridReconstructor;
pub use morphological::{AxisLines, BinarizationMode, MorphologicalLineDetector};
pub use pixel_contrast::{AxisDetection, PixelContrastLineDetector};
pub use segments::{ComparePos, SegmentParams};
