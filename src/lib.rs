//! # OAR Table Grid
//!
//! Finds the cells of bordered tables in document images by detecting their
//! ruling lines.
//!
//! ## Features
//!
//! - Morphological line detection: binarization, line-shaped opening, edge
//!   tracing and segment clustering
//! - Pixel-contrast line detection straight from RGB differences, with an
//!   orientation search that tolerates skewed scans
//! - Shared cell grid reconstruction from horizontal and vertical line masks
//! - Skew estimation and optional deskewing
//! - Text-masked detection for tables whose text touches the borders
//! - Strategy selection with fallback between both detectors
//!
//! ## Modules
//!
//! * [`core`] - Configuration, constants, errors and the detector traits
//! * [`domain`] - Line, mask, cell and layout types
//! * [`processors`] - The line detectors and their building blocks
//! * [`pipeline`] - Strategy selection across detectors
//! * [`utils`] - Image helpers and debug output
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oar_table_grid::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = TableGridConfig::new().with_line_detection_methods(vec![
//!     LineDetectionMethod::Morphological,
//!     LineDetectionMethod::PixelContrast,
//! ]);
//! let extractor = BorderedCellExtractor::new(config)?;
//!
//! let image = load_image(Path::new("table.png"))?;
//! let extraction = extractor.extract(&image, None)?;
//! for row in extraction.layout().rows {
//!     println!("{} cells", row.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### Using a single detector
//!
//! ```rust,no_run
//! use oar_table_grid::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let detector = PixelContrastLineDetector::default();
//! let image = load_image(Path::new("table.png"))?;
//! let region = CellBBox::new(40, 120, 900, 600);
//! let detection = detector.detect_all_cells(&image, Some(region), &DebugSink::disabled())?;
//! if !detection.warning.is_empty() {
//!     eprintln!("{}", detection.warning);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod pipeline;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use oar_table_grid::prelude::*;
/// ```
///
/// Included items cover the common path: the extractor, both detectors, their
/// configuration, the result types and image loading. Lower-level building
/// blocks stay in their modules (e.g. `oar_table_grid::processors::segments`).
pub mod prelude {
    pub use crate::pipeline::{BorderedCellExtractor, CellExtraction};
    pub use crate::processors::{MorphologicalLineDetector, PixelContrastLineDetector};

    pub use crate::core::{
        LineDetectionMethod, LineDetector, TableGridConfig, TableGridError, TableGridResult,
        TextToken, TokenSource,
    };
    pub use crate::domain::{CellBBox, CellDetection, TableLayout};

    pub use crate::utils::{DebugSink, load_image};
}
