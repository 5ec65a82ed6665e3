//! The cell extraction pipeline.
//!
//! This module combines the morphological and pixel-contrast line detectors
//! into a single extractor that falls back from one to the other, or runs both
//! and keeps the better result.

mod extractor;

pub use extractor::{BorderedCellExtractor, CellExtraction};
