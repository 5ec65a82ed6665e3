//! Trait definitions shared by the line detectors and the cell extractor.

use crate::core::errors::TableGridResult;
use crate::domain::{CellBBox, CellDetection};
use crate::utils::DebugSink;
use image::DynamicImage;
use std::fmt::Debug;

/// A ruling line detector that turns a table image into cells.
///
/// Both detectors produce a horizontal and a vertical [`LineMask`] of the same
/// dimensions and hand them to the shared cell grid reconstructor, so callers
/// can swap one for the other freely.
///
/// [`LineMask`]: crate::domain::LineMask
pub trait LineDetector: Send + Sync + Debug {
    /// Short identifier used in logs and processing messages.
    fn name(&self) -> &'static str;

    /// Detects every bordered cell of the table in `image`.
    ///
    /// # Arguments
    ///
    /// * `image` - The table image.
    /// * `region` - Optional crop; returned cells are relative to its origin.
    /// * `debug` - Sink for intermediate images.
    ///
    /// # Errors
    ///
    /// Returns `TableGridError::NoLinesDetected` when an axis has no usable
    /// lines, `TableGridError::NoCellsDetected` when the masks produce no cell,
    /// and `TableGridError::MalformedInput` for empty images or regions.
    fn detect_all_cells(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        debug: &DebugSink,
    ) -> TableGridResult<CellDetection>;
}

/// A recognized word with its bounding box in image coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextToken {
    pub text: String,
    pub bbox: CellBBox,
}

impl TextToken {
    pub fn new(text: impl Into<String>, bbox: CellBBox) -> Self {
        Self {
            text: text.into(),
            bbox,
        }
    }
}

/// Supplies word boxes for an image, typically from an OCR engine.
///
/// Used by text-masked detection to paint text out of the image before
/// looking for ruling lines.
pub trait TokenSource: Send + Sync + Debug {
    fn tokens(&self, image: &DynamicImage) -> TableGridResult<Vec<TextToken>>;
}

/// A fixed list of tokens, already recognized by the caller.
impl TokenSource for Vec<TextToken> {
    fn tokens(&self, _image: &DynamicImage) -> TableGridResult<Vec<TextToken>> {
        Ok(self.clone())
    }
}
