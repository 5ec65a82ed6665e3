//! Ruling line primitives.
//!
//! Line segments are always stored in their canonical horizontal form: vertical
//! detection rotates the working image by 90° first, so a [`LineSegment`] found
//! on the vertical axis has `y1 == y2` in the rotated frame.

use image::{GrayImage, Luma};
use serde::{Deserialize, Serialize};

/// Pixel value marking a ruling line in a [`LineMask`].
pub const LINE_PIXEL: u8 = 255;

/// Pixel value marking background in a [`LineMask`].
pub const BACKGROUND_PIXEL: u8 = 0;

/// One of the two ruling line directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Rows of the table.
    Horizontal,
    /// Columns of the table.
    Vertical,
}

impl Axis {
    /// Length of the image along this axis' lines (width for horizontal lines,
    /// height for vertical ones).
    #[inline]
    pub fn line_extent(self, width: u32, height: u32) -> u32 {
        match self {
            Axis::Horizontal => width,
            Axis::Vertical => height,
        }
    }

    /// Length of the image across this axis' lines.
    #[inline]
    pub fn cross_extent(self, width: u32, height: u32) -> u32 {
        match self {
            Axis::Horizontal => height,
            Axis::Vertical => width,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Horizontal => write!(f, "horizontal"),
            Axis::Vertical => write!(f, "vertical"),
        }
    }
}

/// A straight horizontal run found by the segment detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// `x2 - x1`.
    pub length: i32,
}

impl LineSegment {
    /// Creates a segment, deriving `length` from the x span.
    #[inline]
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            length: x2 - x1,
        }
    }

    /// Creates a horizontal segment on row `y`.
    #[inline]
    pub fn horizontal(x1: i32, x2: i32, y: i32) -> Self {
        Self::new(x1, y, x2, y)
    }

    /// True when both ends of `other` fall inside this segment's x span.
    #[inline]
    pub fn spans(&self, other: &LineSegment) -> bool {
        let end = self.x1 + self.length;
        (self.x1..=end).contains(&other.x1) && (self.x1..=end).contains(&other.x2)
    }
}

/// Segments believed to belong to the same physical ruling line, in the order
/// the clustering pass appended them.
pub type LineGroup = Vec<LineSegment>;

/// A candidate line found by the pixel-contrast search.
///
/// `start` is the position (row for horizontal, column for vertical) where the
/// line begins and `end` the position it reaches at the far side of the image
/// under the best-fit orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContrastLine {
    pub start: usize,
    pub end: usize,
    /// Fraction of the line length showing contrast, in `[0, 1]`.
    pub score: f64,
}

impl ContrastLine {
    /// Signed offset between the two ends, positive when the line drifts
    /// towards higher positions.
    #[inline]
    pub fn drift(&self) -> i64 {
        self.end as i64 - self.start as i64
    }
}

/// Binary image where [`LINE_PIXEL`] marks a validated ruling line.
///
/// The mask always has the dimensions of the (possibly cropped) input image
/// regardless of its axis.
#[derive(Debug, Clone, PartialEq)]
pub struct LineMask {
    axis: Axis,
    image: GrayImage,
}

impl LineMask {
    /// Creates an empty mask.
    pub fn blank(axis: Axis, width: u32, height: u32) -> Self {
        Self {
            axis,
            image: GrayImage::from_pixel(width, height, Luma([BACKGROUND_PIXEL])),
        }
    }

    /// Wraps an existing binary image. Any non-zero pixel counts as a line.
    pub fn from_image(axis: Axis, image: GrayImage) -> Self {
        Self { axis, image }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Returns true when `(x, y)` is part of a line. Out-of-bounds is background.
    #[inline]
    pub fn is_line(&self, x: u32, y: u32) -> bool {
        x < self.image.width() && y < self.image.height() && self.image.get_pixel(x, y)[0] > 0
    }

    /// Paints a full-length line at `position` (a row for horizontal masks, a
    /// column for vertical ones) with the given thickness.
    pub fn paint_full_line(&mut self, position: u32, thickness: u32) {
        let (width, height) = self.image.dimensions();
        let limit = self.axis.cross_extent(width, height);
        for offset in 0..thickness.max(1) {
            let p = position + offset;
            if p >= limit {
                break;
            }
            match self.axis {
                Axis::Horizontal => {
                    for x in 0..width {
                        self.image.put_pixel(x, p, Luma([LINE_PIXEL]));
                    }
                }
                Axis::Vertical => {
                    for y in 0..height {
                        self.image.put_pixel(p, y, Luma([LINE_PIXEL]));
                    }
                }
            }
        }
    }

    /// Number of line pixels in the mask.
    pub fn line_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p[0] > 0).count()
    }

    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }
}

/// A rectangular cell in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CellBBox {
    #[inline]
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the part of this box that lies inside a `width` x `height` image,
    /// or `None` when nothing is left.
    pub fn clamp_to(&self, width: u32, height: u32) -> Option<CellBBox> {
        if self.x >= width || self.y >= height {
            return None;
        }
        let w = self.width.min(width - self.x);
        let h = self.height.min(height - self.y);
        if w == 0 || h == 0 {
            return None;
        }
        Some(CellBBox::new(self.x, self.y, w, h))
    }
}

/// Estimated page skew. Not an error: an angle plus an advisory message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkewEstimate {
    /// Degrees; positive when ruling lines drop towards the right.
    pub angle_degrees: f64,
    /// Empty when nothing is worth reporting.
    pub warning: String,
}

impl SkewEstimate {
    /// Skew could not be measured; the angle defaults to 0.
    pub fn undetectable(reason: impl std::fmt::Display) -> Self {
        Self {
            angle_degrees: 0.0,
            warning: format!("Skew cannot be detected: {reason}"),
        }
    }

    /// Builds an estimate, attaching a warning when `|angle|` exceeds `warn_above`.
    pub fn from_angle(angle_degrees: f64, warn_above: f64) -> Self {
        // Avoid reporting -0.0 for level pages.
        let angle_degrees = if angle_degrees == 0.0 {
            0.0
        } else {
            angle_degrees
        };
        let warning = if angle_degrees.abs() > warn_above {
            format!("Skew detected: {angle_degrees}")
        } else {
            String::new()
        };
        Self {
            angle_degrees,
            warning,
        }
    }
}

/// Output of a detector's `detect_all_cells`.
#[derive(Debug, Clone, PartialEq)]
pub struct CellDetection {
    /// Cells in row-major order (top-to-bottom, left-to-right).
    pub cells: Vec<CellBBox>,
    /// Advisory message; empty when there is nothing to report.
    pub warning: String,
    /// Estimated skew in degrees.
    pub skew_angle: f64,
    /// Horizontal ruling lines the cells were built from.
    pub horizontal: LineMask,
    /// Vertical ruling lines the cells were built from.
    pub vertical: LineMask,
}

impl CellDetection {
    /// The `(cells, warning, skew_angle)` triple.
    pub fn into_parts(self) -> (Vec<CellBBox>, String, f64) {
        (self.cells, self.warning, self.skew_angle)
    }
}
