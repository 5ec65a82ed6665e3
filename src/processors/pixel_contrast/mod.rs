//! Ruling line detection directly from RGB pixel contrast.
//!
//! No binarization takes place: each axis builds an edge matrix from
//! neighbouring pixel differences, picks candidate positions from a cheap
//! contrast vector, fits each candidate's orientation, rationalizes the
//! candidates and paints the survivors as full-length lines. The two axes are
//! independent and run on separate workers.

mod contrast;
mod lines;

pub use contrast::{
    contrast_vector, detect_contrast_lines, edge_matrix, find_best_orientation, pixel_diff,
};
pub use lines::{paint_lines, rationalize};

use crate::core::config::{CellGridConfig, ConfigValidatorExt, PixelContrastConfig};
use crate::core::errors::{TableGridError, TableGridResult};
use crate::core::traits::LineDetector;
use crate::domain::{Axis, CellBBox, CellDetection, ContrastLine, LineMask, SkewEstimate};
use crate::processors::cell_grid::CellGridReconstructor;
use crate::processors::skew::estimate_from_contrast_lines;
use crate::utils::{DebugSink, crop_region, deskew_rgb};
use image::{DynamicImage, RgbImage};

/// Lines found on one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisDetection {
    pub mask: LineMask,
    /// Rationalized lines ordered by `start`.
    pub lines: Vec<ContrastLine>,
}

/// Pixel-contrast based [`LineDetector`].
#[derive(Debug, Clone, Default)]
pub struct PixelContrastLineDetector {
    config: PixelContrastConfig,
    cell_grid: CellGridReconstructor,
    deskew: bool,
}

impl PixelContrastLineDetector {
    /// Creates a detector without deskewing.
    ///
    /// # Errors
    ///
    /// Returns `TableGridError::Config` if either configuration is invalid.
    pub fn new(config: PixelContrastConfig, cell_grid: CellGridConfig) -> TableGridResult<Self> {
        Ok(Self {
            config: config.validated()?,
            cell_grid: CellGridReconstructor::new(cell_grid.validated()?),
            deskew: false,
        })
    }

    /// Straighten the region by the estimated skew and detect again.
    pub fn with_deskew(mut self, deskew: bool) -> Self {
        self.deskew = deskew;
        self
    }

    pub fn config(&self) -> &PixelContrastConfig {
        &self.config
    }

    /// Detects the lines of one axis.
    ///
    /// # Errors
    ///
    /// Returns `TableGridError::NoLinesDetected` if no candidate passes the
    /// orientation search.
    pub fn detect_lines(
        &self,
        rgb: &RgbImage,
        axis: Axis,
        debug: &DebugSink,
    ) -> TableGridResult<AxisDetection> {
        let config = &self.config;
        let edges = edge_matrix(rgb, axis, config.diff_threshold);
        let vector = contrast_vector(
            &edges,
            config.l1_convolution_size,
            config.l1_contrast_line_portion,
        );
        let candidates = detect_contrast_lines(&edges, &vector, config);
        tracing::debug!(
            target: "table_grid",
            %axis,
            positions = vector.len(),
            candidates = candidates.len(),
            "contrast candidates found"
        );

        let lines = rationalize(&candidates, axis)?;
        let mask = paint_lines(&lines, axis, rgb.width(), rgb.height());
        let name = match axis {
            Axis::Horizontal => "rgb_hori",
            Axis::Vertical => "rgb_vert",
        };
        debug.save_gray(name, mask.as_image());
        Ok(AxisDetection { mask, lines })
    }

    /// Detects both axes, on two workers when `concurrent_axes` is set.
    pub fn detect_both_axes(
        &self,
        rgb: &RgbImage,
        debug: &DebugSink,
    ) -> TableGridResult<(AxisDetection, AxisDetection)> {
        let (horizontal, vertical) = if self.config.concurrent_axes {
            rayon::join(
                || self.detect_lines(rgb, Axis::Horizontal, debug),
                || self.detect_lines(rgb, Axis::Vertical, debug),
            )
        } else {
            (
                self.detect_lines(rgb, Axis::Horizontal, debug),
                self.detect_lines(rgb, Axis::Vertical, debug),
            )
        };
        Ok((horizontal?, vertical?))
    }

    /// Skew implied by the horizontal lines; a warning with angle 0 when
    /// there are none.
    pub fn detect_image_skew(&self, horizontal: &[ContrastLine], width: u32) -> SkewEstimate {
        match estimate_from_contrast_lines(horizontal, width, self.config.skew_warning_degrees) {
            Ok(estimate) => estimate,
            Err(TableGridError::SkewUndetectable { reason }) => SkewEstimate::undetectable(reason),
            Err(e) => SkewEstimate::undetectable(e),
        }
    }
}

impl LineDetector for PixelContrastLineDetector {
    fn name(&self) -> &'static str {
        "pixel_contrast"
    }

    fn detect_all_cells(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        debug: &DebugSink,
    ) -> TableGridResult<CellDetection> {
        let rgb = crop_region(image, region)?.to_rgb8();

        let (mut horizontal, mut vertical) = self.detect_both_axes(&rgb, debug)?;
        let skew = self.detect_image_skew(&horizontal.lines, rgb.width());

        if self.deskew && skew.angle_degrees != 0.0 {
            let straightened = deskew_rgb(&rgb, skew.angle_degrees);
            tracing::debug!(
                target: "table_grid",
                angle = skew.angle_degrees,
                "detecting again on deskewed region"
            );
            (horizontal, vertical) = self.detect_both_axes(&straightened, debug)?;
        }

        let cells = self
            .cell_grid
            .reconstruct(&horizontal.mask, &vertical.mask, debug)?;

        tracing::info!(
            target: "table_grid",
            detector = self.name(),
            cells = cells.len(),
            skew = skew.angle_degrees,
            "cells detected"
        );
        Ok(CellDetection {
            cells,
            warning: skew.warning,
            skew_angle: skew.angle_degrees,
            horizontal: horizontal.mask,
            vertical: vertical.mask,
        })
    }
}
