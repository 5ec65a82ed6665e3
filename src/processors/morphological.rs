//! Ruling line detection by binarization, directional morphology and segment
//! search.
//!
//! The image is binarized with ink as foreground, opened (or closed, when text
//! has been painted out) with a line-shaped kernel per axis, and the surviving
//! strokes are traced through Canny edges into horizontal segments. Segments
//! are clustered into line groups, and groups covering enough of the image are
//! redrawn as full-length lines. Vertical lines go through exactly the same
//! routine on a quarter-turned image.

use crate::core::config::{CellGridConfig, ConfigValidatorExt, MorphologicalConfig};
use crate::core::constants::{
    BORDER_LIKE_TOKEN_PREFIXES, HOUGH_MAX_LINE_GAP_DIVISOR, HOUGH_MIN_LINE_LENGTH_DIVISOR,
    MASK_LINE_THICKNESS,
};
use crate::core::errors::{DetectionStage, TableGridError, TableGridResult};
use crate::core::traits::{LineDetector, TextToken, TokenSource};
use crate::domain::{Axis, CellBBox, CellDetection, LineGroup, LineMask, SkewEstimate};
use crate::processors::cell_grid::CellGridReconstructor;
use crate::processors::morphology::{
    binarize_adaptive, binarize_otsu, dilate_along, erode_along, kernel_length,
};
use crate::processors::segments::{ComparePos, SegmentParams, accept_groups, cluster, detect_segments};
use crate::processors::skew::estimate_from_groups;
use crate::utils::{
    DebugSink, crop_region, deskew_gray, rethreshold, rotate_quarter_ccw, rotate_quarter_cw,
};
use image::{DynamicImage, GrayImage, Rgb};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::edges::canny;
use imageproc::rect::Rect;

/// How the grayscale image is turned into a binary one, which also fixes the
/// morphology and clustering used afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinarizationMode {
    /// Global Otsu threshold, opening, clustering against a group's first member.
    Otsu,
    /// Local mean threshold, opening, clustering against a group's last member.
    Adaptive,
    /// Like `Adaptive` but closing instead of opening, for images whose text
    /// has been painted out.
    TextMasked,
}

impl BinarizationMode {
    pub fn name(self) -> &'static str {
        match self {
            BinarizationMode::Otsu => "otsu",
            BinarizationMode::Adaptive => "adaptive",
            BinarizationMode::TextMasked => "text_masked",
        }
    }

    fn compare_pos(self) -> ComparePos {
        match self {
            BinarizationMode::Otsu => ComparePos::First,
            BinarizationMode::Adaptive | BinarizationMode::TextMasked => ComparePos::Last,
        }
    }

    fn closes(self) -> bool {
        self == BinarizationMode::TextMasked
    }
}

/// Validated lines of one axis.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisLines {
    /// Full-length lines at the accepted groups, in image orientation.
    pub mask: LineMask,
    /// Accepted groups in the working (horizontal) frame.
    pub groups: Vec<LineGroup>,
}

/// Morphology based [`LineDetector`].
#[derive(Debug, Clone)]
pub struct MorphologicalLineDetector {
    config: MorphologicalConfig,
    cell_grid: CellGridReconstructor,
    mode: BinarizationMode,
    deskew: bool,
}

impl Default for MorphologicalLineDetector {
    fn default() -> Self {
        Self {
            config: MorphologicalConfig::default(),
            cell_grid: CellGridReconstructor::default(),
            mode: BinarizationMode::Otsu,
            deskew: false,
        }
    }
}

impl MorphologicalLineDetector {
    /// Creates a detector in Otsu mode without deskewing.
    ///
    /// # Errors
    ///
    /// Returns `TableGridError::Config` if either configuration is invalid.
    pub fn new(config: MorphologicalConfig, cell_grid: CellGridConfig) -> TableGridResult<Self> {
        Ok(Self {
            config: config.validated()?,
            cell_grid: CellGridReconstructor::new(cell_grid.validated()?),
            mode: BinarizationMode::Otsu,
            deskew: false,
        })
    }

    /// Selects the binarization used before the line search.
    pub fn with_mode(mut self, mode: BinarizationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Straighten the binary image by the estimated skew before line search.
    pub fn with_deskew(mut self, deskew: bool) -> Self {
        self.deskew = deskew;
        self
    }

    /// The binarization this detector runs with.
    pub fn mode(&self) -> BinarizationMode {
        self.mode
    }

    /// The validated line search parameters.
    pub fn config(&self) -> &MorphologicalConfig {
        &self.config
    }

    /// Binarizes `gray` according to the current mode, ink as 255.
    pub fn binarize(&self, gray: &GrayImage) -> GrayImage {
        match self.mode {
            BinarizationMode::Otsu => binarize_otsu(gray),
            BinarizationMode::Adaptive | BinarizationMode::TextMasked => {
                binarize_adaptive(gray, self.config.adaptive_block_size, self.config.adaptive_c)
            }
        }
    }

    /// Finds the ruling lines of one axis in a binary image.
    ///
    /// # Arguments
    ///
    /// * `binary` - Binarized image, ink as 255.
    /// * `axis` - Which lines to look for.
    /// * `max_gap` - Clustering distance in rows of the working frame.
    /// * `compare` - Group member new segments are compared against.
    /// * `closing` - Dilate-then-erode instead of erode-then-dilate.
    /// * `debug` - Sink for the intermediate images.
    ///
    /// # Errors
    ///
    /// Returns `TableGridError::NoLinesDetected` if no segment is found.
    /// Segments that are all rejected by the coverage filter are not an error;
    /// the returned mask is then empty.
    pub fn detect_axis_lines(
        &self,
        binary: &GrayImage,
        axis: Axis,
        max_gap: i32,
        compare: ComparePos,
        closing: bool,
        debug: &DebugSink,
    ) -> TableGridResult<AxisLines> {
        let (width, height) = binary.dimensions();
        let len = kernel_length(axis.line_extent(width, height));
        let (first, strokes) = if closing {
            let first = dilate_along(binary, axis, len, 1);
            let strokes = erode_along(&first, axis, len, 1);
            (first, strokes)
        } else {
            let first = erode_along(binary, axis, len, 2);
            let strokes = dilate_along(&first, axis, len, 2);
            (first, strokes)
        };
        let (first_name, redrawn_name) = match axis {
            Axis::Horizontal => ("image_h1", "image_h_re-drawn"),
            Axis::Vertical => ("image_v1", "image_v_re-drawn"),
        };
        debug.save_gray(first_name, &first);

        let working = match axis {
            Axis::Horizontal => strokes,
            Axis::Vertical => rotate_quarter_ccw(&strokes),
        };
        let (work_w, work_h) = working.dimensions();
        let edges = canny(&working, self.config.canny_low, self.config.canny_high);
        let params = SegmentParams {
            min_length: (work_h / HOUGH_MIN_LINE_LENGTH_DIVISOR) as i32,
            max_line_gap: (work_w / HOUGH_MAX_LINE_GAP_DIVISOR) as i32,
            threshold: self.config.hough_threshold,
        };
        let segments = detect_segments(&edges, params);
        if segments.is_empty() {
            tracing::debug!(target: "table_grid", %axis, kernel = len, "no segments found");
            return Err(TableGridError::no_lines(axis, DetectionStage::Hough));
        }

        let groups = cluster(&segments, max_gap, compare);
        let candidate_count = groups.len();
        let groups = accept_groups(
            groups,
            work_w,
            self.config.min_line_scale,
            self.config.min_segment_scale,
        );

        let mut mask = LineMask::blank(Axis::Horizontal, work_w, work_h);
        for group in &groups {
            mask.paint_full_line(group[0].y1.max(0) as u32, MASK_LINE_THICKNESS);
        }
        let mask = match axis {
            Axis::Horizontal => mask,
            Axis::Vertical => LineMask::from_image(Axis::Vertical, rotate_quarter_cw(mask.as_image())),
        };
        debug.save_gray(redrawn_name, mask.as_image());

        tracing::debug!(
            target: "table_grid",
            %axis,
            kernel = len,
            segments = segments.len(),
            groups = candidate_count,
            accepted = groups.len(),
            "axis lines detected"
        );
        Ok(AxisLines { mask, groups })
    }

    pub fn detect_horizontal_lines(
        &self,
        binary: &GrayImage,
        debug: &DebugSink,
    ) -> TableGridResult<AxisLines> {
        let mode = self.mode;
        self.detect_axis_lines(
            binary,
            Axis::Horizontal,
            self.config.max_gap,
            mode.compare_pos(),
            mode.closes(),
            debug,
        )
    }

    pub fn detect_vertical_lines(
        &self,
        binary: &GrayImage,
        debug: &DebugSink,
    ) -> TableGridResult<AxisLines> {
        let mode = self.mode;
        self.detect_axis_lines(
            binary,
            Axis::Vertical,
            self.config.max_gap,
            mode.compare_pos(),
            mode.closes(),
            debug,
        )
    }

    /// Measures skew with a relaxed horizontal pass over `binary`.
    ///
    /// Never fails: when no line can be measured the estimate carries a
    /// warning and a zero angle.
    pub fn detect_image_skew(&self, binary: &GrayImage) -> SkewEstimate {
        let groups = match self.detect_axis_lines(
            binary,
            Axis::Horizontal,
            self.config.skew_max_gap,
            ComparePos::Last,
            false,
            &DebugSink::disabled(),
        ) {
            Ok(lines) => lines.groups,
            Err(e) => return SkewEstimate::undetectable(e),
        };
        match estimate_from_groups(&groups, binary.width(), self.config.skew_warning_degrees) {
            Ok(estimate) => estimate,
            Err(TableGridError::SkewUndetectable { reason }) => SkewEstimate::undetectable(reason),
            Err(e) => SkewEstimate::undetectable(e),
        }
    }

    /// Paints recognized words out of the image and detects cells on what is
    /// left, in text-masked mode.
    ///
    /// Tokens are requested for the cropped region and must be relative to
    /// it. Tokens with empty text or starting with `[`, `|` or `(` are left in
    /// place since they are usually misread borders.
    ///
    /// Returns the detection and the mean height of the masked tokens (0 when
    /// none were masked).
    pub fn detect_with_text_masked(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        tokens: &dyn TokenSource,
        debug: &DebugSink,
    ) -> TableGridResult<(CellDetection, f64)> {
        let cropped = crop_region(image, region)?;
        let words = tokens.tokens(&cropped)?;
        let mut rgb = cropped.to_rgb8();
        let mean_word_height = mask_tokens(&mut rgb, &words);
        debug.save_rgb("removed_text", &rgb);

        tracing::debug!(
            target: "table_grid",
            tokens = words.len(),
            mean_word_height,
            "text masked"
        );

        let detector = self.clone().with_mode(BinarizationMode::TextMasked);
        let detection = detector.detect_all_cells(&DynamicImage::ImageRgb8(rgb), None, debug)?;
        Ok((detection, mean_word_height))
    }
}

/// Paints every maskable token white and returns their mean height.
fn mask_tokens(rgb: &mut image::RgbImage, tokens: &[TextToken]) -> f64 {
    let (width, height) = rgb.dimensions();
    let mut height_sum = 0u64;
    let mut count = 0u64;
    for token in tokens {
        if token.text.is_empty() || token.text.starts_with(BORDER_LIKE_TOKEN_PREFIXES) {
            continue;
        }
        height_sum += token.bbox.height as u64;
        count += 1;
        if let Some(bbox) = token.bbox.clamp_to(width, height) {
            let rect = Rect::at(bbox.x as i32, bbox.y as i32).of_size(bbox.width, bbox.height);
            draw_filled_rect_mut(rgb, rect, Rgb([255, 255, 255]));
        }
    }
    if count == 0 {
        0.0
    } else {
        height_sum as f64 / count as f64
    }
}

impl LineDetector for MorphologicalLineDetector {
    fn name(&self) -> &'static str {
        "morphological"
    }

    fn detect_all_cells(
        &self,
        image: &DynamicImage,
        region: Option<CellBBox>,
        debug: &DebugSink,
    ) -> TableGridResult<CellDetection> {
        let cropped = crop_region(image, region)?;
        let gray = cropped.to_luma8();
        let mut binary = self.binarize(&gray);
        debug.save_gray("img_bin", &binary);

        let skew = self.detect_image_skew(&binary);
        if self.deskew && skew.angle_degrees != 0.0 {
            binary = deskew_gray(&binary, skew.angle_degrees, 0);
            rethreshold(&mut binary);
        }

        let (horizontal, vertical) = rayon::join(
            || self.detect_horizontal_lines(&binary, debug),
            || self.detect_vertical_lines(&binary, debug),
        );
        let horizontal = horizontal?;
        let vertical = vertical?;
        for (axis, lines) in [(Axis::Horizontal, &horizontal), (Axis::Vertical, &vertical)] {
            if lines.groups.is_empty() {
                return Err(TableGridError::no_lines(axis, DetectionStage::Clustering));
            }
        }

        let cells = self
            .cell_grid
            .reconstruct(&horizontal.mask, &vertical.mask, debug)?;

        tracing::info!(
            target: "table_grid",
            detector = self.name(),
            mode = self.mode.name(),
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
