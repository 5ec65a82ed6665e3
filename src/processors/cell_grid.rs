//! Cell grid reconstruction from a pair of line masks.
//!
//! Rows and columns that contain an intersection of a horizontal and a
//! vertical line are collected into runs of adjacent indices (a thick line is
//! one run). Runs closer together than the smallest admissible cell are merged.
//! Every pair of consecutive row runs crossed with every pair of consecutive
//! column runs then yields one cell: the area strictly between the runs.

use crate::core::config::CellGridConfig;
use crate::core::errors::{DetectionStage, TableGridError, TableGridResult};
use crate::domain::{CellBBox, LineMask};
use crate::utils::DebugSink;
use image::{GrayImage, Luma};
use itertools::Itertools;

/// Inclusive range of adjacent boundary indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Run {
    start: u32,
    end: u32,
}

/// Turns horizontal and vertical line masks into cells.
#[derive(Debug, Clone, Default)]
pub struct CellGridReconstructor {
    config: CellGridConfig,
}

impl CellGridReconstructor {
    pub fn new(config: CellGridConfig) -> Self {
        Self { config }
    }

    /// Returns cells in row-major order (top-to-bottom, left-to-right).
    ///
    /// A cell is kept when it is wider than `width / min_cell_width_divisor`
    /// and at least `height / min_cell_height_divisor` tall.
    ///
    /// # Errors
    ///
    /// * `TableGridError::MalformedInput` if the masks differ in size or are empty.
    /// * `TableGridError::NoCellsDetected` if no cell survives.
    pub fn reconstruct(
        &self,
        horizontal: &LineMask,
        vertical: &LineMask,
        debug: &DebugSink,
    ) -> TableGridResult<Vec<CellBBox>> {
        if horizontal.dimensions() != vertical.dimensions() {
            return Err(TableGridError::malformed(format!(
                "line masks differ in size: horizontal {:?}, vertical {:?}",
                horizontal.dimensions(),
                vertical.dimensions()
            )));
        }
        let (width, height) = horizontal.dimensions();
        if width == 0 || height == 0 {
            return Err(TableGridError::malformed("line masks are empty"));
        }

        for mask in [horizontal, vertical] {
            if mask.line_pixel_count() == 0 {
                return Err(TableGridError::no_lines(mask.axis(), DetectionStage::CellGrid));
            }
        }

        let mut row_hits = vec![false; height as usize];
        let mut col_hits = vec![false; width as usize];
        for y in 0..height {
            for x in 0..width {
                if horizontal.is_line(x, y) && vertical.is_line(x, y) {
                    row_hits[y as usize] = true;
                    col_hits[x as usize] = true;
                }
            }
        }

        let min_width = width as f64 / self.config.min_cell_width_divisor as f64;
        let min_height = height as f64 / self.config.min_cell_height_divisor as f64;
        let rows = merge_close(runs(&row_hits), min_height);
        let cols = merge_close(runs(&col_hits), min_width);

        let mut cells = Vec::new();
        for (top, bottom) in rows.iter().tuple_windows() {
            let y = top.end + 1;
            let h = bottom.start - y;
            for (left, right) in cols.iter().tuple_windows() {
                let x = left.end + 1;
                let w = right.start - x;
                if w as f64 > min_width && h as f64 >= min_height {
                    cells.push(CellBBox::new(x, y, w, h));
                }
            }
        }

        tracing::debug!(
            target: "table_grid",
            row_boundaries = rows.len(),
            column_boundaries = cols.len(),
            cells = cells.len(),
            "cell grid reconstructed"
        );

        if debug.is_enabled() {
            let union = GrayImage::from_fn(width, height, |x, y| {
                if horizontal.is_line(x, y) || vertical.is_line(x, y) {
                    Luma([255])
                } else {
                    Luma([0])
                }
            });
            debug.save_gray("img_vh", &union);
            let base = image::DynamicImage::ImageLuma8(union).to_rgb8();
            debug.save_cells("boxes", &base, &cells);
        }

        if cells.is_empty() {
            return Err(TableGridError::NoCellsDetected {
                message: format!(
                    "{} row and {} column boundaries enclose no cell",
                    rows.len(),
                    cols.len()
                ),
            });
        }
        Ok(cells)
    }
}

/// Groups set indices into runs of adjacent indices.
fn runs(hits: &[bool]) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    for (i, _) in hits.iter().enumerate().filter(|(_, hit)| **hit) {
        let i = i as u32;
        match runs.last_mut() {
            Some(run) if run.end + 1 == i => run.end = i,
            _ => runs.push(Run { start: i, end: i }),
        }
    }
    runs
}

/// Merges runs separated by less than `min_gap` pixels.
fn merge_close(runs: Vec<Run>, min_gap: f64) -> Vec<Run> {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs {
        match merged.last_mut() {
            Some(prev) if ((run.start - prev.end - 1) as f64) < min_gap => prev.end = run.end,
            _ => merged.push(run),
        }
    }
    merged
}
