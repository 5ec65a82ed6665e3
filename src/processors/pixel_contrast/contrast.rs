//! Edge matrix, contrast vector and orientation search.
//!
//! Everything here works on an axis-oriented edge matrix indexed `[i, j]`,
//! where `i` runs across the lines being searched (rows for horizontal lines,
//! columns for vertical ones) and `j` runs along them.

use crate::core::config::{ContrastMethod, PixelContrastConfig};
use crate::domain::{Axis, ContrastLine};
use image::{Rgb, RgbImage};
use ndarray::Array2;

/// Squared RGB distance between two pixels, divided by 255.
#[inline]
pub fn pixel_diff(a: &Rgb<u8>, b: &Rgb<u8>) -> f64 {
    let sq = |c: usize| {
        let d = a[c] as i32 - b[c] as i32;
        (d * d) as f64
    };
    (sq(0) + sq(1) + sq(2)) / 255.0
}

/// Marks every pixel whose contrast to its predecessor across `axis` lines
/// exceeds `diff_threshold`. The first row (or column) never is an edge.
pub fn edge_matrix(rgb: &RgbImage, axis: Axis, diff_threshold: f64) -> Array2<bool> {
    let (width, height) = rgb.dimensions();
    let axis_1 = axis.cross_extent(width, height) as usize;
    let axis_2 = axis.line_extent(width, height) as usize;
    Array2::from_shape_fn((axis_1, axis_2), |(i, j)| {
        if i == 0 {
            return false;
        }
        let (i, j) = (i as u32, j as u32);
        let (current, previous) = match axis {
            Axis::Horizontal => (rgb.get_pixel(j, i), rgb.get_pixel(j, i - 1)),
            Axis::Vertical => (rgb.get_pixel(i, j), rgb.get_pixel(i - 1, j)),
        };
        pixel_diff(current, previous) > diff_threshold
    })
}

/// First-pass line signal: for each `i`, the fraction of the leading
/// `line_portion` of positions `j` that have an edge somewhere in
/// `i..i + convolution_size`.
pub fn contrast_vector(edges: &Array2<bool>, convolution_size: usize, line_portion: f64) -> Vec<f64> {
    let (axis_1, axis_2) = edges.dim();
    let portion = (axis_2 as f64 * line_portion) as usize;
    if portion == 0 {
        return vec![0.0; axis_1];
    }
    (0..axis_1)
        .map(|i| {
            let rows = i..(i + convolution_size).min(axis_1);
            let hits = (0..portion)
                .filter(|&j| rows.clone().any(|k| edges[[k, j]]))
                .count();
            hits as f64 / portion as f64
        })
        .collect()
}

/// Searches `2 * jump_steps + 1` straight paths starting at `current_i` and
/// drifting by up to `jump_steps * jump_i` positions at the far end.
///
/// Returns the best score and the position the best path ends at. Ties keep
/// the earliest path, which is the one drifting furthest towards lower
/// positions.
pub fn find_best_orientation(
    edges: &Array2<bool>,
    current_i: usize,
    config: &PixelContrastConfig,
) -> (f64, usize) {
    let (axis_1, axis_2) = edges.dim();
    let steps = config.orientation_jump_steps as i64;
    let jump_i = config.orientation_jump_i as f64;
    let use_convolution = config.uses(ContrastMethod::Convolution);
    let use_adaptive = config.uses(ContrastMethod::Adaptive);
    let last = axis_1 as i64 - 1;

    let mut max_contrast = 0.0;
    let mut i_end = current_i;

    for offset in -steps..=steps {
        let mut m1_count = 0usize;
        let mut m2_count = 0usize;
        let mut m2_i = current_i;
        let mut i_val = current_i;

        for j in 0..axis_2 {
            let drift = offset as f64 * j as f64 * jump_i / axis_2 as f64;
            i_val = ((current_i as f64 + drift).trunc() as i64).clamp(0, last) as usize;

            if use_convolution && convolution_match(edges, i_val, j, config.l2_convolution_size) {
                m1_count += 1;
            }
            if use_adaptive {
                let (found, next_i) = adaptive_match(edges, m2_i, i_val, offset.signum(), j);
                m2_count += usize::from(found);
                m2_i = next_i;
            }
        }

        let m1 = m1_count as f64 / axis_2 as f64;
        let m2 = m2_count as f64 / axis_2 as f64;
        let contrast = match (use_convolution, use_adaptive) {
            (true, true) => m1.max(m2),
            (false, true) => m2,
            _ => m1,
        };
        if max_contrast < contrast {
            max_contrast = contrast;
            i_end = i_val;
        }
    }
    (max_contrast, i_end)
}

/// Whether any of `i_val..i_val + size` has an edge at `j`.
fn convolution_match(edges: &Array2<bool>, i_val: usize, j: usize, size: usize) -> bool {
    let axis_1 = edges.nrows();
    (i_val..(i_val + size).min(axis_1)).any(|k| edges[[k, j]])
}

/// Single-pixel match at the running position `m2_i`, which may step one
/// position in `direction` when that keeps it within one of the ideal path.
///
/// Returns whether an edge was matched and the new running position.
fn adaptive_match(
    edges: &Array2<bool>,
    m2_i: usize,
    i_val: usize,
    direction: i64,
    j: usize,
) -> (bool, usize) {
    if edges[[m2_i, j]] {
        return (true, m2_i);
    }
    let next = m2_i as i64 + direction;
    if direction != 0
        && next > 0
        && next < edges.nrows() as i64
        && edges[[next as usize, j]]
        && (next - i_val as i64).abs() <= 1
    {
        return (true, next as usize);
    }
    (false, m2_i)
}

/// Runs the orientation search on every position whose first-pass contrast
/// exceeds the first threshold, keeping those whose best score exceeds the
/// second. Results are ordered by `start`.
pub fn detect_contrast_lines(
    edges: &Array2<bool>,
    vector: &[f64],
    config: &PixelContrastConfig,
) -> Vec<ContrastLine> {
    vector
        .iter()
        .enumerate()
        .filter(|(_, ratio)| **ratio > config.l1_contrast_threshold)
        .filter_map(|(i, _)| {
            let (score, end) = find_best_orientation(edges, i, config);
            (score > config.l2_contrast_threshold).then_some(ContrastLine {
                start: i,
                end,
                score,
            })
        })
        .collect()
}
