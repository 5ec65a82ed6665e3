//! Rationalization of contrast candidates and mask painting.

use crate::core::constants::{HORIZONTAL_CONTRAST_CUTOFF, VERTICAL_CONTRAST_CUTOFF};
use crate::core::errors::{DetectionStage, TableGridError, TableGridResult};
use crate::domain::{Axis, ContrastLine, LineMask};

/// Reduces candidates (ordered by `start`) to one line per cluster.
///
/// Candidates scoring at or below a fraction of the best score (0.8 for
/// horizontal, 0.7 for vertical) are discarded first. The remaining ones are
/// split into runs wherever two consecutive starts are more than the merge
/// distance apart, and each run keeps its first highest-scoring candidate.
/// The merge distance grows with the position of the last candidate and
/// shrinks with the number of candidates.
///
/// # Errors
///
/// Returns `TableGridError::NoLinesDetected` when there are no candidates.
pub fn rationalize(lines: &[ContrastLine], axis: Axis) -> TableGridResult<Vec<ContrastLine>> {
    let Some(last) = lines.last() else {
        return Err(TableGridError::no_lines(axis, DetectionStage::ContrastSearch));
    };
    let merge_distance = if lines.len() < 10 {
        last.start / (5 * lines.len())
    } else {
        last.start / 50
    };
    let merge_distance = merge_distance as i64;

    let max_contrast = lines.iter().map(|l| l.score).fold(0.0, f64::max);
    let cutoff = max_contrast
        * match axis {
            Axis::Horizontal => HORIZONTAL_CONTRAST_CUTOFF,
            Axis::Vertical => VERTICAL_CONTRAST_CUTOFF,
        };
    let strong: Vec<&ContrastLine> = lines.iter().filter(|l| l.score > cutoff).collect();

    let mut kept = Vec::new();
    let mut previous_start = -100i64;
    let mut best: Option<&ContrastLine> = None;
    for &line in &strong {
        let start = line.start as i64;
        if previous_start + merge_distance < start
            && let Some(representative) = best.take()
        {
            kept.push(*representative);
        }
        if best.is_none_or(|b| line.score > b.score) {
            best = Some(line);
        }
        previous_start = start;
    }
    kept.extend(best.copied());

    tracing::debug!(
        target: "table_grid",
        %axis,
        candidates = lines.len(),
        strong = strong.len(),
        kept = kept.len(),
        merge_distance,
        "contrast lines rationalized"
    );
    Ok(kept)
}

/// Paints each line's `start` as a one pixel wide full-length line.
///
/// Lines are consumed in order while scanning positions, so `lines` must be
/// sorted by `start`.
pub fn paint_lines(lines: &[ContrastLine], axis: Axis, width: u32, height: u32) -> LineMask {
    let mut mask = LineMask::blank(axis, width, height);
    let mut pending = lines.iter().peekable();
    for position in 0..axis.cross_extent(width, height) {
        if pending.next_if(|l| l.start == position as usize).is_some() {
            mask.paint_full_line(position, 1);
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(start: usize, score: f64) -> ContrastLine {
        ContrastLine {
            start,
            end: start,
            score,
        }
    }

    #[test]
    fn test_empty_candidates_fail() {
        let err = rationalize(&[], Axis::Vertical).unwrap_err();
        assert!(matches!(
            err,
            TableGridError::NoLinesDetected {
                axis: Axis::Vertical,
                stage: DetectionStage::ContrastSearch
            }
        ));
    }

    #[test]
    fn test_keeps_strongest_per_cluster() {
        // 12 candidates, last at 200: merge distance 4.
        let lines = vec![
            line(48, 0.80),
            line(49, 0.95),
            line(50, 0.95),
            line(51, 0.90),
            line(120, 0.90),
            line(121, 0.92),
            line(122, 0.60),
            line(150, 0.50),
            line(197, 0.91),
            line(198, 0.91),
            line(199, 0.85),
            line(200, 0.90),
        ];
        let kept = rationalize(&lines, Axis::Horizontal).unwrap();
        assert_eq!(kept, vec![line(49, 0.95), line(121, 0.92), line(197, 0.91)]);
    }

    #[test]
    fn test_vertical_cutoff_is_looser() {
        let lines = vec![line(10, 1.0), line(100, 0.75)];
        assert_eq!(rationalize(&lines, Axis::Horizontal).unwrap().len(), 1);
        assert_eq!(rationalize(&lines, Axis::Vertical).unwrap().len(), 2);
    }

    #[test]
    fn test_few_lines_merge_distance() {
        // Two candidates, last at 100: merge distance 10.
        let lines = vec![line(90, 0.9), line(100, 1.0)];
        assert_eq!(
            rationalize(&lines, Axis::Horizontal).unwrap(),
            vec![line(100, 1.0)]
        );
        let lines = vec![line(89, 0.9), line(100, 1.0)];
        assert_eq!(rationalize(&lines, Axis::Horizontal).unwrap().len(), 2);
    }

    #[test]
    fn test_paint_lines() {
        let mask = paint_lines(&[line(2, 1.0), line(5, 1.0)], Axis::Vertical, 8, 4);
        assert_eq!(mask.line_pixel_count(), 8);
        assert!(mask.is_line(2, 0) && mask.is_line(5, 3));
        assert!(!mask.is_line(3, 0));

        let mask = paint_lines(&[line(1, 1.0)], Axis::Horizontal, 8, 4);
        assert_eq!(mask.line_pixel_count(), 8);
        assert!(mask.is_line(7, 1));
    }
}
