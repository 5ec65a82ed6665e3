//! Page skew estimation from detected ruling lines.

use crate::core::errors::{TableGridError, TableGridResult};
use crate::domain::{ContrastLine, LineGroup, SkewEstimate};

/// Estimates skew from horizontal line groups found by a relaxed clustering
/// pass, where one slanted ruling line forms one staircase-shaped group.
///
/// The first two groups are ignored when there are more than three (header
/// artifacts). The row offset between the first and last member of each group
/// is averaged, rounded half-to-even and reduced by one pixel of line
/// thickness when positive. The sign is decided by a majority vote on whether
/// each group's last member starts to the right of its first.
///
/// # Errors
///
/// Returns `TableGridError::SkewUndetectable` when there is no group to
/// measure or the image has no width.
pub fn estimate_from_groups(
    groups: &[LineGroup],
    width: u32,
    warn_above: f64,
) -> TableGridResult<SkewEstimate> {
    if width == 0 {
        return Err(TableGridError::skew_undetectable("image has no width"));
    }
    let start = if groups.len() > 3 { 2 } else { 0 };
    let measured: Vec<&LineGroup> = groups[start..].iter().filter(|g| !g.is_empty()).collect();
    if measured.is_empty() {
        return Err(TableGridError::skew_undetectable(
            "no horizontal lines detected",
        ));
    }

    let total: i64 = measured
        .iter()
        .map(|g| (g[g.len() - 1].y1 - g[0].y1) as i64)
        .sum();
    let mut px_diff = (total as f64 / measured.len() as f64).round_ties_even();
    if px_diff > 0.0 {
        px_diff -= 1.0;
    }
    let magnitude = (px_diff / width as f64).atan().to_degrees();

    let votes = measured
        .iter()
        .filter(|g| g[g.len() - 1].x1 > g[0].x1)
        .count();
    let angle = if votes as f64 > measured.len() as f64 / 2.0 {
        magnitude
    } else {
        -magnitude
    };

    tracing::debug!(
        target: "table_grid",
        groups = measured.len(),
        px_diff,
        votes,
        angle,
        "skew from line groups"
    );
    Ok(SkewEstimate::from_angle(angle, warn_above))
}

/// Estimates skew from pixel-contrast lines: the mean absolute drift between
/// each line's two ends against the image `width`, signed by majority vote on
/// the drift direction.
///
/// # Errors
///
/// Returns `TableGridError::SkewUndetectable` when `lines` is empty or the
/// image has no width.
pub fn estimate_from_contrast_lines(
    lines: &[ContrastLine],
    width: u32,
    warn_above: f64,
) -> TableGridResult<SkewEstimate> {
    if lines.is_empty() || width == 0 {
        return Err(TableGridError::skew_undetectable(
            "no horizontal lines detected",
        ));
    }
    let mean = lines.iter().map(|l| l.drift()).sum::<i64>() as f64 / lines.len() as f64;
    let magnitude = (mean.abs() / width as f64).atan().to_degrees();
    let downward = lines.iter().filter(|l| l.drift() > 0).count();
    let angle = if downward as f64 > lines.len() as f64 / 2.0 {
        magnitude
    } else {
        -magnitude
    };
    Ok(SkewEstimate::from_angle(angle, warn_above))
}
