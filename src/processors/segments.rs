//! Horizontal segment extraction, clustering and line acceptance.
//!
//! Vertical lines are handled by the caller rotating the working image a
//! quarter turn, so everything here only ever sees horizontal runs.

use crate::domain::{LineGroup, LineSegment};
use image::GrayImage;

/// Parameters of the horizontal run search on an edge image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentParams {
    /// Shortest accepted `x2 - x1`.
    pub min_length: i32,
    /// Largest run of non-edge pixels bridged inside one segment.
    pub max_line_gap: i32,
    /// Minimum number of edge pixels in a segment.
    pub threshold: usize,
}

/// Extracts horizontal segments from a binary edge image, sorted by `(y1, x1)`.
///
/// Each row is scanned for runs of edge pixels; gaps of at most
/// `max_line_gap` background pixels do not break a run.
pub fn detect_segments(edges: &GrayImage, params: SegmentParams) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    let mut segments = Vec::new();

    for y in 0..height {
        let mut run: Option<(u32, u32, usize)> = None;
        for x in 0..width {
            if edges.get_pixel(x, y)[0] == 0 {
                continue;
            }
            run = match run {
                Some((start, last, count)) if (x - last - 1) as i32 <= params.max_line_gap => {
                    Some((start, x, count + 1))
                }
                Some(done) => {
                    push_run(&mut segments, done, y, params);
                    Some((x, x, 1))
                }
                None => Some((x, x, 1)),
            };
        }
        if let Some(done) = run {
            push_run(&mut segments, done, y, params);
        }
    }

    segments.sort_by_key(|s| (s.y1, s.x1));
    segments
}

fn push_run(
    segments: &mut Vec<LineSegment>,
    (start, end, count): (u32, u32, usize),
    y: u32,
    params: SegmentParams,
) {
    let length = (end - start) as i32;
    if length > 0 && length >= params.min_length && count >= params.threshold {
        segments.push(LineSegment::horizontal(start as i32, end as i32, y as i32));
    }
}

/// Which member of the open group a new segment is compared against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparePos {
    First,
    Last,
}

/// Greedy single-pass clustering of segments sorted by row.
///
/// A segment joins the open (last) group when its row is within `max_gap` of
/// the group's `compare` member. If it also lies entirely inside the x span of
/// the group's most recent segment it is dropped instead of appended.
/// Otherwise it opens a new group.
pub fn cluster(segments: &[LineSegment], max_gap: i32, compare: ComparePos) -> Vec<LineGroup> {
    let mut groups: Vec<LineGroup> = Vec::new();
    for segment in segments {
        let Some(group) = groups.last_mut() else {
            groups.push(vec![*segment]);
            continue;
        };
        let anchor = match compare {
            ComparePos::First => group[0],
            ComparePos::Last => group[group.len() - 1],
        };
        if (segment.y1 - anchor.y1).abs() <= max_gap {
            let newest = group[group.len() - 1];
            if !newest.spans(segment) {
                group.push(*segment);
            }
        } else {
            groups.push(vec![*segment]);
        }
    }
    groups
}

/// Keeps groups whose summed length reaches `min_line_scale * extent` and
/// which contain at least one segment longer than `min_segment_scale * extent`.
pub fn accept_groups(
    groups: Vec<LineGroup>,
    extent: u32,
    min_line_scale: f64,
    min_segment_scale: f64,
) -> Vec<LineGroup> {
    let extent = extent as f64;
    groups
        .into_iter()
        .filter(|group| {
            let total: i64 = group.iter().map(|s| s.length as i64).sum();
            let long = group
                .iter()
                .filter(|s| s.length as f64 > min_segment_scale * extent)
                .count();
            total as f64 >= min_line_scale * extent && long > 0
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    const PARAMS: SegmentParams = SegmentParams {
        min_length: 5,
        max_line_gap: 2,
        threshold: 4,
    };

    fn edges(width: u32, height: u32, on: &[(u32, u32)]) -> GrayImage {
        let mut image = GrayImage::new(width, height);
        for &(x, y) in on {
            image.put_pixel(x, y, Luma([255]));
        }
        image
    }

    #[test]
    fn test_detect_segments_bridges_small_gaps() {
        let mut on: Vec<(u32, u32)> = (2..10).map(|x| (x, 3)).collect();
        on.extend((12..20).map(|x| (x, 3)));
        // Gap of three pixels splits this row.
        on.extend((0..6).map(|x| (x, 7)));
        on.extend((9..16).map(|x| (x, 7)));
        let segments = detect_segments(&edges(30, 10, &on), PARAMS);
        assert_eq!(
            segments,
            vec![
                LineSegment::horizontal(2, 19, 3),
                LineSegment::horizontal(0, 5, 7),
                LineSegment::horizontal(9, 15, 7),
            ]
        );
    }

    #[test]
    fn test_detect_segments_applies_thresholds() {
        // Long but sparse: six pixels every third column.
        let sparse: Vec<(u32, u32)> = (0..6).map(|i| (i * 3, 1)).collect();
        // Short and dense.
        let short: Vec<(u32, u32)> = (0..4).map(|x| (x, 4)).collect();
        let mut on = sparse;
        on.extend(short);
        let params = SegmentParams {
            threshold: 7,
            ..PARAMS
        };
        assert!(detect_segments(&edges(30, 6, &on), params).is_empty());
        let found = detect_segments(&edges(30, 6, &on), PARAMS);
        assert_eq!(found, vec![LineSegment::horizontal(0, 15, 1)]);
    }

    #[test]
    fn test_cluster_single_group() {
        let segments = vec![
            LineSegment::horizontal(0, 40, 10),
            LineSegment::horizontal(50, 90, 11),
            LineSegment::horizontal(100, 140, 12),
        ];
        let groups = cluster(&segments, 3, ComparePos::First);
        assert_eq!(groups, vec![segments.clone()]);
    }

    #[test]
    fn test_cluster_splits_distant_rows() {
        let segments = vec![
            LineSegment::horizontal(0, 40, 10),
            LineSegment::horizontal(0, 40, 20),
            LineSegment::horizontal(0, 40, 30),
            LineSegment::horizontal(0, 40, 40),
        ];
        let groups = cluster(&segments, 3, ComparePos::Last);
        assert_eq!(groups.len(), 4);
    }

    #[test]
    fn test_cluster_drops_contained_segment() {
        let segments = vec![
            LineSegment::horizontal(0, 100, 10),
            LineSegment::horizontal(20, 60, 12),
            LineSegment::horizontal(90, 150, 12),
        ];
        let groups = cluster(&segments, 3, ComparePos::First);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0], vec![segments[0], segments[2]]);
    }

    #[test]
    fn test_cluster_compare_position() {
        // A staircase: each step is 2 rows below the previous one.
        let segments: Vec<LineSegment> = (0..4)
            .map(|i| LineSegment::horizontal(i * 50, i * 50 + 45, 10 + 2 * i))
            .collect();
        assert_eq!(cluster(&segments, 3, ComparePos::Last).len(), 1);
        assert_eq!(cluster(&segments, 3, ComparePos::First).len(), 2);
    }

    #[test]
    fn test_accept_groups_coverage() {
        let short = vec![LineSegment::horizontal(10, 150, 20)];
        let long = vec![
            LineSegment::horizontal(0, 150, 40),
            LineSegment::horizontal(160, 300, 41),
        ];
        let crumbs: LineGroup = (0..30)
            .map(|i| LineSegment::horizontal(i * 16, i * 16 + 10, 60))
            .collect();
        let accepted = accept_groups(vec![short, long.clone(), crumbs], 500, 0.4, 0.05);
        assert_eq!(accepted, vec![long]);
    }
}
