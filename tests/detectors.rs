mod common;

use common::{BLACK, dynamic, rotated, ruled_table, six_cell_table};
use oar_table_grid::core::config::{CellGridConfig, PixelContrastConfig};
use oar_table_grid::domain::Axis;
use oar_table_grid::prelude::*;
use oar_table_grid::processors::BinarizationMode;

fn detectors() -> Vec<Box<dyn LineDetector>> {
    vec![
        Box::new(MorphologicalLineDetector::default()),
        Box::new(MorphologicalLineDetector::default().with_mode(BinarizationMode::Adaptive)),
        Box::new(PixelContrastLineDetector::default()),
    ]
}

#[test]
fn six_cells_from_three_rows_and_four_columns() {
    let image = dynamic(six_cell_table());
    for detector in detectors() {
        let detection = detector
            .detect_all_cells(&image, None, &DebugSink::disabled())
            .unwrap_or_else(|e| panic!("{}: {e}", detector.name()));
        assert_eq!(detection.cells.len(), 6, "{}", detector.name());
        assert_eq!(detection.warning, "", "{}", detector.name());
        assert!(detection.skew_angle.abs() < 0.1, "{}", detector.name());

        let (width, height) = detection.horizontal.dimensions();
        assert_eq!((width, height), (500, 500));
        assert_eq!(detection.vertical.dimensions(), (500, 500));

        let layout = TableLayout::from_cells(&detection.cells, false, 0.0);
        assert_eq!(layout.row_count(), 2);
        assert_eq!(layout.column_count, 3);
    }
}

#[test]
fn repeated_detection_is_identical() {
    let image = dynamic(ruled_table(420, 300, &[30, 120, 210, 270], &[20, 200, 390], BLACK));
    for detector in detectors() {
        let sink = DebugSink::disabled();
        let first = detector.detect_all_cells(&image, None, &sink).unwrap();
        let second = detector.detect_all_cells(&image, None, &sink).unwrap();
        assert_eq!(first, second, "{}", detector.name());
    }
}

#[test]
fn pixel_contrast_axes_agree_sequential_and_parallel() {
    let image = dynamic(six_cell_table());
    let sink = DebugSink::disabled();
    let parallel = PixelContrastLineDetector::default()
        .detect_all_cells(&image, None, &sink)
        .unwrap();
    let sequential = PixelContrastLineDetector::new(
        PixelContrastConfig::default().with_concurrent_axes(false),
        CellGridConfig::default(),
    )
    .unwrap()
    .detect_all_cells(&image, None, &sink)
    .unwrap();
    assert_eq!(parallel.cells, sequential.cells);
    assert_eq!(parallel.horizontal, sequential.horizontal);
    assert_eq!(parallel.vertical, sequential.vertical);
}

#[test]
fn region_cells_are_relative_to_the_region() {
    let image = dynamic(six_cell_table());
    let sink = DebugSink::disabled();
    let full = PixelContrastLineDetector::default()
        .detect_all_cells(&image, None, &sink)
        .unwrap();
    let region = CellBBox::new(20, 30, 470, 460);
    let cropped = PixelContrastLineDetector::default()
        .detect_all_cells(&image, Some(region), &sink)
        .unwrap();
    assert_eq!(cropped.cells.len(), full.cells.len());
    for (a, b) in full.cells.iter().zip(&cropped.cells) {
        assert_eq!(a.x - 20, b.x);
        assert_eq!(a.y - 30, b.y);
        assert_eq!((a.width, a.height), (b.width, b.height));
    }
}

#[test]
fn region_outside_image_is_malformed() {
    let image = dynamic(six_cell_table());
    let region = CellBBox::new(600, 0, 50, 50);
    for detector in detectors() {
        let err = detector
            .detect_all_cells(&image, Some(region), &DebugSink::disabled())
            .unwrap_err();
        assert!(matches!(err, TableGridError::MalformedInput { .. }));
    }
}

// The skew pass only keeps staircase steps longer than 5% of the width. At 2
// degrees a step is about 28 px, so wider pages report undetectable skew.
fn skew_table() -> image::RgbImage {
    ruled_table(400, 400, &[40, 200, 360], &[20, 200, 380], BLACK)
}

#[test]
fn morphological_skew_sign_follows_rotation() {
    let table = skew_table();
    let detector = MorphologicalLineDetector::default();
    for degrees in [2.0, -2.0] {
        let gray = dynamic(rotated(&table, degrees)).to_luma8();
        let skew = detector.detect_image_skew(&detector.binarize(&gray));
        assert!(
            (skew.angle_degrees - degrees as f64).abs() < 0.2,
            "rotated {degrees}: got {}",
            skew.angle_degrees
        );
        assert!(skew.warning.starts_with("Skew detected: "));
    }
}

#[test]
fn pixel_contrast_skew_sign_follows_rotation() {
    let table = skew_table();
    let detector = PixelContrastLineDetector::default();
    // One orientation step moves a line end by `orientation_jump_i` pixels,
    // plus a pixel lost to truncation.
    let jump_i = detector.config().orientation_jump_i as f64;
    let tolerance = ((jump_i + 1.0) / table.width() as f64).atan().to_degrees();
    for degrees in [2.0, -2.0] {
        let rgb = rotated(&table, degrees);
        let horizontal = detector
            .detect_lines(&rgb, Axis::Horizontal, &DebugSink::disabled())
            .unwrap();
        let skew = detector.detect_image_skew(&horizontal.lines, rgb.width());
        assert!(
            (skew.angle_degrees - degrees as f64).abs() < tolerance,
            "rotated {degrees}: got {}, tolerance {tolerance}",
            skew.angle_degrees
        );
    }
}

#[test]
fn deskewed_morphological_cells_match_the_level_grid() {
    let table = six_cell_table();
    let sink = DebugSink::disabled();
    for mode in [BinarizationMode::Otsu, BinarizationMode::Adaptive] {
        let detector = MorphologicalLineDetector::default()
            .with_mode(mode)
            .with_deskew(true);
        let level = detector
            .detect_all_cells(&dynamic(table.clone()), None, &sink)
            .unwrap();
        assert_eq!(level.cells.len(), 6);

        for degrees in [2.0, -2.0] {
            let detection = detector
                .detect_all_cells(&dynamic(rotated(&table, degrees)), None, &sink)
                .unwrap_or_else(|e| panic!("{} at {degrees}: {e}", mode.name()));
            assert!(
                detection.skew_angle * (degrees as f64) > 0.0,
                "{} at {degrees}: skew {}",
                mode.name(),
                detection.skew_angle
            );
            assert_eq!(detection.cells.len(), 6, "{} at {degrees}", mode.name());
            for (got, want) in detection.cells.iter().zip(&level.cells) {
                for (a, b) in [
                    (got.x, want.x),
                    (got.y, want.y),
                    (got.width, want.width),
                    (got.height, want.height),
                ] {
                    assert!(
                        a.abs_diff(b) <= 4,
                        "{} at {degrees}: {got:?} vs {want:?}",
                        mode.name()
                    );
                }
            }
        }
    }
}

#[test]
fn deskewed_pixel_contrast_still_finds_cells() {
    let table = ruled_table(500, 500, &[60, 250, 440], &[25, 250, 475], BLACK);
    let image = dynamic(rotated(&table, 1.5));
    let detection = PixelContrastLineDetector::default()
        .with_deskew(true)
        .detect_all_cells(&image, None, &DebugSink::disabled())
        .unwrap();
    assert!(detection.skew_angle > 0.0);
    assert!(detection.warning.starts_with("Skew detected: "));
    assert_eq!(detection.cells.len(), 4);
}

#[test]
fn debug_images_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let sink = DebugSink::new(dir.path().join("call-1"));
    let image = dynamic(six_cell_table());
    MorphologicalLineDetector::default()
        .detect_all_cells(&image, None, &sink)
        .unwrap();
    PixelContrastLineDetector::default()
        .detect_all_cells(&image, None, &sink)
        .unwrap();
    for name in [
        "img_bin",
        "image_h1",
        "image_v1",
        "image_h_re-drawn",
        "image_v_re-drawn",
        "rgb_hori",
        "rgb_vert",
        "img_vh",
        "boxes",
    ] {
        assert!(
            dir.path().join("call-1").join(format!("{name}.png")).exists(),
            "{name}.png missing"
        );
    }
}
