//! Optional dump of intermediate images.
//!
//! When enabled, detectors write the binarized input, the raw and re-drawn
//! line masks and the final cell boxes as PNG files into a caller-supplied
//! folder. Write failures are logged and never abort detection.

use crate::core::config::DebugConfig;
use crate::domain::CellBBox;
use image::{GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::path::{Path, PathBuf};

const CELL_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Destination for debug images. The default sink discards everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugSink {
    folder: Option<PathBuf>,
}

impl DebugSink {
    /// A sink that writes nothing.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// A sink writing into `folder`, created on first use.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: Some(folder.into()),
        }
    }

    pub fn from_config(config: &DebugConfig) -> Self {
        match (&config.temp_folder, config.enabled) {
            (Some(folder), true) => Self::new(folder.clone()),
            _ => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.folder.is_some()
    }

    pub fn folder(&self) -> Option<&Path> {
        self.folder.as_deref()
    }

    pub fn save_gray(&self, name: &str, image: &GrayImage) {
        if let Some(path) = self.target(name) {
            self.report(name, image.save(&path).map_err(|e| e.to_string()));
        }
    }

    pub fn save_rgb(&self, name: &str, image: &RgbImage) {
        if let Some(path) = self.target(name) {
            self.report(name, image.save(&path).map_err(|e| e.to_string()));
        }
    }

    /// Draws `cells` as red rectangles over `base` and saves the result.
    pub fn save_cells(&self, name: &str, base: &RgbImage, cells: &[CellBBox]) {
        if !self.is_enabled() {
            return;
        }
        let mut canvas = base.clone();
        for cell in cells {
            if cell.width == 0 || cell.height == 0 {
                continue;
            }
            let rect = Rect::at(cell.x as i32, cell.y as i32).of_size(cell.width, cell.height);
            draw_hollow_rect_mut(&mut canvas, rect, CELL_COLOR);
        }
        self.save_rgb(name, &canvas);
    }

    fn target(&self, name: &str) -> Option<PathBuf> {
        let folder = self.folder.as_ref()?;
        if let Err(e) = std::fs::create_dir_all(folder) {
            tracing::warn!(
                target: "table_grid",
                folder = %folder.display(),
                error = %e,
                "cannot create debug folder"
            );
            return None;
        }
        Some(folder.join(format!("{name}.png")))
    }

    fn report(&self, name: &str, result: Result<(), String>) {
        match result {
            Ok(()) => tracing::trace!(target: "table_grid", name, "debug image written"),
            Err(error) => {
                tracing::warn!(target: "table_grid", name, %error, "failed to write debug image")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn test_disabled_sink_writes_nothing() {
        let sink = DebugSink::from_config(&DebugConfig::default());
        assert!(!sink.is_enabled());
        sink.save_gray("img_bin", &GrayImage::new(4, 4));
    }

    #[test]
    fn test_writes_png_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DebugSink::from_config(&DebugConfig::enabled_in(dir.path().join("dbg")));
        sink.save_gray("img_bin", &GrayImage::from_pixel(8, 8, Luma([255])));
        sink.save_cells(
            "boxes",
            &RgbImage::new(20, 20),
            &[CellBBox::new(2, 2, 10, 5), CellBBox::new(0, 0, 0, 3)],
        );
        assert_eq!(sink.folder(), Some(dir.path().join("dbg").as_path()));
        assert!(dir.path().join("dbg/img_bin.png").exists());
        let boxes = image::open(dir.path().join("dbg/boxes.png")).unwrap().to_rgb8();
        assert_eq!(*boxes.get_pixel(2, 2), CELL_COLOR);
        assert_eq!(*boxes.get_pixel(5, 4), Rgb([0, 0, 0]));
    }
}
