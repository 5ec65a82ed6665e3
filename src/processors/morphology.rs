//! Binarization and directional binary morphology.
//!
//! All binary images produced here are inverted: ink is 255, paper is 0.

use crate::domain::Axis;
use image::{GrayImage, Luma};
use imageproc::contrast::otsu_level;
use imageproc::integral_image::{integral_image, sum_image_pixels};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};

/// Binarizes `gray` with a global Otsu threshold, inverted.
pub fn binarize_otsu(gray: &GrayImage) -> GrayImage {
    let level = otsu_level(gray);
    tracing::trace!(target: "table_grid", level, "otsu threshold");
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] <= level {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Binarizes `gray` against the local mean of a `block_size` window minus `c`,
/// inverted. The window is clipped at the image border.
pub fn binarize_adaptive(gray: &GrayImage, block_size: u32, c: f64) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }
    let integral = integral_image::<_, u64>(gray);
    let half = block_size / 2;

    GrayImage::from_fn(width, height, |x, y| {
        let left = x.saturating_sub(half);
        let top = y.saturating_sub(half);
        let right = (x + half).min(width - 1);
        let bottom = (y + half).min(height - 1);

        let area = ((right - left + 1) as u64 * (bottom - top + 1) as u64) as f64;
        let sum = sum_image_pixels(&integral, left, top, right, bottom)[0];
        let threshold = sum as f64 / area - c;

        if gray.get_pixel(x, y)[0] as f64 <= threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}

/// Structuring element length for lines spanning `extent` pixels.
pub fn kernel_length(extent: u32) -> usize {
    let len = match extent {
        0..=100 => 3,
        101..=150 => extent / 25,
        151..=500 => extent / 50,
        501..=1500 => extent / 100,
        _ => extent / 200,
    };
    len.max(1) as usize
}

/// Longest line kernel a [`Mask`] can hold.
const MAX_KERNEL_LENGTH: usize = 511;

/// A `1 x len` line kernel oriented along `axis`, anchored at `len / 2`.
fn line_mask(axis: Axis, len: usize) -> Mask {
    let len = len.clamp(1, MAX_KERNEL_LENGTH) as u32;
    let anchor = (len / 2) as u8;
    match axis {
        Axis::Horizontal => Mask::from_image(&GrayImage::from_pixel(len, 1, Luma([255])), anchor, 0),
        Axis::Vertical => Mask::from_image(&GrayImage::from_pixel(1, len, Luma([255])), 0, anchor),
    }
}

/// Erodes `image` with a `1 x len` line kernel oriented along `axis`.
///
/// Pixels outside the image never take part: only the part of the window
/// inside the image has to be foreground.
pub fn erode_along(image: &GrayImage, axis: Axis, len: usize, iterations: usize) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let mask = line_mask(axis, len);
    (0..iterations).fold(image.clone(), |current, _| grayscale_erode(&current, &mask))
}

/// Dilates `image` with a `1 x len` line kernel oriented along `axis`.
pub fn dilate_along(image: &GrayImage, axis: Axis, len: usize, iterations: usize) -> GrayImage {
    if image.width() == 0 || image.height() == 0 {
        return image.clone();
    }
    let mask = line_mask(axis, len);
    (0..iterations).fold(image.clone(), |current, _| grayscale_dilate(&current, &mask))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::rotate_quarter_cw;

    fn row_mask(width: u32, height: u32, row: u32, from: u32, to: u32) -> GrayImage {
        GrayImage::from_fn(width, height, |x, y| {
            if y == row && (from..to).contains(&x) {
                Luma([255])
            } else {
                Luma([0])
            }
        })
    }

    #[test]
    fn test_kernel_length_bands() {
        assert_eq!(kernel_length(80), 3);
        assert_eq!(kernel_length(100), 3);
        assert_eq!(kernel_length(150), 6);
        assert_eq!(kernel_length(500), 10);
        assert_eq!(kernel_length(1500), 15);
        assert_eq!(kernel_length(3000), 15);
    }

    #[test]
    fn test_erosion_removes_short_runs() {
        let mut image = row_mask(40, 3, 1, 2, 30);
        // A three pixel blob on another row.
        for x in 5..8 {
            image.put_pixel(x, 0, Luma([255]));
        }
        let eroded = erode_along(&image, Axis::Horizontal, 5, 1);
        assert_eq!(eroded.get_pixel(5, 0)[0], 0);
        assert_eq!(eroded.get_pixel(15, 1)[0], 255);
        // The run shrinks by the kernel's half-widths at each end.
        assert_eq!(eroded.get_pixel(3, 1)[0], 0);
        assert_eq!(eroded.get_pixel(4, 1)[0], 255);
        assert_eq!(eroded.get_pixel(27, 1)[0], 255);
        assert_eq!(eroded.get_pixel(28, 1)[0], 0);
    }

    #[test]
    fn test_erode_then_dilate_restores_long_runs() {
        let image = row_mask(60, 4, 2, 10, 50);
        let eroded = erode_along(&image, Axis::Horizontal, 5, 2);
        let opened = dilate_along(&eroded, Axis::Horizontal, 5, 2);
        assert_eq!(opened, image);
    }

    #[test]
    fn test_vertical_kernel_ignores_horizontal_lines() {
        let image = row_mask(30, 30, 10, 0, 30);
        let eroded = erode_along(&image, Axis::Vertical, 3, 1);
        assert!(eroded.pixels().all(|p| p[0] == 0));
    }

    #[test]
    fn test_otsu_inverts_ink() {
        let gray = GrayImage::from_fn(20, 20, |x, _| if x < 5 { Luma([10]) } else { Luma([240]) });
        let binary = binarize_otsu(&gray);
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(10, 0)[0], 0);
    }

    #[test]
    fn test_adaptive_keeps_thin_dark_lines() {
        let gray = GrayImage::from_fn(40, 40, |_, y| if y == 20 { Luma([0]) } else { Luma([255]) });
        let binary = binarize_adaptive(&gray, 15, 35.0);
        assert_eq!(binary.get_pixel(20, 20)[0], 255);
        assert_eq!(binary.get_pixel(20, 10)[0], 0);
        assert_eq!(binary.get_pixel(20, 21)[0], 0);
    }

    #[test]
    fn test_erosion_clips_window_at_border() {
        let image = row_mask(20, 1, 0, 0, 10);
        let eroded = erode_along(&image, Axis::Horizontal, 5, 1);
        assert_eq!(eroded.get_pixel(0, 0)[0], 255);
        assert_eq!(eroded.get_pixel(7, 0)[0], 255);
        assert_eq!(eroded.get_pixel(8, 0)[0], 0);

        let column = rotate_quarter_cw(&image);
        let eroded = erode_along(&column, Axis::Vertical, 5, 1);
        assert_eq!(eroded, rotate_quarter_cw(&erode_along(&image, Axis::Horizontal, 5, 1)));
    }

    #[test]
    fn test_single_pixel_kernel_is_identity() {
        let image = row_mask(12, 4, 2, 3, 9);
        assert_eq!(erode_along(&image, Axis::Horizontal, 1, 2), image);
        assert_eq!(dilate_along(&image, Axis::Vertical, 1, 2), image);
    }

    #[test]
    fn test_adaptive_window_is_clipped_at_corners() {
        let mut gray = GrayImage::from_pixel(30, 30, Luma([200]));
        gray.put_pixel(0, 0, Luma([0]));
        let binary = binarize_adaptive(&gray, 15, 35.0);
        assert_eq!(binary.get_pixel(0, 0)[0], 255);
        assert_eq!(binary.get_pixel(1, 1)[0], 0);
        assert_eq!(binary.get_pixel(29, 29)[0], 0);
    }
}
