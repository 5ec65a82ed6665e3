//! Synthetic table images shared by the integration tests.

#![allow(dead_code)]

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};
use imageproc::rect::Rect;

pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

/// White page with a grid of ruling lines three pixels thick. Horizontal lines
/// run from the first to the last column and vertical lines from the first to
/// the last row.
pub fn ruled_table(width: u32, height: u32, rows: &[u32], cols: &[u32], ink: Rgb<u8>) -> RgbImage {
    let mut image = RgbImage::from_pixel(width, height, WHITE);
    let left = cols[0];
    let right = cols[cols.len() - 1] + 3;
    let top = rows[0];
    let bottom = rows[rows.len() - 1] + 3;
    for &row in rows {
        draw_filled_rect_mut(&mut image, Rect::at(left as i32, row as i32).of_size(right - left, 3), ink);
    }
    for &col in cols {
        draw_filled_rect_mut(&mut image, Rect::at(col as i32, top as i32).of_size(3, bottom - top), ink);
    }
    image
}

/// The 500x500 page with three horizontal and four vertical lines.
pub fn six_cell_table() -> RgbImage {
    ruled_table(500, 500, &[50, 250, 450], &[50, 183, 316, 449], BLACK)
}

pub fn dynamic(image: RgbImage) -> DynamicImage {
    DynamicImage::ImageRgb8(image)
}

/// Rotates clockwise (right side down) by `degrees`, filling with white.
pub fn rotated(image: &RgbImage, degrees: f32) -> RgbImage {
    rotate_about_center(image, degrees.to_radians(), Interpolation::Bilinear, WHITE)
}
