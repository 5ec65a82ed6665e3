//! Utility functions for image handling.
//!
//! This module provides loading, cropping, quarter-turn rotation
//! and deskewing helpers used by both line detectors.

use crate::core::errors::{TableGridError, TableGridResult};
use crate::domain::CellBBox;
use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage, imageops};
use imageproc::geometric_transformations::{Interpolation, rotate_about_center};

/// Loads an image from a file path.
///
/// # Errors
///
/// Returns `TableGridError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &std::path::Path) -> TableGridResult<DynamicImage> {
    Ok(image::open(path)?)
}

/// Crops `image` to `region`, clamping the region to the image bounds.
///
/// `None` returns a copy of the whole image.
///
/// # Errors
///
/// Returns `TableGridError::MalformedInput` if the image is empty or the
/// clamped region has no pixels.
pub fn crop_region(image: &DynamicImage, region: Option<CellBBox>) -> TableGridResult<DynamicImage> {
    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(TableGridError::malformed(format!(
            "image is empty ({width}x{height})"
        )));
    }
    let Some(region) = region else {
        return Ok(image.clone());
    };
    let clamped = region.clamp_to(width, height).ok_or_else(|| {
        TableGridError::malformed(format!(
            "region {region:?} lies outside the {width}x{height} image"
        ))
    })?;
    Ok(image.crop_imm(clamped.x, clamped.y, clamped.width, clamped.height))
}

/// Rotates a gray image a quarter turn counter-clockwise.
///
/// Vertical ruling lines become horizontal, with the image's left column
/// becoming its bottom row.
pub fn rotate_quarter_ccw(image: &GrayImage) -> GrayImage {
    imageops::rotate270(image)
}

/// Undoes [`rotate_quarter_ccw`].
pub fn rotate_quarter_cw(image: &GrayImage) -> GrayImage {
    imageops::rotate90(image)
}

/// Rotates a gray image about its center by `angle_degrees`, counter-clockwise
/// for positive angles, filling uncovered pixels with `fill`.
pub fn deskew_gray(image: &GrayImage, angle_degrees: f64, fill: u8) -> GrayImage {
    if angle_degrees == 0.0 {
        return image.clone();
    }
    // imageproc turns clockwise for positive theta.
    let theta = (-angle_degrees).to_radians() as f32;
    rotate_about_center(image, theta, Interpolation::Bicubic, Luma([fill]))
}

/// RGB counterpart of [`deskew_gray`]; uncovered pixels become white.
pub fn deskew_rgb(image: &RgbImage, angle_degrees: f64) -> RgbImage {
    if angle_degrees == 0.0 {
        return image.clone();
    }
    let theta = (-angle_degrees).to_radians() as f32;
    rotate_about_center(image, theta, Interpolation::Bicubic, Rgb([255, 255, 255]))
}

/// Forces every pixel of a resampled binary image back to 0 or 255.
pub fn rethreshold(image: &mut GrayImage) {
    for pixel in image.pixels_mut() {
        pixel[0] = if pixel[0] >= 128 { 255 } else { 0 };
    }
}
