//! Utility functions for the table grid extractor.
//!
//! This module provides image loading, cropping and rotation helpers, and the
//! debug image sink.

pub mod debug;
pub mod image;

pub use debug::DebugSink;
pub use image::{
    crop_region, deskew_gray, deskew_rgb, load_image, rethreshold, rotate_quarter_ccw,
    rotate_quarter_cw,
};
