//! Default parameters for ruling line detection.
//!
//! These are the values used by the `Default` implementations of the
//! configuration structs; every one of them can be overridden per call.

// Morphological path.

/// Minimum fraction of the line extent a line group must cover to be kept.
pub const DEFAULT_MIN_LINE_SCALE: f64 = 0.4;

/// Fraction of the line extent a single segment must exceed for its group to
/// count as a ruling line rather than text or noise.
pub const DEFAULT_MIN_SEGMENT_SCALE: f64 = 0.05;

/// Minimum number of edge pixels a segment must contain (Hough vote threshold).
pub const DEFAULT_HOUGH_THRESHOLD: usize = 10;

/// Divisor of the image height giving the minimum segment length.
pub const HOUGH_MIN_LINE_LENGTH_DIVISOR: u32 = 50;

/// Divisor of the image width giving the largest gap bridged inside a segment.
pub const HOUGH_MAX_LINE_GAP_DIVISOR: u32 = 80;

/// Canny hysteresis thresholds.
pub const DEFAULT_CANNY_LOW: f32 = 50.0;
pub const DEFAULT_CANNY_HIGH: f32 = 150.0;

/// Adaptive threshold window (pixels, odd) and the constant subtracted from
/// the local mean.
pub const DEFAULT_ADAPTIVE_BLOCK_SIZE: u32 = 15;
pub const DEFAULT_ADAPTIVE_C: f64 = 35.0;

/// Largest row distance between segments clustered into one line.
pub const DEFAULT_MAX_GAP: i32 = 3;

/// Row distance used by the relaxed pass that measures skew.
pub const DEFAULT_SKEW_MAX_GAP: i32 = 1;

/// Thickness of lines painted into the morphological masks.
pub const MASK_LINE_THICKNESS: u32 = 2;

/// Skew magnitudes above this many degrees are reported as a warning.
pub const DEFAULT_SKEW_WARNING_DEGREES: f64 = 0.1;

// Pixel-contrast path.

/// Squared RGB distance (divided by 255) above which two neighbouring pixels
/// are considered to form an edge.
pub const DEFAULT_DIFF_THRESHOLD: f64 = 50.0;

/// Rows (or columns) scanned together when computing the first-pass contrast
/// vector.
pub const DEFAULT_L1_CONVOLUTION_SIZE: usize = 3;

/// Leading fraction of each line inspected by the first pass.
pub const DEFAULT_L1_CONTRAST_LINE_PORTION: f64 = 0.5;

/// First-pass contrast ratio a position must exceed to become a candidate.
pub const DEFAULT_L1_CONTRAST_THRESHOLD: f64 = 0.3;

/// Window used by the convolution contrast method during orientation search.
pub const DEFAULT_L2_CONVOLUTION_SIZE: usize = 3;

/// Best-orientation score a candidate must exceed to be kept.
pub const DEFAULT_L2_CONTRAST_THRESHOLD: f64 = 0.4;

/// Pixel drift added per orientation step, measured at the far end of a line.
pub const DEFAULT_ORIENTATION_JUMP_I: usize = 4;

/// Orientation steps searched on each side of the level orientation.
pub const DEFAULT_ORIENTATION_JUMP_STEPS: usize = 5;

/// Fraction of the strongest candidate's score a candidate must exceed to
/// survive rationalization.
pub const HORIZONTAL_CONTRAST_CUTOFF: f64 = 0.80;
pub const VERTICAL_CONTRAST_CUTOFF: f64 = 0.70;

// Cell grid.

/// A cell must be wider than `width / DEFAULT_MIN_CELL_WIDTH_DIVISOR`.
pub const DEFAULT_MIN_CELL_WIDTH_DIVISOR: u32 = 30;

/// A cell must be at least `height / DEFAULT_MIN_CELL_HEIGHT_DIVISOR` tall.
pub const DEFAULT_MIN_CELL_HEIGHT_DIVISOR: u32 = 50;

/// Token texts starting with one of these characters are table borders
/// misread as text and are not masked out.
pub const BORDER_LIKE_TOKEN_PREFIXES: [char; 3] = ['[', '|', '('];
