//! Configuration for the line detectors and the cell grid reconstructor.
//!
//! Every struct deserializes with per-field defaults and rejects unknown keys,
//! so a partial JSON document only needs to name what it overrides.

use super::errors::{ConfigError, ConfigValidator};
use crate::core::constants::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Scoring method used by the pixel-contrast orientation search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContrastMethod {
    /// Fixed-size window match at each angular offset.
    #[serde(alias = "convolution_contrast_method")]
    Convolution,
    /// Single-pixel match that may drift by one position per step.
    #[serde(alias = "adaptive_contrast_method")]
    Adaptive,
}

/// Which line detector to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineDetectionMethod {
    /// Raw RGB contrast with orientation search.
    #[serde(alias = "rgb_line_detect")]
    PixelContrast,
    /// Binarization, directional morphology and segment detection.
    #[serde(alias = "opencv_line_detect")]
    Morphological,
}

impl std::fmt::Display for LineDetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineDetectionMethod::PixelContrast => write!(f, "pixel_contrast"),
            LineDetectionMethod::Morphological => write!(f, "morphological"),
        }
    }
}

/// Parameters of the morphological line detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MorphologicalConfig {
    /// Fraction of the line extent a group must cover (default: 0.4).
    pub min_line_scale: f64,
    /// Fraction of the line extent one segment of the group must exceed (default: 0.05).
    pub min_segment_scale: f64,
    /// Minimum edge pixels per segment (default: 10).
    pub hough_threshold: usize,
    /// Canny low threshold (default: 50).
    pub canny_low: f32,
    /// Canny high threshold (default: 150).
    pub canny_high: f32,
    /// Adaptive threshold window, odd (default: 15).
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean (default: 35).
    pub adaptive_c: f64,
    /// Clustering distance for line detection (default: 3).
    pub max_gap: i32,
    /// Clustering distance for the skew pass (default: 1).
    pub skew_max_gap: i32,
    /// Skew warning threshold in degrees (default: 0.1).
    pub skew_warning_degrees: f64,
}

impl Default for MorphologicalConfig {
    fn default() -> Self {
        Self {
            min_line_scale: DEFAULT_MIN_LINE_SCALE,
            min_segment_scale: DEFAULT_MIN_SEGMENT_SCALE,
            hough_threshold: DEFAULT_HOUGH_THRESHOLD,
            canny_low: DEFAULT_CANNY_LOW,
            canny_high: DEFAULT_CANNY_HIGH,
            adaptive_block_size: DEFAULT_ADAPTIVE_BLOCK_SIZE,
            adaptive_c: DEFAULT_ADAPTIVE_C,
            max_gap: DEFAULT_MAX_GAP,
            skew_max_gap: DEFAULT_SKEW_MAX_GAP,
            skew_warning_degrees: DEFAULT_SKEW_WARNING_DEGREES,
        }
    }
}

impl MorphologicalConfig {
    pub fn with_min_line_scale(mut self, scale: f64) -> Self {
        self.min_line_scale = scale;
        self
    }

    pub fn with_min_segment_scale(mut self, scale: f64) -> Self {
        self.min_segment_scale = scale;
        self
    }

    pub fn with_max_gap(mut self, max_gap: i32) -> Self {
        self.max_gap = max_gap;
        self
    }

    pub fn with_adaptive_threshold(mut self, block_size: u32, c: f64) -> Self {
        self.adaptive_block_size = block_size;
        self.adaptive_c = c;
        self
    }
}

impl ConfigValidator for MorphologicalConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_fraction("min_line_scale", self.min_line_scale)?;
        self.validate_fraction("min_segment_scale", self.min_segment_scale)?;
        self.validate_positive("hough_threshold", self.hough_threshold)?;
        self.validate_non_negative("adaptive_c", self.adaptive_c)?;
        self.validate_non_negative("skew_warning_degrees", self.skew_warning_degrees)?;
        if self.adaptive_block_size < 3 || self.adaptive_block_size % 2 == 0 {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "adaptive_block_size must be odd and at least 3, got {}",
                    self.adaptive_block_size
                ),
            });
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(ConfigError::InvalidConfig {
                message: format!(
                    "canny thresholds must satisfy 0 <= low <= high, got {} / {}",
                    self.canny_low, self.canny_high
                ),
            });
        }
        if self.max_gap < 0 || self.skew_max_gap < 0 {
            return Err(ConfigError::InvalidConfig {
                message: "clustering gaps must not be negative".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Parameters of the pixel-contrast line detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelContrastConfig {
    /// Edge threshold on the squared RGB distance / 255 (default: 50).
    pub diff_threshold: f64,
    /// First-pass window (default: 3).
    pub l1_convolution_size: usize,
    /// Leading fraction of each line scanned by the first pass (default: 0.5).
    pub l1_contrast_line_portion: f64,
    /// First-pass candidate threshold (default: 0.3).
    pub l1_contrast_threshold: f64,
    /// Convolution method window (default: 3).
    pub l2_convolution_size: usize,
    /// Orientation search acceptance threshold (default: 0.4).
    pub l2_contrast_threshold: f64,
    /// Drift per orientation step in pixels (default: 4).
    pub orientation_jump_i: usize,
    /// Orientation steps per side (default: 5).
    pub orientation_jump_steps: usize,
    /// One or two distinct scoring methods (default: convolution).
    pub contrast_methods: Vec<ContrastMethod>,
    /// Run the two axes on separate workers (default: true).
    pub concurrent_axes: bool,
    /// Skew warning threshold in degrees (default: 0.1).
    pub skew_warning_degrees: f64,
}

impl Default for PixelContrastConfig {
    fn default() -> Self {
        Self {
            diff_threshold: DEFAULT_DIFF_THRESHOLD,
            l1_convolution_size: DEFAULT_L1_CONVOLUTION_SIZE,
            l1_contrast_line_portion: DEFAULT_L1_CONTRAST_LINE_PORTION,
            l1_contrast_threshold: DEFAULT_L1_CONTRAST_THRESHOLD,
            l2_convolution_size: DEFAULT_L2_CONVOLUTION_SIZE,
            l2_contrast_threshold: DEFAULT_L2_CONTRAST_THRESHOLD,
            orientation_jump_i: DEFAULT_ORIENTATION_JUMP_I,
            orientation_jump_steps: DEFAULT_ORIENTATION_JUMP_STEPS,
            contrast_methods: vec![ContrastMethod::Convolution],
            concurrent_axes: true,
            skew_warning_degrees: DEFAULT_SKEW_WARNING_DEGREES,
        }
    }
}

impl PixelContrastConfig {
    pub fn with_contrast_methods(mut self, methods: Vec<ContrastMethod>) -> Self {
        self.contrast_methods = methods;
        self
    }

    pub fn with_concurrent_axes(mut self, concurrent: bool) -> Self {
        self.concurrent_axes = concurrent;
        self
    }

    pub fn with_orientation_search(mut self, jump_i: usize, jump_steps: usize) -> Self {
        self.orientation_jump_i = jump_i;
        self.orientation_jump_steps = jump_steps;
        self
    }

    pub fn with_diff_threshold(mut self, threshold: f64) -> Self {
        self.diff_threshold = threshold;
        self
    }

    /// Whether `method` takes part in scoring.
    pub fn uses(&self, method: ContrastMethod) -> bool {
        self.contrast_methods.contains(&method)
    }
}

impl ConfigValidator for PixelContrastConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.contrast_methods.as_slice() {
            [_] => {}
            [a, b] if a != b => {}
            _ => {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "contrast_methods must list one or two distinct methods, got {:?}",
                        self.contrast_methods
                    ),
                });
            }
        }
        self.validate_non_negative("diff_threshold", self.diff_threshold)?;
        self.validate_positive("l1_convolution_size", self.l1_convolution_size)?;
        self.validate_positive("l2_convolution_size", self.l2_convolution_size)?;
        self.validate_positive("orientation_jump_i", self.orientation_jump_i)?;
        self.validate_fraction("l1_contrast_line_portion", self.l1_contrast_line_portion)?;
        self.validate_non_negative("l1_contrast_threshold", self.l1_contrast_threshold)?;
        self.validate_non_negative("l2_contrast_threshold", self.l2_contrast_threshold)?;
        self.validate_non_negative("skew_warning_degrees", self.skew_warning_degrees)?;
        if self.l1_contrast_threshold >= 1.0 || self.l2_contrast_threshold >= 1.0 {
            return Err(ConfigError::InvalidConfig {
                message: "contrast thresholds must be below 1.0".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Minimum cell size accepted by the cell grid reconstructor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CellGridConfig {
    /// Cells must be wider than `width / min_cell_width_divisor` (default: 30).
    pub min_cell_width_divisor: u32,
    /// Cells must be at least `height / min_cell_height_divisor` tall (default: 50).
    pub min_cell_height_divisor: u32,
}

impl Default for CellGridConfig {
    fn default() -> Self {
        Self {
            min_cell_width_divisor: DEFAULT_MIN_CELL_WIDTH_DIVISOR,
            min_cell_height_divisor: DEFAULT_MIN_CELL_HEIGHT_DIVISOR,
        }
    }
}

impl ConfigValidator for CellGridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive("min_cell_width_divisor", self.min_cell_width_divisor as usize)?;
        self.validate_positive(
            "min_cell_height_divisor",
            self.min_cell_height_divisor as usize,
        )
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Where intermediate images are written when debugging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebugConfig {
    pub enabled: bool,
    /// Caller-supplied folder, unique per call.
    pub temp_folder: Option<PathBuf>,
}

impl DebugConfig {
    pub fn enabled_in(folder: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            temp_folder: Some(folder.into()),
        }
    }
}

impl ConfigValidator for DebugConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.temp_folder.is_none() {
            return Err(ConfigError::InvalidConfig {
                message: "debug output is enabled but no temp_folder was given".to_string(),
            });
        }
        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

/// Top-level configuration of the bordered table cell extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableGridConfig {
    /// Methods to run. One method falls back to the other on failure; two run
    /// both and keep the result with more cells (default: pixel contrast).
    pub line_detection_methods: Vec<LineDetectionMethod>,
    /// Straighten the image by the estimated skew before extracting lines.
    pub deskew_image: bool,
    pub morphological: MorphologicalConfig,
    pub pixel_contrast: PixelContrastConfig,
    pub cell_grid: CellGridConfig,
    pub debug: DebugConfig,
}

impl Default for TableGridConfig {
    fn default() -> Self {
        Self {
            line_detection_methods: vec![LineDetectionMethod::PixelContrast],
            deskew_image: false,
            morphological: MorphologicalConfig::default(),
            pixel_contrast: PixelContrastConfig::default(),
            cell_grid: CellGridConfig::default(),
            debug: DebugConfig::default(),
        }
    }
}

impl TableGridConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON document, filling omitted fields with defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON configuration file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn with_line_detection_methods(mut self, methods: Vec<LineDetectionMethod>) -> Self {
        self.line_detection_methods = methods;
        self
    }

    pub fn with_deskew_image(mut self, deskew: bool) -> Self {
        self.deskew_image = deskew;
        self
    }

    pub fn with_morphological(mut self, config: MorphologicalConfig) -> Self {
        self.morphological = config;
        self
    }

    pub fn with_pixel_contrast(mut self, config: PixelContrastConfig) -> Self {
        self.pixel_contrast = config;
        self
    }

    pub fn with_cell_grid(mut self, config: CellGridConfig) -> Self {
        self.cell_grid = config;
        self
    }

    pub fn with_debug(mut self, config: DebugConfig) -> Self {
        self.debug = config;
        self
    }
}

impl ConfigValidator for TableGridConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        match self.line_detection_methods.as_slice() {
            [_] => {}
            [a, b] if a != b => {}
            _ => {
                return Err(ConfigError::InvalidConfig {
                    message: format!(
                        "line_detection_methods must list one or two distinct methods, got {:?}",
                        self.line_detection_methods
                    ),
                });
            }
        }
        self.morphological.validate()?;
        self.pixel_contrast.validate()?;
        self.cell_grid.validate()?;
        self.debug.validate()
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TableGridConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = TableGridConfig::from_json_str(
            r#"{
                "deskew_image": true,
                "line_detection_methods": ["opencv_line_detect", "rgb_line_detect"],
                "pixel_contrast": { "contrast_methods": ["adaptive", "convolution_contrast_method"] }
            }"#,
        )
        .unwrap();
        assert!(config.deskew_image);
        assert_eq!(
            config.line_detection_methods,
            vec![
                LineDetectionMethod::Morphological,
                LineDetectionMethod::PixelContrast
            ]
        );
        assert!(config.pixel_contrast.uses(ContrastMethod::Adaptive));
        assert!(config.pixel_contrast.uses(ContrastMethod::Convolution));
        assert_eq!(config.morphological, MorphologicalConfig::default());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let err = TableGridConfig::from_json_str(r#"{ "deskew_image_reqd": true }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));

        let err =
            TableGridConfig::from_json_str(r#"{ "morphological": { "maxgap": 2 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_contrast_methods_validation() {
        let config = PixelContrastConfig::default().with_contrast_methods(vec![]);
        assert!(config.validate().is_err());
        let config = PixelContrastConfig::default()
            .with_contrast_methods(vec![ContrastMethod::Adaptive, ContrastMethod::Adaptive]);
        assert!(config.validate().is_err());
        let config = PixelContrastConfig::default()
            .with_contrast_methods(vec![ContrastMethod::Adaptive, ContrastMethod::Convolution]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_method_list_validation() {
        let config = TableGridConfig::default().with_line_detection_methods(vec![]);
        assert!(config.validate().is_err());
        let config = TableGridConfig::default().with_line_detection_methods(vec![
            LineDetectionMethod::Morphological,
            LineDetectionMethod::Morphological,
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_even_block_size_is_rejected() {
        let config = MorphologicalConfig::default().with_adaptive_threshold(14, 35.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders_compose() {
        let config = TableGridConfig::new()
            .with_deskew_image(true)
            .with_morphological(
                MorphologicalConfig::default()
                    .with_min_line_scale(0.5)
                    .with_min_segment_scale(0.1)
                    .with_max_gap(2),
            )
            .with_pixel_contrast(
                PixelContrastConfig::default()
                    .with_diff_threshold(30.0)
                    .with_orientation_search(2, 8),
            )
            .with_cell_grid(CellGridConfig {
                min_cell_width_divisor: 20,
                ..CellGridConfig::default()
            });
        assert!(config.validate().is_ok());
        assert_eq!(config.morphological.max_gap, 2);
        assert_eq!(config.pixel_contrast.orientation_jump_steps, 8);
        assert_eq!(config.pixel_contrast.diff_threshold, 30.0);
        assert_eq!(config.cell_grid.min_cell_width_divisor, 20);
        assert_eq!(
            MorphologicalConfig::get_defaults(),
            MorphologicalConfig::default()
        );
    }

    #[test]
    fn test_debug_requires_folder() {
        let config = DebugConfig {
            enabled: true,
            temp_folder: None,
        };
        assert!(config.validate().is_err());
        assert!(DebugConfig::enabled_in("/tmp/x").validate().is_ok());
    }
}
