//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation or loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The configuration document could not be parsed (including unknown keys).
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A trait for validating configuration parameters.
///
/// Detectors validate their configuration once on construction so that
/// detection itself never has to re-check parameters.
pub trait ConfigValidator {
    /// Validates the configuration.
    ///
    /// # Returns
    ///
    /// A Result indicating success or a ConfigError if validation fails.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates that a fraction lies in `(0.0, 1.0]`.
    ///
    /// # Arguments
    ///
    /// * `field` - Name of the field, used in the error message.
    /// * `value` - The fraction to validate.
    fn validate_fraction(&self, field: &str, value: f64) -> Result<(), ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidConfig {
                message: format!("{field} must be in (0.0, 1.0], got {value}"),
            })
        }
    }

    /// Validates that a size or count is non-zero.
    fn validate_positive(&self, field: &str, value: usize) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{field} must be greater than 0"),
            })
        } else {
            Ok(())
        }
    }

    /// Validates that a threshold is finite and not negative.
    fn validate_non_negative(&self, field: &str, value: f64) -> Result<(), ConfigError> {
        if value.is_finite() && value >= 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidConfig {
                message: format!("{field} must be a finite, non-negative number, got {value}"),
            })
        }
    }
}

/// Extension methods for validated configurations.
pub trait ConfigValidatorExt: ConfigValidator + Sized {
    /// Validates and returns the configuration.
    fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}
