// Configuration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Configuration error code constants
///
/// Single source of truth for the numeric codes reported to hosts.
///
/// Error code range: 1001-1008
pub struct ConfigErrorCodes {}

impl ConfigErrorCodes {
    /// Detection threshold outside [0, 1]
    pub const INVALID_THRESHOLD: i32 = 1001;

    /// A normalization scale entry is zero
    pub const ZERO_SCALE: i32 = 1002;

    /// A normalization parameter is NaN or infinite
    pub const NON_FINITE_PARAMETER: i32 = 1003;

    /// Mean/scale array length does not match the feature count
    pub const FEATURE_COUNT_MISMATCH: i32 = 1004;

    /// Window size is zero
    pub const INVALID_WINDOW_SIZE: i32 = 1005;

    /// Pulse duration is negative or non-finite
    pub const INVALID_PULSE_DURATION: i32 = 1006;

    /// Axis list is empty or contains duplicates
    pub const INVALID_AXES: i32 = 1007;

    /// Inference backend declared an input shape the pipeline cannot produce
    pub const SHAPE_REJECTED: i32 = 1008;
}

/// Log a configuration error with structured context
pub fn log_config_error(err: &ConfigError, context: &str) {
    error!(
        "Config error in {}: code={}, component=DetectorConfig, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Configuration errors
///
/// Raised while constructing a pipeline. A pipeline is never built from a
/// configuration that produced one of these.
///
/// Error code range: 1001-1008
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Detection threshold must lie in [0, 1]
    InvalidThreshold { threshold: f32 },

    /// Scale entry at `index` is zero
    ZeroScale { index: usize },

    /// Parameter `field[index]` is NaN or infinite
    NonFiniteParameter { field: &'static str, index: usize },

    /// `field` has `actual` entries but the layout needs `expected`
    FeatureCountMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Window must hold between 1 and MAX_WINDOW_SIZE feature vectors
    InvalidWindowSize { window_size: usize },

    /// Pulse duration must be finite and non-negative
    InvalidPulseDuration { seconds: f32 },

    /// Axis selection is empty or repeats an axis
    InvalidAxes { reason: String },

    /// Backend expects a different input tensor shape
    ShapeRejected { expected: String, actual: String },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::InvalidThreshold { .. } => ConfigErrorCodes::INVALID_THRESHOLD,
            ConfigError::ZeroScale { .. } => ConfigErrorCodes::ZERO_SCALE,
            ConfigError::NonFiniteParameter { .. } => ConfigErrorCodes::NON_FINITE_PARAMETER,
            ConfigError::FeatureCountMismatch { .. } => ConfigErrorCodes::FEATURE_COUNT_MISMATCH,
            ConfigError::InvalidWindowSize { .. } => ConfigErrorCodes::INVALID_WINDOW_SIZE,
            ConfigError::InvalidPulseDuration { .. } => ConfigErrorCodes::INVALID_PULSE_DURATION,
            ConfigError::InvalidAxes { .. } => ConfigErrorCodes::INVALID_AXES,
            ConfigError::ShapeRejected { .. } => ConfigErrorCodes::SHAPE_REJECTED,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::InvalidThreshold { threshold } => {
                format!("Detection threshold must be within [0, 1] (got {})", threshold)
            }
            ConfigError::ZeroScale { index } => {
                format!("Normalization scale at index {} is zero", index)
            }
            ConfigError::NonFiniteParameter { field, index } => {
                format!("{}[{}] is not a finite number", field, index)
            }
            ConfigError::FeatureCountMismatch {
                field,
                expected,
                actual,
            } => {
                format!(
                    "{} has {} entries, expected {} (one per feature)",
                    field, actual, expected
                )
            }
            ConfigError::InvalidWindowSize { window_size } => {
                format!(
                    "Window size must be between 1 and {} (got {})",
                    crate::config::MAX_WINDOW_SIZE,
                    window_size
                )
            }
            ConfigError::InvalidPulseDuration { seconds } => {
                format!(
                    "Pulse duration must be finite and non-negative (got {})",
                    seconds
                )
            }
            ConfigError::InvalidAxes { reason } => format!("Invalid axes: {}", reason),
            ConfigError::ShapeRejected { expected, actual } => {
                format!(
                    "Inference backend expects input {} but pipeline produces {}",
                    expected, actual
                )
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}
