//! Detector configuration
//!
//! Runtime configuration loaded from JSON files so thresholds and
//! normalization constants can be swapped without recompiling. Unlike a
//! best-effort settings file, a configuration that fails validation is an
//! error: the pipeline refuses to run misconfigured.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::analysis::features::{FeatureLayout, FeatureNormalizer};
use crate::error::{ConfigError, PipelineError};
use crate::tracking::Axis;

/// Number of feature vectors held by the classifier window
pub const DEFAULT_WINDOW_SIZE: usize = 100;

/// Largest accepted window; keeps the classifier input allocation bounded
pub const MAX_WINDOW_SIZE: usize = 10_000;

/// Minimum visible duration of a triggered event, in seconds
pub const DEFAULT_PULSE_DURATION_SECS: f32 = 0.05;

/// Probability above which a tap is reported
pub const DEFAULT_DETECTION_THRESHOLD: f32 = 0.7;

/// Complete detector configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Probability threshold in [0, 1]
    #[serde(default = "default_threshold")]
    pub detection_threshold: f32,
    /// Tracked axes; each contributes position, velocity and acceleration
    pub axes: Vec<Axis>,
    /// Per-feature standardization constants
    pub normalization: NormalizationConfig,
    /// Feature vectors per classifier window
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Debounce pulse length in seconds
    #[serde(default = "default_pulse_duration")]
    pub pulse_duration_secs: f32,
}

/// Mean/scale pairs, one entry per feature index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    pub mean: Vec<f32>,
    pub scale: Vec<f32>,
}

impl NormalizationConfig {
    /// Identity normalization (mean 0, scale 1) for `feature_count` features
    pub fn identity(feature_count: usize) -> Self {
        Self {
            mean: vec![0.0; feature_count],
            scale: vec![1.0; feature_count],
        }
    }
}

fn default_threshold() -> f32 {
    DEFAULT_DETECTION_THRESHOLD
}

fn default_window_size() -> usize {
    DEFAULT_WINDOW_SIZE
}

fn default_pulse_duration() -> f32 {
    DEFAULT_PULSE_DURATION_SECS
}

impl Default for DetectorConfig {
    /// Single-axis layout with identity normalization
    fn default() -> Self {
        Self::single_axis()
    }
}

impl DetectorConfig {
    /// Three features: position, velocity and acceleration along Y
    pub fn single_axis() -> Self {
        Self::with_axes(vec![Axis::Y])
    }

    /// Six features: position, velocity and acceleration along Y then Z
    pub fn dual_axis() -> Self {
        Self::with_axes(vec![Axis::Y, Axis::Z])
    }

    fn with_axes(axes: Vec<Axis>) -> Self {
        let feature_count = axes.len() * FeatureLayout::FEATURES_PER_AXIS;
        Self {
            detection_threshold: DEFAULT_DETECTION_THRESHOLD,
            axes,
            normalization: NormalizationConfig::identity(feature_count),
            window_size: DEFAULT_WINDOW_SIZE,
            pulse_duration_secs: DEFAULT_PULSE_DURATION_SECS,
        }
    }

    /// Number of scalars in one feature vector
    pub fn feature_count(&self) -> usize {
        self.axes.len() * FeatureLayout::FEATURES_PER_AXIS
    }

    /// Check every construction-time invariant
    ///
    /// # Returns
    /// * `Ok(FeatureLayout)` - Layout derived from the validated axes
    /// * `Err(ConfigError)` - First violated invariant
    pub fn validate(&self) -> Result<FeatureLayout, ConfigError> {
        self.feature_stages().map(|(layout, _)| layout)
    }

    /// Validate and build the feature layout and normalizer in one pass
    pub(crate) fn feature_stages(
        &self,
    ) -> Result<(FeatureLayout, FeatureNormalizer), ConfigError> {
        if !(0.0..=1.0).contains(&self.detection_threshold) {
            return Err(ConfigError::InvalidThreshold {
                threshold: self.detection_threshold,
            });
        }

        if self.axes.is_empty() {
            return Err(ConfigError::InvalidAxes {
                reason: "at least one axis is required".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for axis in &self.axes {
            if !seen.insert(*axis) {
                return Err(ConfigError::InvalidAxes {
                    reason: format!("axis {:?} listed more than once", axis),
                });
            }
        }

        if self.window_size == 0 || self.window_size > MAX_WINDOW_SIZE {
            return Err(ConfigError::InvalidWindowSize {
                window_size: self.window_size,
            });
        }

        if !self.pulse_duration_secs.is_finite() || self.pulse_duration_secs < 0.0 {
            return Err(ConfigError::InvalidPulseDuration {
                seconds: self.pulse_duration_secs,
            });
        }

        let normalizer = FeatureNormalizer::new(&self.normalization, self.feature_count())?;

        Ok((FeatureLayout::new(self.axes.clone()), normalizer))
    }

    /// Load configuration from a JSON file
    ///
    /// # Returns
    /// * `Ok(DetectorConfig)` - Parsed configuration (not yet validated)
    /// * `Err(PipelineError::Load)` - File missing or JSON invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|err| PipelineError::Load {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|err| {
            log::warn!("[Config] Failed to parse JSON from {:?}: {}", path, err);
            PipelineError::Load {
                path: path.display().to_string(),
                reason: err.to_string(),
            }
        })?;
        log::info!(
            "[Config] Loaded configuration from {:?} ({} features, window {})",
            path,
            config.feature_count(),
            config.window_size
        );
        Ok(config)
    }
}
