// Features - raw feature vector assembly and standardization
//
// A feature vector holds, for each configured axis in order, the position,
// velocity and acceleration component along that axis. The single-axis layout
// yields 3 features and the dual-axis layout 6; everything downstream is
// generic over the count.
//
// Standardization uses precomputed per-feature constants:
//   normalized[i] = (raw[i] - mean[i]) / scale[i]

use crate::analysis::motion::MotionEstimate;
use crate::config::NormalizationConfig;
use crate::error::ConfigError;
use crate::tracking::Axis;

/// Ordered axis selection that defines the feature vector layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureLayout {
    axes: Vec<Axis>,
}

impl FeatureLayout {
    /// Position, velocity, acceleration
    pub const FEATURES_PER_AXIS: usize = 3;

    pub fn new(axes: Vec<Axis>) -> Self {
        Self { axes }
    }

    pub fn axes(&self) -> &[Axis] {
        &self.axes
    }

    pub fn feature_count(&self) -> usize {
        self.axes.len() * Self::FEATURES_PER_AXIS
    }

    /// Write the raw (unnormalized) features of `estimate` into `out`
    ///
    /// # Panics
    /// Panics if `out.len() != self.feature_count()`
    pub fn fill(&self, estimate: &MotionEstimate, out: &mut [f32]) {
        assert_eq!(
            out.len(),
            self.feature_count(),
            "feature buffer length must match layout"
        );
        for (axis, chunk) in self
            .axes
            .iter()
            .zip(out.chunks_exact_mut(Self::FEATURES_PER_AXIS))
        {
            chunk[0] = estimate.position.component(*axis);
            chunk[1] = estimate.velocity.component(*axis);
            chunk[2] = estimate.acceleration.component(*axis);
        }
    }

    /// Allocating variant of [`FeatureLayout::fill`]
    pub fn extract(&self, estimate: &MotionEstimate) -> Vec<f32> {
        let mut out = vec![0.0; self.feature_count()];
        self.fill(estimate, &mut out);
        out
    }
}

/// Immutable per-feature standardization constants
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureNormalizer {
    mean: Vec<f32>,
    scale: Vec<f32>,
}

impl FeatureNormalizer {
    /// Build a normalizer for `feature_count` features
    ///
    /// Fails fast on length mismatch, non-finite entries or a zero scale.
    pub fn new(params: &NormalizationConfig, feature_count: usize) -> Result<Self, ConfigError> {
        for (field, values) in [("mean", &params.mean), ("scale", &params.scale)] {
            if values.len() != feature_count {
                return Err(ConfigError::FeatureCountMismatch {
                    field,
                    expected: feature_count,
                    actual: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|v| !v.is_finite()) {
                return Err(ConfigError::NonFiniteParameter { field, index });
            }
        }
        if let Some(index) = params.scale.iter().position(|s| *s == 0.0) {
            return Err(ConfigError::ZeroScale { index });
        }

        Ok(Self {
            mean: params.mean.clone(),
            scale: params.scale.clone(),
        })
    }

    pub fn feature_count(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f32] {
        &self.mean
    }

    /// Component-wise affine map; output has the same length as `raw`
    pub fn normalize(&self, raw: &[f32]) -> Vec<f32> {
        let mut out = raw.to_vec();
        self.normalize_in_place(&mut out);
        out
    }

    /// # Panics
    /// Panics if `values.len()` differs from the configured feature count
    pub fn normalize_in_place(&self, values: &mut [f32]) {
        assert_eq!(
            values.len(),
            self.feature_count(),
            "feature vector length must match normalization parameters"
        );
        for ((value, mean), scale) in values.iter_mut().zip(&self.mean).zip(&self.scale) {
            *value = (*value - mean) / scale;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::Vec3;

    fn params(mean: Vec<f32>, scale: Vec<f32>) -> NormalizationConfig {
        NormalizationConfig { mean, scale }
    }

    #[test]
    fn test_normalize_is_affine_per_component() {
        let normalizer =
            FeatureNormalizer::new(&params(vec![1.0, -2.0, 0.5], vec![2.0, 0.5, 4.0]), 3).unwrap();
        let raw = [3.0, -1.0, 4.5];
        let normalized = normalizer.normalize(&raw);

        assert_eq!(normalized.len(), raw.len());
        assert_eq!(normalized, vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_normalize_mean_yields_zero() {
        let mean = vec![0.12, -0.4, 3.3, 7.0, 0.0, -1.5];
        let normalizer =
            FeatureNormalizer::new(&params(mean.clone(), vec![0.1, 0.2, 0.3, 0.4, 0.5, 0.6]), 6)
                .unwrap();
        assert!(normalizer.normalize(&mean).iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_normalize_is_deterministic() {
        let normalizer =
            FeatureNormalizer::new(&params(vec![0.3, 0.1, 0.0], vec![0.7, 1.3, 2.0]), 3).unwrap();
        let raw = [0.25, -0.75, 12.0];
        assert_eq!(normalizer.normalize(&raw), normalizer.normalize(&raw));
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        assert_eq!(
            FeatureNormalizer::new(&params(vec![0.0; 3], vec![1.0, 0.0, 1.0]), 3),
            Err(ConfigError::ZeroScale { index: 1 })
        );
        assert!(matches!(
            FeatureNormalizer::new(&params(vec![0.0; 3], vec![1.0; 3]), 6),
            Err(ConfigError::FeatureCountMismatch { field: "mean", .. })
        ));
        assert!(matches!(
            FeatureNormalizer::new(&params(vec![0.0; 3], vec![1.0, f32::NAN, 1.0]), 3),
            Err(ConfigError::NonFiniteParameter {
                field: "scale",
                index: 1
            })
        ));
    }

    #[test]
    fn test_layout_orders_axes_then_derivatives() {
        let layout = FeatureLayout::new(vec![Axis::Y, Axis::Z]);
        let estimate = MotionEstimate {
            position: Vec3::new(1.0, 2.0, 3.0),
            velocity: Vec3::new(10.0, 20.0, 30.0),
            acceleration: Vec3::new(100.0, 200.0, 300.0),
        };

        assert_eq!(
            layout.extract(&estimate),
            vec![2.0, 20.0, 200.0, 3.0, 30.0, 300.0]
        );
    }
}
