// Logistic backend - linear classifier over the flattened window
//
// p = sigmoid(bias + sum_i(weights[i] * input[i]))
//
// Weights are exported as JSON alongside the normalization constants, which
// lets traces be replayed without an external inference engine.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{InferenceError, PipelineError};
use crate::inference::{InferenceBackend, InputTensor, TensorShape};

/// Serialized logistic model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticWeights {
    pub window_size: usize,
    pub feature_count: usize,
    /// One weight per input element, time-major
    pub weights: Vec<f32>,
    pub bias: f32,
}

impl LogisticWeights {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let load_error = |reason: String| PipelineError::Load {
            path: path.display().to_string(),
            reason,
        };
        let contents = fs::read_to_string(path).map_err(|err| load_error(err.to_string()))?;
        let weights: Self =
            serde_json::from_str(&contents).map_err(|err| load_error(err.to_string()))?;
        log::info!(
            "[LogisticBackend] Loaded {} weights from {:?}",
            weights.weights.len(),
            path
        );
        Ok(weights)
    }
}

#[derive(Debug, Clone)]
pub struct LogisticBackend {
    shape: TensorShape,
    weights: Vec<f32>,
    bias: f32,
}

impl LogisticBackend {
    pub fn new(model: LogisticWeights) -> Result<Self, InferenceError> {
        let shape = TensorShape::window(model.window_size, model.feature_count);
        let expected = shape.checked_element_count().ok_or_else(|| {
            InferenceError::new("logistic", format!("input {} is too large", shape))
        })?;
        if model.weights.len() != expected {
            return Err(InferenceError::new(
                "logistic",
                format!(
                    "expected {} weights for input {}, got {}",
                    expected,
                    shape,
                    model.weights.len()
                ),
            ));
        }
        if !model.bias.is_finite() || model.weights.iter().any(|w| !w.is_finite()) {
            return Err(InferenceError::new("logistic", "weights must be finite"));
        }

        Ok(Self {
            shape,
            weights: model.weights,
            bias: model.bias,
        })
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl InferenceBackend for LogisticBackend {
    fn name(&self) -> &str {
        "logistic"
    }

    fn input_shape(&self) -> Option<TensorShape> {
        Some(self.shape)
    }

    fn run(&mut self, input: &InputTensor<'_>) -> Result<Vec<f32>, InferenceError> {
        if input.shape != self.shape || input.data.len() != self.weights.len() {
            return Err(InferenceError::new(
                "logistic",
                format!(
                    "input {} with {} elements does not match model {}",
                    input.shape,
                    input.data.len(),
                    self.shape
                ),
            ));
        }

        let logit: f32 = self
            .weights
            .iter()
            .zip(input.data)
            .map(|(w, x)| w * x)
            .sum::<f32>()
            + self.bias;

        Ok(vec![sigmoid(logit)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(window_size: usize, feature_count: usize, bias: f32) -> LogisticWeights {
        LogisticWeights {
            window_size,
            feature_count,
            weights: vec![1.0; window_size * feature_count],
            bias,
        }
    }

    #[test]
    fn test_zero_input_returns_sigmoid_of_bias() {
        let mut backend = LogisticBackend::new(model(4, 3, 0.0)).unwrap();
        let data = vec![0.0; 12];
        let input = InputTensor {
            shape: TensorShape::window(4, 3),
            data: &data,
        };
        let out = backend.run(&input).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_positive_evidence_raises_probability() {
        let mut backend = LogisticBackend::new(model(2, 1, -1.0)).unwrap();
        let data = [2.0, 2.0];
        let input = InputTensor {
            shape: TensorShape::window(2, 1),
            data: &data,
        };
        let p = backend.run(&input).unwrap()[0];
        assert!(p > 0.9, "expected high probability, got {}", p);
    }

    #[test]
    fn test_rejects_weight_count_mismatch() {
        let mut bad = model(4, 3, 0.0);
        bad.weights.pop();
        assert!(LogisticBackend::new(bad).is_err());
    }

    #[test]
    fn test_rejects_overflowing_dimensions() {
        let huge = LogisticWeights {
            window_size: usize::MAX / 2,
            feature_count: 3,
            weights: vec![0.0; 3],
            bias: 0.0,
        };
        let err = LogisticBackend::new(huge).unwrap_err();
        assert!(err.to_string().contains("too large"), "got {}", err);
    }

    #[test]
    fn test_rejects_wrong_input_shape() {
        let mut backend = LogisticBackend::new(model(4, 3, 0.0)).unwrap();
        let data = vec![0.0; 8];
        let input = InputTensor {
            shape: TensorShape::window(4, 2),
            data: &data,
        };
        assert!(backend.run(&input).is_err());
    }

    #[test]
    fn test_weights_json_roundtrip() {
        let weights = model(2, 3, 0.25);
        let json = serde_json::to_string(&weights).unwrap();
        let parsed: LogisticWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, weights);
    }
}
