// Classifier - adapter between the sliding window and an inference backend
//
// The adapter's job is plumbing: build the input buffer with the exact
// declared shape (1, window_size, feature_count), run the injected backend
// synchronously, and read the probability from the first output element.
//
// The backend is owned for the adapter's whole lifetime and released when the
// adapter drops. The probability is passed through unclamped; range handling
// belongs to the event decider. A failed run, an empty output, or a
// non-finite value is reported as InferenceFailure and never replaced with a
// default probability.

use crate::analysis::window::SlidingWindow;
use crate::error::{ConfigError, PipelineError};
use crate::inference::{InferenceBackend, InputTensor, TensorShape};

pub struct ClassifierAdapter {
    backend: Box<dyn InferenceBackend>,
    shape: TensorShape,
    /// Reused input buffer, sized once at construction
    input: Vec<f32>,
}

impl ClassifierAdapter {
    /// Wrap `backend` for windows of `window_size` x `feature_count`
    ///
    /// Fails if the shape's element count overflows, or if the backend
    /// declares a fixed input shape that differs. The backend is released on
    /// either failure.
    pub fn new(
        mut backend: Box<dyn InferenceBackend>,
        window_size: usize,
        feature_count: usize,
    ) -> Result<Self, ConfigError> {
        let shape = TensorShape::window(window_size, feature_count);
        let Some(element_count) = shape.checked_element_count() else {
            backend.release();
            return Err(ConfigError::InvalidWindowSize { window_size });
        };
        if let Some(expected) = backend.input_shape() {
            if expected != shape {
                backend.release();
                return Err(ConfigError::ShapeRejected {
                    expected: expected.to_string(),
                    actual: shape.to_string(),
                });
            }
        }

        log::info!(
            "[ClassifierAdapter] Using {} backend with input {}",
            backend.name(),
            shape
        );

        Ok(Self {
            backend,
            shape,
            input: Vec::with_capacity(element_count),
        })
    }

    pub fn shape(&self) -> TensorShape {
        self.shape
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Flatten `window` and run the backend, returning the raw probability
    ///
    /// `window` must have the dimensions the adapter was built with.
    pub fn infer(&mut self, window: &SlidingWindow) -> Result<f32, PipelineError> {
        debug_assert_eq!(
            (window.len(), window.feature_count()),
            (self.shape.time, self.shape.features),
            "window dimensions must match the classifier input shape"
        );
        window.flatten_into(&mut self.input);

        let tensor = InputTensor {
            shape: self.shape,
            data: &self.input,
        };
        let output = self.backend.run(&tensor)?;

        let probability = output
            .first()
            .copied()
            .ok_or_else(|| PipelineError::InferenceFailure {
                reason: format!("{} backend returned an empty output", self.backend.name()),
            })?;

        if !probability.is_finite() {
            return Err(PipelineError::InferenceFailure {
                reason: format!(
                    "{} backend returned non-finite probability {}",
                    self.backend.name(),
                    probability
                ),
            });
        }

        Ok(probability)
    }
}

impl Drop for ClassifierAdapter {
    fn drop(&mut self) {
        log::debug!(
            "[ClassifierAdapter] Releasing {} backend",
            self.backend.name()
        );
        self.backend.release();
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
