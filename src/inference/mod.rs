//! Inference backends
//!
//! The classifier itself is an external collaborator: a fixed-shape tensor
//! goes in, a buffer whose first element is the tap probability comes out.
//! This module defines that seam plus a few in-process implementations used
//! by the CLI and tests.

use std::fmt;

use crate::error::InferenceError;

pub mod logistic;
pub mod stub;

pub use logistic::{LogisticBackend, LogisticWeights};
pub use stub::{ConstantBackend, FnBackend};

/// Rank-3 input shape `(batch, time, features)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TensorShape {
    pub batch: usize,
    pub time: usize,
    pub features: usize,
}

impl TensorShape {
    /// Single-batch window shape
    pub fn window(window_size: usize, feature_count: usize) -> Self {
        Self {
            batch: 1,
            time: window_size,
            features: feature_count,
        }
    }

    /// # Panics
    /// Panics if the product overflows; see [`TensorShape::checked_element_count`]
    pub fn element_count(&self) -> usize {
        self.checked_element_count()
            .unwrap_or_else(|| panic!("tensor shape {} overflows usize", self))
    }

    /// Total scalar count, or `None` if it does not fit in `usize`
    pub fn checked_element_count(&self) -> Option<usize> {
        self.batch
            .checked_mul(self.time)?
            .checked_mul(self.features)
    }
}

impl fmt::Display for TensorShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.batch, self.time, self.features)
    }
}

/// Borrowed input tensor, row-major, time-major
#[derive(Debug, Clone, Copy)]
pub struct InputTensor<'a> {
    pub shape: TensorShape,
    pub data: &'a [f32],
}

impl<'a> InputTensor<'a> {
    /// Feature vector at time step `t` of batch 0
    pub fn step(&self, t: usize) -> &'a [f32] {
        let start = t * self.shape.features;
        &self.data[start..start + self.shape.features]
    }
}

/// Capability that runs the classifier for one tick
///
/// Calls are synchronous: `run` must return before the next tick begins.
/// Backends that wrap an asynchronous engine block on it inside `run`.
pub trait InferenceBackend: Send {
    /// Short identifier used in logs and error messages
    fn name(&self) -> &str;

    /// Input shape the backend was built for, if it is fixed
    fn input_shape(&self) -> Option<TensorShape> {
        None
    }

    /// Run inference; the first output element is the tap probability
    fn run(&mut self, input: &InputTensor<'_>) -> Result<Vec<f32>, InferenceError>;

    /// Release engine resources. Called once when the owning adapter drops.
    fn release(&mut self) {}
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn input_shape(&self) -> Option<TensorShape> {
        (**self).input_shape()
    }

    fn run(&mut self, input: &InputTensor<'_>) -> Result<Vec<f32>, InferenceError> {
        (**self).run(input)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tensor_shape_display_and_count() {
        let shape = TensorShape::window(100, 6);
        assert_eq!(shape.to_string(), "(1, 100, 6)");
        assert_eq!(shape.element_count(), 600);
    }

    #[test]
    fn test_checked_element_count_detects_overflow() {
        assert_eq!(TensorShape::window(100, 3).checked_element_count(), Some(300));
        assert_eq!(
            TensorShape::window(usize::MAX / 2, 3).checked_element_count(),
            None
        );
    }

    #[test]
    fn test_input_tensor_step() {
        let data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let input = InputTensor {
            shape: TensorShape::window(3, 2),
            data: &data,
        };
        assert_eq!(input.step(0), &[0.0, 1.0]);
        assert_eq!(input.step(2), &[4.0, 5.0]);
    }
}
