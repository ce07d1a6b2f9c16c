// Stub backends - closure-driven and constant classifiers
//
// Used by tests, smoke runs, and hosts that already hold an engine handle and
// only need to forward the tensor.

use crate::error::InferenceError;
use crate::inference::{InferenceBackend, InputTensor};

/// Backend that forwards each tensor to a closure
pub struct FnBackend<F>
where
    F: FnMut(&InputTensor<'_>) -> Result<Vec<f32>, InferenceError> + Send,
{
    name: String,
    func: F,
}

impl<F> FnBackend<F>
where
    F: FnMut(&InputTensor<'_>) -> Result<Vec<f32>, InferenceError> + Send,
{
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> InferenceBackend for FnBackend<F>
where
    F: FnMut(&InputTensor<'_>) -> Result<Vec<f32>, InferenceError> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self, input: &InputTensor<'_>) -> Result<Vec<f32>, InferenceError> {
        (self.func)(input)
    }
}

/// Backend that always reports the same probability
#[derive(Debug, Clone, Copy)]
pub struct ConstantBackend {
    probability: f32,
}

impl ConstantBackend {
    pub fn new(probability: f32) -> Self {
        Self { probability }
    }
}

impl InferenceBackend for ConstantBackend {
    fn name(&self) -> &str {
        "constant"
    }

    fn run(&mut self, _input: &InputTensor<'_>) -> Result<Vec<f32>, InferenceError> {
        Ok(vec![self.probability])
    }
}
