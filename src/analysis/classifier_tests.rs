use super::*;
use crate::error::InferenceError;
use crate::inference::{ConstantBackend, FnBackend};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Backend that records the shape it was called with and its release
struct RecordingBackend {
    calls: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
    declared: Option<TensorShape>,
    output: Vec<f32>,
}

impl InferenceBackend for RecordingBackend {
    fn name(&self) -> &str {
        "recording"
    }

    fn input_shape(&self) -> Option<TensorShape> {
        self.declared
    }

    fn run(&mut self, input: &InputTensor<'_>) -> Result<Vec<f32>, InferenceError> {
        assert_eq!(input.data.len(), input.shape.element_count());
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.output.clone())
    }

    fn release(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

fn recording(
    output: Vec<f32>,
    declared: Option<TensorShape>,
) -> (RecordingBackend, Arc<AtomicUsize>, Arc<AtomicBool>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicBool::new(false));
    let backend = RecordingBackend {
        calls: Arc::clone(&calls),
        released: Arc::clone(&released),
        declared,
        output,
    };
    (backend, calls, released)
}

#[test]
fn test_infer_returns_first_output_element() {
    let mut adapter =
        ClassifierAdapter::new(Box::new(ConstantBackend::new(0.42)), 10, 3).unwrap();
    let window = SlidingWindow::new(10, 3);

    let p = adapter.infer(&window).unwrap();
    assert_eq!(p, 0.42);
}

#[test]
fn test_infer_passes_exact_shape_oldest_first() {
    let backend = FnBackend::new("shape-check", |input: &InputTensor<'_>| {
        assert_eq!(input.shape, TensorShape::window(3, 2));
        assert_eq!(input.data, &[0.0, 0.0, 1.0, 2.0, 3.0, 4.0]);
        Ok(vec![0.1, 0.9])
    });
    let mut adapter = ClassifierAdapter::new(Box::new(backend), 3, 2).unwrap();
    let mut window = SlidingWindow::new(3, 2);
    window.push(&[1.0, 2.0]);
    window.push(&[3.0, 4.0]);

    assert_eq!(adapter.infer(&window).unwrap(), 0.1);
}

#[test]
fn test_probability_is_not_clamped() {
    let mut adapter = ClassifierAdapter::new(Box::new(ConstantBackend::new(1.7)), 2, 3).unwrap();
    let window = SlidingWindow::new(2, 3);
    assert_eq!(adapter.infer(&window).unwrap(), 1.7);
}

#[test]
fn test_backend_error_is_inference_failure() {
    let backend = FnBackend::new("failing", |_input: &InputTensor<'_>| {
        Err(InferenceError::new("failing", "device lost"))
    });
    let mut adapter = ClassifierAdapter::new(Box::new(backend), 2, 3).unwrap();
    let window = SlidingWindow::new(2, 3);

    match adapter.infer(&window) {
        Err(PipelineError::InferenceFailure { reason }) => {
            assert!(reason.contains("device lost"));
        }
        other => panic!("Expected InferenceFailure, got {:?}", other),
    }
}

#[test]
fn test_empty_output_is_inference_failure() {
    let (backend, _, _) = recording(vec![], None);
    let mut adapter = ClassifierAdapter::new(Box::new(backend), 2, 3).unwrap();
    let window = SlidingWindow::new(2, 3);

    assert!(matches!(
        adapter.infer(&window),
        Err(PipelineError::InferenceFailure { .. })
    ));
}

#[test]
fn test_nan_output_is_inference_failure() {
    let mut adapter =
        ClassifierAdapter::new(Box::new(ConstantBackend::new(f32::NAN)), 2, 3).unwrap();
    let window = SlidingWindow::new(2, 3);

    assert!(matches!(
        adapter.infer(&window),
        Err(PipelineError::InferenceFailure { .. })
    ));
}

#[test]
fn test_declared_shape_mismatch_rejected() {
    let (backend, _, released) = recording(vec![0.5], Some(TensorShape::window(50, 3)));
    let result = ClassifierAdapter::new(Box::new(backend), 100, 3);

    assert!(matches!(result, Err(ConfigError::ShapeRejected { .. })));
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn test_backend_released_on_drop() {
    let (backend, calls, released) = recording(vec![0.3], Some(TensorShape::window(4, 6)));
    let mut adapter = ClassifierAdapter::new(Box::new(backend), 4, 6).unwrap();
    let window = SlidingWindow::new(4, 6);

    adapter.infer(&window).unwrap();
    adapter.infer(&window).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(!released.load(Ordering::SeqCst));

    drop(adapter);
    assert!(released.load(Ordering::SeqCst));
}

#[test]
fn test_overflowing_shape_rejected_without_allocating() {
    let (backend, calls, released) = recording(vec![0.5], None);
    let result = ClassifierAdapter::new(Box::new(backend), usize::MAX / 2, 3);

    assert!(matches!(
        result,
        Err(ConfigError::InvalidWindowSize { window_size }) if window_size == usize::MAX / 2
    ));
    assert!(released.load(Ordering::SeqCst));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "window dimensions must match")]
fn test_mismatched_window_is_an_invariant_violation() {
    let mut adapter = ClassifierAdapter::new(Box::new(ConstantBackend::new(0.5)), 4, 3).unwrap();
    let window = SlidingWindow::new(5, 3);
    let _ = adapter.infer(&window);
}
