// Pipeline error types and constants

use crate::error::{ConfigError, ErrorCode};
use log::error;
use std::fmt;

/// Pipeline error code constants
///
/// Error code range: 2001-2003
pub struct PipelineErrorCodes {}

impl PipelineErrorCodes {
    /// Inference backend failed or returned an unusable output
    pub const INFERENCE_FAILURE: i32 = 2001;

    /// Pipeline construction rejected the configuration
    pub const CONFIG: i32 = 2002;

    /// Loading a configuration, weight or trace file failed
    pub const LOAD: i32 = 2003;
}

/// Log a pipeline error with structured context
pub fn log_pipeline_error(err: &PipelineError, context: &str) {
    error!(
        "Pipeline error in {}: code={}, component=TapPipeline, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Failure reported by an inference backend
///
/// Backends only describe what went wrong; the classifier adapter turns this
/// into [`PipelineError::InferenceFailure`].
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceError {
    pub backend: String,
    pub reason: String,
}

impl InferenceError {
    pub fn new(backend: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            backend: backend.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} backend: {}", self.backend, self.reason)
    }
}

impl std::error::Error for InferenceError {}

/// Errors surfaced by a running (or loading) tap pipeline
///
/// Error code range: 2001-2003
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Inference failed, produced no output, or produced a non-finite value.
    /// No default probability is substituted.
    InferenceFailure { reason: String },

    /// Construction-time configuration problem
    Config(ConfigError),

    /// A file could not be read or parsed
    Load { path: String, reason: String },
}

impl ErrorCode for PipelineError {
    fn code(&self) -> i32 {
        match self {
            PipelineError::InferenceFailure { .. } => PipelineErrorCodes::INFERENCE_FAILURE,
            PipelineError::Config(_) => PipelineErrorCodes::CONFIG,
            PipelineError::Load { .. } => PipelineErrorCodes::LOAD,
        }
    }

    fn message(&self) -> String {
        match self {
            PipelineError::InferenceFailure { reason } => {
                format!("Inference failed: {}", reason)
            }
            PipelineError::Config(err) => err.message(),
            PipelineError::Load { path, reason } => {
                format!("Failed to load {}: {}", path, reason)
            }
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PipelineError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        PipelineError::Config(err)
    }
}

impl From<InferenceError> for PipelineError {
    fn from(err: InferenceError) -> Self {
        PipelineError::InferenceFailure {
            reason: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_error_codes() {
        assert_eq!(
            PipelineError::InferenceFailure {
                reason: "x".to_string()
            }
            .code(),
            2001
        );
        assert_eq!(
            PipelineError::Config(ConfigError::ZeroScale { index: 0 }).code(),
            2002
        );
        assert_eq!(
            PipelineError::Load {
                path: "a.json".to_string(),
                reason: "missing".to_string()
            }
            .code(),
            2003
        );
    }

    #[test]
    fn test_inference_error_conversion() {
        let err: PipelineError = InferenceError::new("onnx", "session closed").into();
        match err {
            PipelineError::InferenceFailure { reason } => {
                assert!(reason.contains("onnx"));
                assert!(reason.contains("session closed"));
            }
            other => panic!("Expected InferenceFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_config_error_source() {
        use std::error::Error;

        let err = PipelineError::from(ConfigError::ZeroScale { index: 2 });
        assert!(err.source().is_some());
        assert!(err.message().contains("index 2"));
    }
}
