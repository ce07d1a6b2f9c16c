// Error types for the tap detector
//
// This module defines custom error types for configuration and pipeline
// operations, providing structured error handling with numeric error codes
// suitable for host-side reporting.

mod config;
mod pipeline;

pub use config::{log_config_error, ConfigError, ConfigErrorCodes};
pub use pipeline::{log_pipeline_error, InferenceError, PipelineError, PipelineErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the host boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_trait() {
        let config_err: &dyn ErrorCode = &ConfigError::InvalidWindowSize { window_size: 0 };
        assert_eq!(config_err.code(), ConfigErrorCodes::INVALID_WINDOW_SIZE);

        let pipeline_err: &dyn ErrorCode = &PipelineError::InferenceFailure {
            reason: "backend offline".to_string(),
        };
        assert_eq!(pipeline_err.code(), PipelineErrorCodes::INFERENCE_FAILURE);
    }

    #[test]
    fn test_error_propagation() {
        fn may_fail() -> Result<(), ConfigError> {
            Err(ConfigError::InvalidThreshold { threshold: 1.5 })
        }

        fn caller() -> Result<(), PipelineError> {
            may_fail()?;
            Ok(())
        }

        match caller() {
            Err(PipelineError::Config(ConfigError::InvalidThreshold { threshold })) => {
                assert_eq!(threshold, 1.5);
            }
            other => panic!("Expected wrapped InvalidThreshold, got {:?}", other),
        }
    }
}
