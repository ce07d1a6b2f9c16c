// Tap Detector Core - fingertip tap classification
// Per-tick feature window pipeline with debounced event output

// Module declarations
pub mod analysis;
pub mod config;
pub mod driver;
pub mod error;
pub mod inference;
pub mod replay;
pub mod telemetry;
pub mod tracking;

// Re-exports for convenience
pub use analysis::{DetectionEvent, PipelineStats, SkipReason, TapPipeline, TickOutcome};
pub use config::DetectorConfig;
pub use error::{ConfigError, PipelineError};
pub use inference::{InferenceBackend, InputTensor, TensorShape};
pub use tracking::{Axis, TrackingSample, Vec3};
