//! Core telemetry event types describing diagnostics data exposed to the
//! CLI and to host-side subscribers.

use serde::{Deserialize, Serialize};

/// Tracking transitions observed by the pipeline driver.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TrackingPhase {
    Acquired,
    Lost,
}

/// Diagnostic error codes surfaced via telemetry metrics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticError {
    InferenceFailure,
    SampleQueueFull,
    TraceLoad,
}

/// Metric events covering inference latency, queue occupancy, taps, and
/// tracking transitions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum MetricEvent {
    InferenceLatency {
        avg_ms: f32,
        max_ms: f32,
        sample_count: usize,
    },
    QueueOccupancy {
        channel: String,
        percent: f32,
    },
    Tap {
        confidence: f32,
        timestamp_ms: u64,
    },
    Tracking {
        phase: TrackingPhase,
        timestamp_ms: u64,
    },
    Error {
        code: DiagnosticError,
        context: String,
    },
}
