//! Deterministic replay of recorded tracking traces.
//!
//! A trace is a JSON document holding the samples a tracking provider
//! delivered, one per tick. Replaying it through a pipeline yields the same
//! outcomes every time, which makes traces usable as regression fixtures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analysis::{TapPipeline, TickOutcome};
use crate::error::PipelineError;
use crate::telemetry::{self, DiagnosticError};
use crate::tracking::TrackingSample;

/// Recorded sequence of tracking samples
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub name: String,
    pub samples: Vec<TrackingSample>,
}

impl Trace {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let load_error = |reason: String| {
            telemetry::hub().record_error(DiagnosticError::TraceLoad, path.display().to_string());
            PipelineError::Load {
                path: path.display().to_string(),
                reason,
            }
        };
        let contents = fs::read_to_string(path).map_err(|err| load_error(err.to_string()))?;
        let trace: Trace =
            serde_json::from_str(&contents).map_err(|err| load_error(err.to_string()))?;
        log::info!(
            "[Replay] Loaded trace '{}' with {} samples from {:?}",
            trace.name,
            trace.samples.len(),
            path
        );
        Ok(trace)
    }
}

/// One replayed tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayTick {
    pub index: usize,
    /// Seconds since the start of the trace
    pub time_secs: f32,
    pub outcome: TickOutcome,
}

/// Summary of a full replay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub trace: String,
    pub tick_count: usize,
    pub inference_count: usize,
    pub trigger_count: usize,
    /// Tick indices that reported a tap
    pub trigger_ticks: Vec<usize>,
    pub ticks: Vec<ReplayTick>,
}

/// Run every sample of `trace` through `pipeline`
///
/// Stops at the first inference failure.
pub fn replay(pipeline: &mut TapPipeline, trace: &Trace) -> Result<ReplayReport, PipelineError> {
    let mut ticks = Vec::with_capacity(trace.samples.len());
    let mut trigger_ticks = Vec::new();
    let mut inference_count = 0;
    let mut time_secs = 0.0_f32;

    for (index, sample) in trace.samples.iter().enumerate() {
        if sample.dt.is_finite() && sample.dt > 0.0 {
            time_secs += sample.dt;
        }
        let outcome = pipeline.tick(sample)?;
        if let Some(event) = outcome.event() {
            inference_count += 1;
            telemetry::hub().record_detection(event);
            if event.triggered {
                trigger_ticks.push(index);
            }
        }
        ticks.push(ReplayTick {
            index,
            time_secs,
            outcome,
        });
    }

    log::info!(
        "[Replay] '{}': {} ticks, {} inferences, {} taps",
        trace.name,
        ticks.len(),
        inference_count,
        trigger_ticks.len()
    );

    Ok(ReplayReport {
        trace: trace.name.clone(),
        tick_count: ticks.len(),
        inference_count,
        trigger_count: trigger_ticks.len(),
        trigger_ticks,
        ticks,
    })
}
