// Analysis module - per-tick tap detection pipeline
//
// This module wires the pipeline stages together and runs them once per
// tracking tick.
//
// Architecture:
// - DerivativeEstimator: position + dt → velocity, acceleration
// - FeatureLayout / FeatureNormalizer: raw features → standardized vector
// - SlidingWindow: fixed-length history, always full
// - ClassifierAdapter: window → backend → probability
// - EventDecider: probability → debounced DetectionEvent
//
// A TapPipeline is driven by exactly one caller; `tick` takes `&mut self`, so
// only one tick can ever be in flight.

use std::time::{Duration, Instant};

use crate::config::DetectorConfig;
use crate::error::{log_config_error, ConfigError, PipelineError};
use crate::inference::{InferenceBackend, TensorShape};
use crate::tracking::TrackingSample;

pub mod classifier;
pub mod decider;
pub mod features;
pub mod motion;
pub mod window;

use classifier::ClassifierAdapter;
use decider::EventDecider;
use features::{FeatureLayout, FeatureNormalizer};
use motion::{DerivativeEstimator, NotReady};
use window::SlidingWindow;

pub use decider::DetectionEvent;

/// Why a tick produced no detection event
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Tracker reported the point as not tracked; motion state was reset
    TrackingLost,
    /// First sample after (re)acquisition; used to seed the estimator
    Seeded,
    /// Non-positive or non-finite dt; nothing was mutated
    InvalidDelta,
    /// Position contained NaN or infinity; nothing was mutated
    InvalidPosition,
}

/// Result of one pipeline tick
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TickOutcome {
    Detection(DetectionEvent),
    Skipped { reason: SkipReason },
}

impl TickOutcome {
    pub fn event(&self) -> Option<&DetectionEvent> {
        match self {
            TickOutcome::Detection(event) => Some(event),
            TickOutcome::Skipped { .. } => None,
        }
    }

    pub fn triggered(&self) -> bool {
        self.event().map(|e| e.triggered).unwrap_or(false)
    }
}

/// Running counters for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PipelineStats {
    pub ticks: u64,
    pub inferences: u64,
    pub triggers: u64,
    pub skipped: u64,
    pub inference_failures: u64,
}

pub struct TapPipeline {
    layout: FeatureLayout,
    estimator: DerivativeEstimator,
    normalizer: FeatureNormalizer,
    window: SlidingWindow,
    classifier: ClassifierAdapter,
    decider: EventDecider,
    /// Reused feature vector, one slot per feature
    features: Vec<f32>,
    tracking: bool,
    stats: PipelineStats,
    last_inference: Option<Duration>,
}

impl TapPipeline {
    /// Build a pipeline from a configuration and an inference capability
    ///
    /// The backend is owned by the pipeline and released when it drops (or
    /// immediately, if construction fails).
    pub fn new(
        config: &DetectorConfig,
        mut backend: Box<dyn InferenceBackend>,
    ) -> Result<Self, ConfigError> {
        let (layout, normalizer) = match config.feature_stages() {
            Ok(parts) => parts,
            Err(err) => {
                log_config_error(&err, "TapPipeline::new");
                backend.release();
                return Err(err);
            }
        };
        let feature_count = layout.feature_count();
        let classifier = ClassifierAdapter::new(backend, config.window_size, feature_count)
            .inspect_err(|err| log_config_error(err, "TapPipeline::new"))?;

        tracing::info!(
            "[TapPipeline] Created: axes={:?}, features={}, window={}, threshold={}, pulse={}s",
            layout.axes(),
            feature_count,
            config.window_size,
            config.detection_threshold,
            config.pulse_duration_secs
        );

        Ok(Self {
            estimator: DerivativeEstimator::new(),
            normalizer,
            window: SlidingWindow::new(config.window_size, feature_count),
            classifier,
            decider: EventDecider::new(config.detection_threshold, config.pulse_duration_secs),
            features: vec![0.0; feature_count],
            layout,
            tracking: false,
            stats: PipelineStats::default(),
            last_inference: None,
        })
    }

    /// Run one tick
    ///
    /// Tracking loss and bad samples are handled locally and reported as
    /// `TickOutcome::Skipped`; only inference problems are errors.
    pub fn tick(&mut self, sample: &TrackingSample) -> Result<TickOutcome, PipelineError> {
        self.stats.ticks += 1;

        if !sample.is_tracked {
            if self.tracking {
                tracing::debug!("[TapPipeline] Tracking lost, resetting motion state");
            }
            self.tracking = false;
            self.estimator.reset();
            return Ok(self.skip(SkipReason::TrackingLost, sample.dt));
        }

        if !self.tracking {
            tracing::debug!("[TapPipeline] Tracking acquired");
            self.tracking = true;
        }

        if !sample.position.is_finite() {
            return Ok(self.skip(SkipReason::InvalidPosition, sample.dt));
        }

        let estimate = match self.estimator.estimate(sample.position, sample.dt) {
            Ok(estimate) => estimate,
            Err(NotReady::Seeded) => return Ok(self.skip(SkipReason::Seeded, sample.dt)),
            Err(NotReady::InvalidDelta) => {
                tracing::debug!("[TapPipeline] Ignoring tick with dt={}", sample.dt);
                return Ok(self.skip(SkipReason::InvalidDelta, sample.dt));
            }
        };

        self.layout.fill(&estimate, &mut self.features);
        self.normalizer.normalize_in_place(&mut self.features);
        self.window.push(&self.features);

        let started = Instant::now();
        let probability = match self.classifier.infer(&self.window) {
            Ok(p) => p,
            Err(err) => {
                self.stats.inference_failures += 1;
                self.decider.elapse(sample.dt);
                return Err(err);
            }
        };
        self.last_inference = Some(started.elapsed());
        self.stats.inferences += 1;

        let event = self.decider.decide(probability, sample.dt);
        if event.triggered {
            self.stats.triggers += 1;
            tracing::debug!(
                "[TapPipeline] Tap detected (confidence {:.3})",
                event.confidence
            );
        }

        Ok(TickOutcome::Detection(event))
    }

    fn skip(&mut self, reason: SkipReason, dt: f32) -> TickOutcome {
        self.stats.skipped += 1;
        self.decider.elapse(dt);
        TickOutcome::Skipped { reason }
    }

    /// Return to the freshly constructed state (zeroed window, unseeded
    /// estimator, armed decider). Counters are kept.
    pub fn reset(&mut self) {
        tracing::info!("[TapPipeline] Reset");
        self.estimator.reset();
        self.window.reset();
        self.decider.reset();
        self.tracking = false;
        self.last_inference = None;
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn input_shape(&self) -> TensorShape {
        self.classifier.shape()
    }

    pub fn backend_name(&self) -> &str {
        self.classifier.backend_name()
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    /// Wall time of the most recent successful inference
    pub fn last_inference_latency(&self) -> Option<Duration> {
        self.last_inference
    }

    pub fn window(&self) -> &SlidingWindow {
        &self.window
    }

    pub fn decider(&self) -> &EventDecider {
        &self.decider
    }

    pub fn estimator(&self) -> &DerivativeEstimator {
        &self.estimator
    }
}
