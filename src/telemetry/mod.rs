//! Diagnostics telemetry for the tap pipeline.
//!
//! Inference latency, taps, sample queue occupancy, tracking transitions and
//! errors are published to a single process-wide hub. The hub keeps a bounded
//! history for CLI reports and fans every event out on a broadcast channel
//! for live subscribers.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use once_cell::sync::Lazy;
use tokio::sync::broadcast;

use crate::analysis::DetectionEvent;

pub mod events;

pub use events::{DiagnosticError, MetricEvent, TrackingPhase};

const CHANNEL_CAPACITY: usize = 256;
const HISTORY_CAPACITY: usize = 64;
const LATENCY_WINDOW: usize = 32;

/// Minimum change in queue occupancy, in percentage points, worth reporting
const QUEUE_GAUGE_STEP: f32 = 2.5;

static HUB: Lazy<TelemetryHub> =
    Lazy::new(|| TelemetryHub::new(CHANNEL_CAPACITY, HISTORY_CAPACITY, LATENCY_WINDOW));

/// Process-wide telemetry hub
pub fn hub() -> &'static TelemetryHub {
    &HUB
}

/// Serializable view of the retained history
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct TelemetrySnapshot {
    pub recent: Vec<MetricEvent>,
    pub total_events: u64,
    pub dropped_events: u64,
}

/// Poisoned locks are recovered; the guarded data is plain counters.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Bounded event history, oldest first
struct History {
    events: VecDeque<MetricEvent>,
    capacity: usize,
    total: u64,
    dropped: u64,
}

impl History {
    fn push(&mut self, event: MetricEvent) {
        self.total += 1;
        if self.events.len() == self.capacity {
            self.events.pop_front();
            self.dropped += 1;
        }
        self.events.push_back(event);
    }
}

/// Rolling window of inference latencies
struct LatencyWindow {
    samples: VecDeque<Duration>,
    capacity: usize,
}

impl LatencyWindow {
    /// Add `elapsed` and return `(avg_ms, max_ms, count)` over the window
    fn record(&mut self, elapsed: Duration) -> (f32, f32, usize) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);

        let count = self.samples.len();
        let total: Duration = self.samples.iter().sum();
        let max = self.samples.iter().max().copied().unwrap_or_default();
        let avg_ms = total.as_secs_f32() * 1000.0 / count as f32;
        (avg_ms, max.as_secs_f32() * 1000.0, count)
    }
}

pub struct TelemetryHub {
    tx: broadcast::Sender<MetricEvent>,
    history: Mutex<History>,
    latency: Mutex<LatencyWindow>,
    queue_gauges: Mutex<HashMap<&'static str, f32>>,
}

impl TelemetryHub {
    fn new(channel_capacity: usize, history_capacity: usize, latency_window: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity);
        Self {
            tx,
            history: Mutex::new(History {
                events: VecDeque::with_capacity(history_capacity),
                capacity: history_capacity,
                total: 0,
                dropped: 0,
            }),
            latency: Mutex::new(LatencyWindow {
                samples: VecDeque::with_capacity(latency_window),
                capacity: latency_window,
            }),
            queue_gauges: Mutex::new(HashMap::new()),
        }
    }

    /// Live feed of every event published after this call
    pub fn subscribe(&self) -> broadcast::Receiver<MetricEvent> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> TelemetrySnapshot {
        let history = lock(&self.history);
        TelemetrySnapshot {
            recent: history.events.iter().cloned().collect(),
            total_events: history.total,
            dropped_events: history.dropped,
        }
    }

    fn publish(&self, event: MetricEvent) {
        lock(&self.history).push(event.clone());
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    /// Publish a `Tap` metric for triggered events; other ticks are ignored
    pub fn record_detection(&self, event: &DetectionEvent) {
        if event.triggered {
            self.publish(MetricEvent::Tap {
                confidence: event.confidence,
                timestamp_ms: now_timestamp_ms(),
            });
        }
    }

    pub fn record_inference_latency(&self, elapsed: Duration) {
        let (avg_ms, max_ms, sample_count) = lock(&self.latency).record(elapsed);
        self.publish(MetricEvent::InferenceLatency {
            avg_ms,
            max_ms,
            sample_count,
        });
    }

    /// Publish occupancy for `channel` when it moved by at least
    /// `QUEUE_GAUGE_STEP` since the last report
    pub fn record_queue_occupancy(&self, channel: &'static str, percent: f32) {
        let percent = percent.clamp(0.0, 100.0);
        {
            let mut gauges = lock(&self.queue_gauges);
            let unchanged = gauges
                .get(channel)
                .is_some_and(|last| (last - percent).abs() < QUEUE_GAUGE_STEP);
            if unchanged {
                return;
            }
            gauges.insert(channel, percent);
        }
        self.publish(MetricEvent::QueueOccupancy {
            channel: channel.to_string(),
            percent,
        });
    }

    pub fn record_tracking(&self, phase: TrackingPhase) {
        self.publish(MetricEvent::Tracking {
            phase,
            timestamp_ms: now_timestamp_ms(),
        });
    }

    pub fn record_error(&self, code: DiagnosticError, context: impl Into<String>) {
        self.publish(MetricEvent::Error {
            code,
            context: context.into(),
        });
    }
}

fn now_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
