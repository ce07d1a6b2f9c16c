// Driver - runs a TapPipeline on a dedicated worker thread
//
// The tracking callback (producer) pushes samples into a lock-free SPSC ring
// buffer; the worker pops them one at a time and runs exactly one tick per
// sample, so the pipeline is still strictly single-threaded. Tick results fan
// out on a broadcast channel.
//
// Sample flow:
// 1. Tracking thread calls TapDriver::submit(sample)
// 2. Sample lands in the rtrb queue (dropped with a warning if full)
// 3. Worker pops the sample and runs TapPipeline::tick
// 4. Worker broadcasts DriverEvent and records telemetry
//
// Inference failures are logged, published as telemetry, broadcast as
// DriverEvent::Failed, and the worker moves on to the next sample.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use futures::{Stream, StreamExt};
use rtrb::{Consumer, PopError, Producer};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

use crate::analysis::{PipelineStats, TapPipeline, TickOutcome};
use crate::error::{log_pipeline_error, ErrorCode};
use crate::telemetry::{self, DiagnosticError, TrackingPhase};
use crate::tracking::TrackingSample;

/// Default capacity of the sample queue
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Capacity of the result broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Result of one tick run on the worker
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DriverEvent {
    Tick { index: u64, outcome: TickOutcome },
    Failed { index: u64, code: i32, reason: String },
}

pub struct TapDriver {
    producer: Producer<TrackingSample>,
    events: broadcast::Sender<DriverEvent>,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<PipelineStats>>,
    capacity: usize,
}

impl TapDriver {
    /// Move `pipeline` onto a new worker thread
    ///
    /// # Panics
    /// Panics if `queue_capacity` is 0
    pub fn spawn(pipeline: TapPipeline, queue_capacity: usize) -> std::io::Result<Self> {
        assert!(queue_capacity > 0, "queue_capacity must be greater than 0");

        let (producer, consumer) = rtrb::RingBuffer::new(queue_capacity);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let running = Arc::new(AtomicBool::new(true));

        let worker = DriverWorker {
            pipeline,
            consumer,
            events: events.clone(),
            running: Arc::clone(&running),
            index: 0,
            tracking: false,
        };
        let handle = thread::Builder::new()
            .name("tap-pipeline".to_string())
            .spawn(move || worker.run())?;

        tracing::info!(
            "[TapDriver] Worker started with queue capacity {}",
            queue_capacity
        );

        Ok(Self {
            producer,
            events,
            running,
            worker: Some(handle),
            capacity: queue_capacity,
        })
    }

    /// Queue a sample for the worker
    ///
    /// Returns false if the queue was full and the sample was dropped.
    pub fn submit(&mut self, sample: TrackingSample) -> bool {
        let accepted = self.producer.push(sample).is_ok();
        if !accepted {
            tracing::warn!("[TapDriver] Sample queue full, dropping sample");
            telemetry::hub().record_error(DiagnosticError::SampleQueueFull, "TapDriver::submit");
        }

        let queued = self.capacity - self.producer.slots();
        telemetry::hub()
            .record_queue_occupancy("samples", queued as f32 / self.capacity as f32 * 100.0);
        accepted
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DriverEvent> {
        self.events.subscribe()
    }

    /// Stream of tick results; lagged receivers skip what they missed
    pub fn event_stream(&self) -> impl Stream<Item = DriverEvent> + Send + 'static {
        BroadcastStream::new(self.events.subscribe())
            .filter_map(|result| async move { result.ok() })
    }

    /// Stop the worker once the queue is drained and return its counters
    pub fn shutdown(mut self) -> Option<PipelineStats> {
        self.stop()
    }

    fn stop(&mut self) -> Option<PipelineStats> {
        self.running.store(false, Ordering::SeqCst);
        let handle = self.worker.take()?;
        match handle.join() {
            Ok(stats) => {
                tracing::info!(
                    "[TapDriver] Worker stopped after {} ticks ({} taps)",
                    stats.ticks,
                    stats.triggers
                );
                Some(stats)
            }
            Err(_) => {
                log::error!("[TapDriver] Worker thread panicked");
                None
            }
        }
    }
}

impl Drop for TapDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

struct DriverWorker {
    pipeline: TapPipeline,
    consumer: Consumer<TrackingSample>,
    events: broadcast::Sender<DriverEvent>,
    running: Arc<AtomicBool>,
    index: u64,
    tracking: bool,
}

impl DriverWorker {
    fn run(mut self) -> PipelineStats {
        tracing::info!("[TapDriver] Starting tick loop");

        loop {
            let sample = match self.consumer.pop() {
                Ok(sample) => sample,
                Err(PopError::Empty) => {
                    // Check shutdown flag only when queue is empty
                    if !self.running.load(Ordering::SeqCst) {
                        tracing::info!("[TapDriver] Shutdown requested and queue empty, exiting");
                        break;
                    }
                    thread::sleep(Duration::from_millis(1));
                    continue;
                }
            };

            self.process(&sample);
        }

        self.pipeline.stats()
    }

    fn process(&mut self, sample: &TrackingSample) {
        let index = self.index;
        self.index += 1;

        let event = match self.pipeline.tick(sample) {
            Ok(outcome) => {
                if let TickOutcome::Detection(detection) = &outcome {
                    telemetry::hub().record_detection(detection);
                    if let Some(latency) = self.pipeline.last_inference_latency() {
                        telemetry::hub().record_inference_latency(latency);
                    }
                }
                DriverEvent::Tick { index, outcome }
            }
            Err(err) => {
                log_pipeline_error(&err, "TapDriver worker");
                telemetry::hub().record_error(DiagnosticError::InferenceFailure, err.message());
                DriverEvent::Failed {
                    index,
                    code: err.code(),
                    reason: err.message(),
                }
            }
        };

        let tracking = self.pipeline.is_tracking();
        if tracking != self.tracking {
            self.tracking = tracking;
            telemetry::hub().record_tracking(if tracking {
                TrackingPhase::Acquired
            } else {
                TrackingPhase::Lost
            });
        }

        // No subscribers is fine
        let _ = self.events.send(event);
    }
}
