//! Batch lifecycle events and a synchronous in-process event bus.

use std::panic::{catch_unwind, AssertUnwindSafe};

/// Everything a batch run reports, in emission order.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchEvent {
    BatchStarted {
        count: usize,
    },
    JobStarted {
        index: usize,
        count: usize,
        file_name: String,
    },
    JobProgress {
        index: usize,
        count: usize,
        file_name: String,
        /// Progress of this job alone, 0..=100.
        local_percent: i32,
        /// Progress of the whole batch, within this job's slice.
        batch_percent: f64,
        message: String,
    },
    JobCompleted {
        index: usize,
        count: usize,
        file_name: String,
        success: bool,
        error: Option<String>,
    },
    BatchCompleted {
        count: usize,
        succeeded: usize,
        failed: usize,
    },
}

impl BatchEvent {
    pub fn name(&self) -> &'static str {
        match self {
            BatchEvent::BatchStarted { .. } => "batch-started",
            BatchEvent::JobStarted { .. } => "job-started",
            BatchEvent::JobProgress { .. } => "job-progress",
            BatchEvent::JobCompleted { .. } => "job-completed",
            BatchEvent::BatchCompleted { .. } => "batch-completed",
        }
    }
}

/// Destination for batch events. The orchestrator receives one per run.
pub trait EventSink: Send + Sync {
    fn publish(&self, event: &BatchEvent);
}

/// Sink that drops every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn publish(&self, _event: &BatchEvent) {}
}

/// One listener on an `EventBus`.
pub trait Subscriber: Send + Sync {
    fn on_event(&self, event: &BatchEvent) -> anyhow::Result<()>;
}

impl<F> Subscriber for F
where
    F: Fn(&BatchEvent) -> anyhow::Result<()> + Send + Sync,
{
    fn on_event(&self, event: &BatchEvent) -> anyhow::Result<()> {
        self(event)
    }
}

/// Fans events out to subscribers in registration order.
///
/// A subscriber that errors or panics is logged and skipped; delivery to the
/// rest continues and the publisher never sees the failure. Subscribe before
/// handing the bus to a run.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<Box<dyn Subscriber>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl EventSink for EventBus {
    fn publish(&self, event: &BatchEvent) {
        for (slot, subscriber) in self.subscribers.iter().enumerate() {
            match catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::warn!(
                        subscriber = slot,
                        event = event.name(),
                        "subscriber failed: {:#}",
                        e
                    );
                }
                Err(_) => {
                    tracing::warn!(
                        subscriber = slot,
                        event = event.name(),
                        "subscriber panicked"
                    );
                }
            }
        }
    }
}
