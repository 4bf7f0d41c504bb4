//! Buffered object-storage transport.
//!
//! Entries accumulate in memory and are flushed as a single newline-joined
//! object when the capacity threshold is reached, when a registered schedule
//! fires, or on an explicit `flush()`. The append and its threshold check
//! share one lock acquisition, and a flush snapshots-and-clears the buffer
//! under the same mutex: entries appended after the snapshot point belong to
//! the next batch, so no entry is lost or double-flushed regardless of how
//! the triggers interleave.
//!
//! The storage write runs on the runtime as a spawned task and never blocks
//! the logging caller. A failed write is reported (tracing + the optional
//! failure channel) and the batch is dropped: delivery is at-most-once.

use crate::domain::level::{Level, LevelSet};
use crate::error::{DeliveryFailure, SkylogError};
use crate::port::{FlushScheduler, ObjectStore, ScheduleHandle};
use crate::transport::Transport;
use bytes::Bytes;
use chrono::{SecondsFormat, Utc};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use uuid::Uuid;

pub struct BufferedTransport {
    bucket: String,
    key_prefix: String,
    /// `None` means the buffer is unbounded and only drains on schedule or
    /// explicit flush.
    threshold: Option<usize>,
    levels: LevelSet,
    buffer: Mutex<Vec<String>>,
    seq: AtomicU64,
    store: Arc<dyn ObjectStore>,
    runtime: Handle,
    closed: CancellationToken,
    schedule: Mutex<Option<ScheduleHandle>>,
    failures: Option<mpsc::UnboundedSender<DeliveryFailure>>,
}

impl BufferedTransport {
    pub fn builder(bucket: impl Into<String>, key_prefix: impl Into<String>) -> Builder {
        Builder {
            bucket: bucket.into(),
            key_prefix: key_prefix.into(),
            threshold: None,
            levels: LevelSet::non_access(),
            schedule: None,
            failures: None,
        }
    }

    /// Drains the buffer and dispatches it as one batch. Empty buffer is a
    /// no-op: no storage write is issued.
    pub fn flush(&self) {
        let snapshot = std::mem::take(&mut *self.buffer.lock());
        if snapshot.is_empty() {
            return;
        }
        self.dispatch(snapshot);
    }

    /// Number of entries currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Submits a snapshot to storage without blocking the caller. The batch's
    /// fate is independent of the live buffer from this point on.
    fn dispatch(&self, entries: Vec<String>) {
        let batch_id = Uuid::new_v4();
        let count = entries.len();
        let key = self.next_key();
        let payload = Bytes::from(entries.join("\n"));
        let bucket = self.bucket.clone();
        let store = Arc::clone(&self.store);
        let failures = self.failures.clone();

        debug!(%batch_id, count, %key, "Dispatching log batch");

        self.runtime.spawn(async move {
            match store.put(bucket.clone(), key.clone(), payload).await {
                Ok(()) => {
                    info!(%batch_id, count, %key, "Flushed log batch to storage");
                }
                Err(e) => {
                    error!(%batch_id, count, %key, error = %e, "Failed to deliver log batch, dropping it");
                    if let Some(tx) = failures {
                        let _ = tx.send(DeliveryFailure {
                            bucket,
                            key,
                            entries: count,
                            error: e,
                        });
                    }
                }
            }
        });
    }

    /// Destination key for the next batch. The sequence suffix keeps two
    /// flushes within the same clock resolution from overwriting each other.
    fn next_key(&self) -> String {
        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{}{ts}-{seq:06}", self.key_prefix)
    }
}

impl Transport for BufferedTransport {
    fn log(&self, level: Level, entry: &str) {
        if self.closed.is_cancelled() || !self.levels.contains(level) {
            return;
        }

        // Append and threshold check are one critical section; the snapshot
        // happens under the same lock acquisition so concurrent appends can
        // neither double-trigger a flush nor observe a half-drained buffer.
        let snapshot = {
            let mut buffer = self.buffer.lock();
            buffer.push(entry.to_owned());
            if self.threshold.is_some_and(|t| buffer.len() >= t) {
                Some(std::mem::take(&mut *buffer))
            } else {
                None
            }
        };

        if let Some(entries) = snapshot {
            self.dispatch(entries);
        }
    }

    fn flush(&self) {
        BufferedTransport::flush(self);
    }

    fn shutdown(&self) {
        self.closed.cancel();
        if let Some(handle) = self.schedule.lock().take() {
            handle.cancel();
        }
        // Final best-effort drain; in-flight writes may still complete.
        self.flush();
    }
}

pub struct Builder {
    bucket: String,
    key_prefix: String,
    threshold: Option<usize>,
    levels: LevelSet,
    schedule: Option<String>,
    failures: Option<mpsc::UnboundedSender<DeliveryFailure>>,
}

impl Builder {
    /// Maximum buffered entries before an automatic flush. Must be at least 1.
    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn levels(mut self, levels: LevelSet) -> Self {
        self.levels = levels;
        self
    }

    /// Recurring flush schedule, in the scheduler's own spec grammar.
    pub fn schedule(mut self, spec: impl Into<String>) -> Self {
        self.schedule = Some(spec.into());
        self
    }

    /// Channel receiving a [`DeliveryFailure`] for every dropped batch.
    pub fn on_delivery_failure(mut self, tx: mpsc::UnboundedSender<DeliveryFailure>) -> Self {
        self.failures = Some(tx);
        self
    }

    /// Builds the transport and registers its schedule, if any.
    ///
    /// Must be called within a Tokio runtime; flushes are spawned onto it.
    /// The scheduler callback holds only a `Weak` reference, so the schedule
    /// registration does not keep a dropped transport alive.
    pub fn build(
        self,
        store: Arc<dyn ObjectStore>,
        scheduler: &dyn FlushScheduler,
    ) -> Result<Arc<BufferedTransport>, SkylogError> {
        if self.bucket.trim().is_empty() {
            return Err(SkylogError::Config("destination bucket is required".into()));
        }
        if self.threshold == Some(0) {
            return Err(SkylogError::Config(
                "capacity threshold must be at least 1".into(),
            ));
        }
        let runtime = Handle::try_current().map_err(|_| {
            SkylogError::Config("BufferedTransport requires a running Tokio runtime".into())
        })?;

        let transport = Arc::new(BufferedTransport {
            bucket: self.bucket,
            key_prefix: self.key_prefix,
            threshold: self.threshold,
            levels: self.levels,
            buffer: Mutex::new(Vec::new()),
            seq: AtomicU64::new(0),
            store,
            runtime,
            closed: CancellationToken::new(),
            schedule: Mutex::new(None),
            failures: self.failures,
        });

        if let Some(spec) = self.schedule {
            let weak: Weak<BufferedTransport> = Arc::downgrade(&transport);
            let handle = scheduler.schedule(
                &spec,
                Box::new(move || {
                    if let Some(transport) = weak.upgrade() {
                        transport.flush();
                    }
                }),
            )?;
            *transport.schedule.lock() = Some(handle);
        }

        Ok(transport)
    }
}
