//! Periodic drain of an [`Accumulator`] into a [`LogStore`].
//!
//! The flusher is its own task on a wall-clock interval; it does not depend
//! on frames arriving. Delivery is at most once per interval: if the store
//! write fails, the drained records are dropped and the failure is reported,
//! and the timer keeps firing.
//!
//! A write that outlives the store timeout is reported as timed out and left
//! to finish on its own; its records are accounted for once it does. No new
//! write starts until then, so a hung store holds one blocking thread.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{Accumulator, AttendanceError, LogStore};

/// Default time between flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

/// Default bound on one store write.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

const EVENT_BUFFER: usize = 64;

/// Configuration for [`Flusher`].
#[derive(Debug, Clone, Copy)]
pub struct FlusherConfig {
    /// Time between flushes, measured from session start (default: 30s).
    pub interval: Duration,
    /// Maximum wait for one store write before it is reported as timed out
    /// (default: 10s).
    pub store_timeout: Duration,
}

impl Default for FlusherConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_FLUSH_INTERVAL,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Counters over the flusher's lifetime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushStats {
    /// Timer ticks handled, the final shutdown flush excluded.
    pub ticks: u64,
    /// Records written to the store, late writes included.
    pub written: u64,
    /// Records drained but lost to a failed write.
    pub dropped: u64,
    /// Failed writes.
    pub failures: u64,
    /// Writes that outlived the store timeout. Their records are counted
    /// as written or dropped once the write finishes.
    pub timed_out: u64,
}

/// Outcome of a flush that drained at least one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushEvent {
    Flushed { records: usize },
    Failed { dropped: usize, error: String },
    /// The write is still running after the store timeout. A `Flushed` or
    /// `Failed` event follows once it finishes.
    TimedOut { records: usize },
}

/// A store write that outlived its timeout.
struct InFlight {
    handle: JoinHandle<Result<usize, AttendanceError>>,
    records: usize,
}

struct Shared {
    accumulator: Arc<Accumulator>,
    store: LogStore,
    store_timeout: Duration,
    stats: Mutex<FlushStats>,
    events: mpsc::Sender<FlushEvent>,
    in_flight: Mutex<Option<InFlight>>,
}

fn joined(r: Result<Result<usize, AttendanceError>, JoinError>) -> Result<usize, AttendanceError> {
    r.unwrap_or_else(|e| Err(AttendanceError::StoreUnavailable(e.to_string())))
}

impl Shared {
    async fn flush_once(&self) -> Result<usize, AttendanceError> {
        // At most one write runs at a time. While a timed-out write is still
        // going, new records stay buffered for a later tick.
        if !self.settle_in_flight(Duration::ZERO).await {
            debug!("previous write still running, flush deferred");
            return Ok(0);
        }

        let records = self.accumulator.drain();
        if records.is_empty() {
            return Ok(0);
        }
        let n = records.len();

        let store = self.store.clone();
        let mut handle = tokio::task::spawn_blocking(move || store.append(&records));
        match tokio::time::timeout(self.store_timeout, &mut handle).await {
            Ok(r) => {
                let result = joined(r);
                self.settle(n, &result);
                result
            }
            Err(_) => {
                self.stats.lock().timed_out += 1;
                warn!(records = n, timeout = ?self.store_timeout, "attendance write timed out, still running");
                self.emit(FlushEvent::TimedOut { records: n });
                *self.in_flight.lock() = Some(InFlight { handle, records: n });
                Err(AttendanceError::Timeout(self.store_timeout))
            }
        }
    }

    /// Accounts for a timed-out write if it has finished, waiting at most
    /// `wait`. Returns false if it is still running.
    async fn settle_in_flight(&self, wait: Duration) -> bool {
        let write = self.in_flight.lock().take();
        let Some(mut write) = write else {
            return true;
        };
        match tokio::time::timeout(wait, &mut write.handle).await {
            Ok(r) => {
                self.settle(write.records, &joined(r));
                true
            }
            Err(_) => {
                *self.in_flight.lock() = Some(write);
                false
            }
        }
    }

    /// Final drain on shutdown. Gives a stuck write one more store timeout;
    /// if it is still running, whatever is buffered is dropped.
    async fn flush_final(&self) -> Result<usize, AttendanceError> {
        if !self.settle_in_flight(self.store_timeout).await {
            let n = self.accumulator.drain().len();
            let result = Err(AttendanceError::Timeout(self.store_timeout));
            if n > 0 {
                self.settle(n, &result);
            }
            return result;
        }
        self.flush_once().await
    }

    fn settle(&self, n: usize, result: &Result<usize, AttendanceError>) {
        let event = match result {
            Ok(written) => {
                self.stats.lock().written += *written as u64;
                info!(records = *written, list = %self.store.list(), "attendance flushed");
                FlushEvent::Flushed { records: *written }
            }
            Err(e) => {
                {
                    let mut stats = self.stats.lock();
                    stats.dropped += n as u64;
                    stats.failures += 1;
                }
                error!(dropped = n, error = %e, "attendance flush failed");
                FlushEvent::Failed {
                    dropped: n,
                    error: e.to_string(),
                }
            }
        };
        self.emit(event);
    }

    fn emit(&self, event: FlushEvent) {
        if self.events.try_send(event).is_err() {
            debug!("flush event not delivered");
        }
    }
}

/// Handle to a running flush task.
///
/// Dropping the handle without [`Flusher::shutdown`] cancels the timer but
/// skips the final flush.
pub struct Flusher {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    events: Option<mpsc::Receiver<FlushEvent>>,
}

impl Flusher {
    /// Starts the flush timer. The first flush happens one interval from now.
    ///
    /// Must be called from within a tokio runtime. Panics if
    /// `cfg.interval` is zero.
    pub fn spawn(accumulator: Arc<Accumulator>, store: LogStore, cfg: FlusherConfig) -> Self {
        assert!(!cfg.interval.is_zero(), "attendance: flush interval must be positive");

        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let shared = Arc::new(Shared {
            accumulator,
            store,
            store_timeout: cfg.store_timeout,
            stats: Mutex::new(FlushStats::default()),
            events: events_tx,
            in_flight: Mutex::new(None),
        });
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run(shared.clone(), cancel.clone(), cfg.interval));

        Self {
            shared,
            cancel,
            task: Some(task),
            events: Some(events_rx),
        }
    }

    /// Takes the event stream. Returns `None` after the first call.
    ///
    /// Only flushes that drained something produce an event. Events are
    /// dropped while the receiver is full or was never taken.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<FlushEvent>> {
        self.events.take()
    }

    pub fn stats(&self) -> FlushStats {
        *self.shared.stats.lock()
    }

    /// Stops the timer, waits for an in-flight flush, then flushes whatever
    /// is still buffered. Returns the final counters, or the error of the
    /// final flush.
    pub async fn shutdown(mut self) -> Result<FlushStats, AttendanceError> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "flush task ended abnormally");
            }
        }
        self.shared.flush_final().await?;
        Ok(self.stats())
    }
}

impl Drop for Flusher {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run(shared: Arc<Shared>, cancel: CancellationToken, period: Duration) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                shared.stats.lock().ticks += 1;
                // Failures are already counted and logged; the timer keeps going.
                let _ = shared.flush_once().await;
            }
        }
    }
    debug!("flush timer stopped");
}
