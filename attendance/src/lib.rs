//! Attendance logging for face matching sessions.
//!
//! # Flow
//!
//! ```text
//! frame -> FaceEmbedder -> Matcher -> Accumulator::record      (frame path)
//!                                      Accumulator::drain -> LogStore   (every interval)
//! ```
//!
//! The [`Accumulator`] is shared between the two paths and swapped out
//! atomically on drain. Each drain yields at most one [`LogRecord`] per
//! identity, carrying the earliest timestamp seen in that interval, and
//! never any unknowns. The [`Flusher`] runs the drain on a fixed wall-clock
//! interval whether or not frames arrive; [`Session`] wires everything
//! together and flushes the last partial interval on [`Session::finish`].
//!
//! # Persisted format
//!
//! Entries are strings `"{name}@{role}@{YYYY-MM-DD HH:MM:SS}"` pushed to
//! the head of one list, so reading the list yields the newest first.

mod accumulator;
mod error;
mod flusher;
mod log_store;
mod record;
mod session;

pub use accumulator::Accumulator;
pub use error::AttendanceError;
pub use flusher::{
    FlushEvent, FlushStats, Flusher, FlusherConfig, DEFAULT_FLUSH_INTERVAL, DEFAULT_STORE_TIMEOUT,
};
pub use log_store::{LogStore, DEFAULT_LOG_LIST};
pub use record::{LogRecord, Observation, TIME_FORMAT};
pub use session::{FaceMatch, Session};
