use std::collections::HashMap;

use chrono::NaiveDateTime;
use facelog_faceid::{Identity, Resolution};
use parking_lot::Mutex;

use crate::record::{LogRecord, Observation};

/// Buffers observations between flushes.
///
/// [`Accumulator::record`] is called from the frame path,
/// [`Accumulator::drain`] from the flush timer. The buffer is swapped out
/// under the lock, so a drain never iterates a buffer that is still being
/// appended to.
#[derive(Default)]
pub struct Accumulator {
    buf: Mutex<Vec<Observation>>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one observation. Unknowns are buffered too; they are
    /// discarded at drain time.
    pub fn record(&self, resolution: Resolution, timestamp: NaiveDateTime) {
        self.buf.lock().push(Observation {
            resolution,
            timestamp,
        });
    }

    /// Number of buffered observations, unknowns included.
    pub fn len(&self) -> usize {
        self.buf.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.lock().is_empty()
    }

    /// Takes everything buffered so far and returns one record per known
    /// identity, carrying its earliest timestamp. Records are ordered by
    /// first appearance in the buffer.
    pub fn drain(&self) -> Vec<LogRecord> {
        let observations = std::mem::take(&mut *self.buf.lock());
        dedup(observations)
    }
}

fn dedup(observations: Vec<Observation>) -> Vec<LogRecord> {
    let mut index: HashMap<Identity, usize> = HashMap::new();
    let mut records: Vec<LogRecord> = Vec::new();

    for obs in observations {
        let Resolution::Known(identity) = obs.resolution else {
            continue;
        };
        match index.get(&identity) {
            Some(&i) => {
                if obs.timestamp < records[i].timestamp {
                    records[i].timestamp = obs.timestamp;
                }
            }
            None => {
                index.insert(identity.clone(), records.len());
                records.push(LogRecord {
                    identity,
                    timestamp: obs.timestamp,
                });
            }
        }
    }
    records
}
