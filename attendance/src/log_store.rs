use std::sync::Arc;

use facelog_kv::KVStore;
use tracing::warn;

use crate::{AttendanceError, LogRecord};

/// Default list name holding attendance entries.
pub const DEFAULT_LOG_LIST: &str = "attendance:logs";

/// Append-only attendance log over a [`KVStore`] list.
///
/// Entries are pushed to the head, so [`LogStore::read_all`] returns the
/// most recent first. This type never rewrites or removes entries.
#[derive(Clone)]
pub struct LogStore {
    kv: Arc<dyn KVStore>,
    list: String,
}

impl LogStore {
    pub fn new(kv: Arc<dyn KVStore>) -> Self {
        Self {
            kv,
            list: DEFAULT_LOG_LIST.to_string(),
        }
    }

    /// Uses a different list name.
    pub fn with_list(mut self, list: impl Into<String>) -> Self {
        self.list = list.into();
        self
    }

    pub fn list(&self) -> &str {
        &self.list
    }

    /// Appends `records` in one write. Returns how many were written.
    pub fn append(&self, records: &[LogRecord]) -> Result<usize, AttendanceError> {
        if records.is_empty() {
            return Ok(0);
        }
        let encoded: Vec<String> = records.iter().map(LogRecord::encode).collect();
        let refs: Vec<&str> = encoded.iter().map(String::as_str).collect();
        self.kv.lpush(&self.list, &refs)?;
        Ok(records.len())
    }

    /// Reads every entry, most recent first. Malformed entries are logged
    /// and skipped.
    pub fn read_all(&self) -> Result<Vec<LogRecord>, AttendanceError> {
        let entries = self.kv.lrange(&self.list)?;
        Ok(entries
            .iter()
            .filter_map(|entry| match LogRecord::parse(entry) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(list = %self.list, error = %e, "skipping log entry");
                    None
                }
            })
            .collect())
    }

    /// Number of stored entries, malformed ones included.
    pub fn len(&self) -> Result<usize, AttendanceError> {
        Ok(self.kv.llen(&self.list)?)
    }
}
