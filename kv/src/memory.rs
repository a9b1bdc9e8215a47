//! In-memory key-value store implementation for testing.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use crate::{KVError, KVResult, KVStore};

#[derive(Default)]
struct Inner {
    hashes: HashMap<String, BTreeMap<String, Vec<u8>>>,
    lists: HashMap<String, VecDeque<String>>,
}

/// An in-memory key-value store. Clones share the same data.
#[derive(Clone)]
pub struct MemoryStore {
    data: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(Mutex::new(Inner::default())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KVStore for MemoryStore {
    fn hset(&self, hash: &str, field: &str, value: &[u8]) -> KVResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        data.hashes
            .entry(hash.to_string())
            .or_default()
            .insert(field.to_string(), value.to_vec());
        Ok(())
    }

    fn hget(&self, hash: &str, field: &str) -> KVResult<Option<Vec<u8>>> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(data.hashes.get(hash).and_then(|h| h.get(field)).cloned())
    }

    fn hgetall(&self, hash: &str) -> KVResult<Vec<(String, Vec<u8>)>> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(data
            .hashes
            .get(hash)
            .map(|h| h.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    fn lpush(&self, list: &str, values: &[&str]) -> KVResult<()> {
        let mut data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        let entries = data.lists.entry(list.to_string()).or_default();
        for value in values {
            entries.push_front(value.to_string());
        }
        Ok(())
    }

    fn lrange(&self, list: &str) -> KVResult<Vec<String>> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(data
            .lists
            .get(list)
            .map(|l| l.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn llen(&self, list: &str) -> KVResult<usize> {
        let data = self
            .data
            .lock()
            .map_err(|e| KVError::Storage(e.to_string()))?;
        Ok(data.lists.get(list).map_or(0, VecDeque::len))
    }
}
