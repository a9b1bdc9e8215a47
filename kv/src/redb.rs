//! Redb-based persistent key-value store implementation.

use std::path::Path;

use ::redb::{Database, ReadableTable, TableDefinition};

use crate::{KVError, KVResult, KVStore};

/// `(hash, field) -> value`
const HASHES: TableDefinition<(&str, &str), &[u8]> = TableDefinition::new("hashes");

/// `(list, seq) -> value`. Higher sequence numbers sit closer to the head.
const LISTS: TableDefinition<(&str, u64), &str> = TableDefinition::new("lists");

fn storage_err<E: std::fmt::Display>(e: E) -> KVError {
    KVError::Storage(e.to_string())
}

/// A persistent key-value store backed by redb.
pub struct RedbStore {
    db: Database,
}

impl RedbStore {
    /// Open or create a redb store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> KVResult<Self> {
        let db = Database::create(path).map_err(storage_err)?;

        // Create the tables if they don't exist
        let tx = db.begin_write().map_err(storage_err)?;
        {
            let _ = tx.open_table(HASHES).map_err(storage_err)?;
            let _ = tx.open_table(LISTS).map_err(storage_err)?;
        }
        tx.commit().map_err(storage_err)?;

        Ok(Self { db })
    }
}

impl KVStore for RedbStore {
    fn hset(&self, hash: &str, field: &str, value: &[u8]) -> KVResult<()> {
        let tx = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(HASHES).map_err(storage_err)?;
            table.insert((hash, field), value).map_err(storage_err)?;
        }
        tx.commit().map_err(storage_err)?;
        Ok(())
    }

    fn hget(&self, hash: &str, field: &str) -> KVResult<Option<Vec<u8>>> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(HASHES).map_err(storage_err)?;

        match table.get((hash, field)).map_err(storage_err)? {
            Some(value) => Ok(Some(value.value().to_vec())),
            None => Ok(None),
        }
    }

    fn hgetall(&self, hash: &str) -> KVResult<Vec<(String, Vec<u8>)>> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(HASHES).map_err(storage_err)?;

        let mut results = Vec::new();
        for item in table.range((hash, "")..).map_err(storage_err)? {
            let (key, value) = item.map_err(storage_err)?;
            let (h, field) = key.value();
            if h != hash {
                break;
            }
            results.push((field.to_string(), value.value().to_vec()));
        }
        Ok(results)
    }

    fn lpush(&self, list: &str, values: &[&str]) -> KVResult<()> {
        let tx = self.db.begin_write().map_err(storage_err)?;
        {
            let mut table = tx.open_table(LISTS).map_err(storage_err)?;
            let mut next = match table
                .range((list, 0u64)..=(list, u64::MAX))
                .map_err(storage_err)?
                .next_back()
            {
                Some(item) => item.map_err(storage_err)?.0.value().1 + 1,
                None => 0,
            };
            for value in values {
                table.insert((list, next), *value).map_err(storage_err)?;
                next += 1;
            }
        }
        tx.commit().map_err(storage_err)?;
        Ok(())
    }

    fn lrange(&self, list: &str) -> KVResult<Vec<String>> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(LISTS).map_err(storage_err)?;

        let mut results = Vec::new();
        for item in table
            .range((list, 0u64)..=(list, u64::MAX))
            .map_err(storage_err)?
            .rev()
        {
            let (_, value) = item.map_err(storage_err)?;
            results.push(value.value().to_string());
        }
        Ok(results)
    }

    fn llen(&self, list: &str) -> KVResult<usize> {
        let tx = self.db.begin_read().map_err(storage_err)?;
        let table = tx.open_table(LISTS).map_err(storage_err)?;

        let mut n = 0;
        for item in table
            .range((list, 0u64)..=(list, u64::MAX))
            .map_err(storage_err)?
        {
            item.map_err(storage_err)?;
            n += 1;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_redb_hash() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        store.hset("reg", "alice", b"v1").unwrap();
        store.hset("reg", "alice", b"v2").unwrap();
        store.hset("reg", "bob", b"v3").unwrap();
        store.hset("regx", "carol", b"v4").unwrap();

        assert_eq!(store.hget("reg", "alice").unwrap(), Some(b"v2".to_vec()));
        let all = store.hgetall("reg").unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].0, "alice");
        assert_eq!(all[1].0, "bob");
        assert!(store.hgetall("missing").unwrap().is_empty());
        assert_eq!(store.hget("reg", "carol").unwrap(), None);
        assert_eq!(store.hget("regx", "carol").unwrap(), Some(b"v4".to_vec()));
    }

    #[test]
    fn test_redb_list() {
        let dir = tempdir().unwrap();
        let store = RedbStore::open(dir.path().join("test.redb")).unwrap();

        assert_eq!(store.llen("logs").unwrap(), 0);
        store.lpush("logs", &["a", "b"]).unwrap();
        store.lpush("logs", &["c"]).unwrap();
        store.lpush("other", &["z"]).unwrap();

        assert_eq!(store.lrange("logs").unwrap(), vec!["c", "b", "a"]);
        assert_eq!(store.llen("logs").unwrap(), 3);
        assert_eq!(store.lrange("other").unwrap(), vec!["z"]);
    }

    #[test]
    fn test_redb_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.redb");
        {
            let store = RedbStore::open(&path).unwrap();
            store.hset("reg", "alice", b"v1").unwrap();
            store.lpush("logs", &["a"]).unwrap();
        }
        let store = RedbStore::open(&path).unwrap();
        assert_eq!(store.hget("reg", "alice").unwrap(), Some(b"v1".to_vec()));
        assert_eq!(store.lrange("logs").unwrap(), vec!["a"]);
    }
}
