//! Injectable cache for loaded row-sets, keyed by source locator.
//!
//! Keeps the transformation core pure: callers decide whether repeated
//! loads hit the network/disk or a warm cache.

use std::collections::BTreeMap;
use std::sync::Mutex;

use populate_model::RawRow;

pub trait RowCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Vec<RawRow>>;
    fn put(&self, key: &str, rows: &[RawRow]);
}

/// Cache that never stores anything; every load is fresh.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCache;

impl RowCache for NoCache {
    fn get(&self, _key: &str) -> Option<Vec<RawRow>> {
        None
    }

    fn put(&self, _key: &str, _rows: &[RawRow]) {}
}

/// In-memory cache shared across datasets within one run.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<BTreeMap<String, Vec<RawRow>>>,
}

impl RowCache for MemoryCache {
    fn get(&self, key: &str) -> Option<Vec<RawRow>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, rows: &[RawRow]) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), rows.to_vec());
        }
    }
}
