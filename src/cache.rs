//! Process-local result cache. One mutex around a plain map is enough: reads
//! clone the stored result, and a lost update between two concurrent misses
//! only repeats idempotent work.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::records::ExtractionResult;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

struct CacheEntry {
    result: ExtractionResult,
    created_at: Instant,
}

pub struct ResultCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResultCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    /// A hit only while the entry is inside its TTL; stale entries are removed
    /// on the way out and read as misses.
    pub fn get(&self, key: &str) -> Option<ExtractionResult> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some(entry) if entry.created_at.elapsed() <= self.ttl => {
                let mut result = entry.result.clone();
                result.metadata.from_cache = true;
                Some(result)
            }
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Unconditionally replaces any existing entry for the key.
    pub fn put(&self, key: &str, result: &ExtractionResult) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(
                key.to_string(),
                CacheEntry { result: result.clone(), created_at: Instant::now() },
            );
        }
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}
