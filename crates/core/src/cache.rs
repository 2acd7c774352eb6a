//! Expiring key-value cache seam.
//!
//! The admin checker and the XSRF module take this as an injected
//! dependency so tests can substitute a deterministic in-memory cache.
//! An absent entry means "unknown" and is distinct from an empty value.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;

/// A string-valued cache with per-entry time-to-live.
///
/// Structured values (such as the admin email list) are JSON-encoded by
/// callers, which keeps "empty list" representable and distinct from a
/// missing entry.
#[async_trait]
pub trait ExpiringCache: Send + Sync {
    /// Returns the value if present and still fresh, `None` otherwise.
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str, ttl: Duration);
}

/// Process-local [`ExpiringCache`] backed by a mutex-guarded map.
///
/// Expired entries are dropped lazily on read.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExpiringCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.entries.lock();
        match entries.get(key) {
            Some((value, deadline)) if Instant::now() < *deadline => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), deadline));
    }
}
