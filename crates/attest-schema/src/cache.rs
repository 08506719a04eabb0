//! # Bounded Cache
//!
//! A capacity-bounded, optionally TTL-bounded map used for both the
//! raw-schema cache and the compiled-validator cache. The two caches
//! are independent instances — invalidating one never touches the
//! other.
//!
//! Eviction is insertion-order (oldest key first) once the capacity is
//! reached. Long-running processes therefore hold at most `capacity`
//! entries per cache instead of growing without bound.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Capacity and TTL settings for a [`BoundedCache`].
#[derive(Debug, Clone, Copy)]
pub struct CacheConfig {
    /// Maximum number of entries held at once.
    pub capacity: usize,
    /// Entry lifetime; `None` keeps entries until evicted or cleared.
    pub ttl: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 64,
            ttl: None,
        }
    }
}

struct Slot<V> {
    value: V,
    inserted_at: Instant,
}

struct Inner<V> {
    entries: HashMap<String, Slot<V>>,
    order: VecDeque<String>,
}

/// A bounded, URL-keyed cache.
pub struct BoundedCache<V> {
    config: CacheConfig,
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> BoundedCache<V> {
    /// Create an empty cache with the given bounds.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                order: VecDeque::new(),
            }),
        }
    }

    /// Look up an entry, treating expired entries as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let mut inner = self.inner.lock();
        let expired = match inner.entries.get(key) {
            None => return None,
            Some(slot) => match self.config.ttl {
                Some(ttl) => slot.inserted_at.elapsed() > ttl,
                None => false,
            },
        };
        if expired {
            inner.entries.remove(key);
            inner.order.retain(|k| k != key);
            return None;
        }
        inner.entries.get(key).map(|slot| slot.value.clone())
    }

    /// Insert or replace an entry, evicting the oldest key if the
    /// capacity is reached.
    pub fn insert(&self, key: String, value: V) {
        let mut inner = self.inner.lock();
        if !inner.entries.contains_key(&key) && inner.entries.len() >= self.config.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.entries.remove(&oldest);
            }
        }
        if !inner.entries.contains_key(&key) {
            inner.order.push_back(key.clone());
        }
        inner.entries.insert(
            key,
            Slot {
                value,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
