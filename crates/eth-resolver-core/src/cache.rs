//! Concurrent key/value cache with per-entry expiration
//!
//! Entries are stored with either the cache-wide default timeout, no
//! expiration at all, or an explicit duration. Expired entries are reported
//! as absent by [`ExpiringCache::get`] and physically removed by a background
//! sweeper that runs on a fixed interval, independent of entry timeouts.
//!
//! The sweeper holds only a weak reference and exits once the last handle to
//! the cache is dropped.

use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::CacheTimeout;

/// Expiration policy for a single `set`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiration {
    /// Use the cache-wide default timeout
    Default,
    Never,
    After(Duration),
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    expires_at: Option<Instant>,
}

impl<V> Entry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

struct Inner<V> {
    entries: DashMap<String, Entry<V>>,
    default_timeout: CacheTimeout,
}

impl<V> Inner<V> {
    fn delete_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

/// Cache handle; clones share the same entries
pub struct ExpiringCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for ExpiringCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> ExpiringCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create a cache without a background sweeper
    pub fn new(default_timeout: CacheTimeout) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: DashMap::new(),
                default_timeout,
            }),
        }
    }

    /// Create a cache and start sweeping expired entries every `interval`.
    ///
    /// Must be called from within a tokio runtime for the sweeper to start;
    /// outside one the cache still works but expired entries are only
    /// dropped by [`ExpiringCache::delete_expired`].
    pub fn with_sweeper(default_timeout: CacheTimeout, interval: Duration) -> Self {
        let cache = Self::new(default_timeout);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(sweep(Arc::downgrade(&cache.inner), interval));
            }
            Err(_) => {
                tracing::warn!("No tokio runtime, cache sweeper not started");
            }
        }
        cache
    }

    /// Look up a live entry
    pub fn get(&self, key: &str) -> Option<V> {
        let entry = self.inner.entries.get(key)?;
        if entry.is_expired(Instant::now()) {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Insert or replace an entry
    pub fn set(&self, key: impl Into<String>, value: V, expiration: Expiration) {
        let ttl = match expiration {
            Expiration::Default => self.inner.default_timeout.as_duration(),
            Expiration::Never => None,
            Expiration::After(d) => Some(d),
        };
        // A deadline past the clock's range never expires
        let entry = Entry {
            value,
            expires_at: ttl.and_then(|d| Instant::now().checked_add(d)),
        };
        self.inner.entries.insert(key.into(), entry);
    }

    /// Remove every expired entry, returning how many were dropped
    pub fn delete_expired(&self) -> usize {
        self.inner.delete_expired()
    }

    /// Number of stored entries, including expired ones not yet swept
    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub fn default_timeout(&self) -> CacheTimeout {
        self.inner.default_timeout
    }
}

async fn sweep<V>(inner: Weak<Inner<V>>, interval: Duration) {
    let start = tokio::time::Instant::now() + interval;
    let mut ticker = tokio::time::interval_at(start, interval);
    loop {
        ticker.tick().await;
        let Some(inner) = inner.upgrade() else {
            break;
        };
        let removed = inner.delete_expired();
        if removed > 0 {
            tracing::debug!(removed, remaining = inner.entries.len(), "Swept cache");
        }
    }
}
