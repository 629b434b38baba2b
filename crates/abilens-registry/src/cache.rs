//! Bounded, time-limited selector cache.
//!
//! Entries live for a fixed TTL. Eviction is lazy: only when an insert
//! pushes the cache past its capacity are expired entries swept, and if
//! that is not enough the oldest entries go too. Concurrent writers for the
//! same selector simply overwrite each other.

use abilens_core::{config::DecoderConfig, resolver::SignatureResolver};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
    time::{Duration, Instant},
};
use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(3_600);
pub const DEFAULT_CAPACITY: usize = 1_000;

#[derive(Debug, Clone)]
struct CacheEntry {
    signatures: Vec<String>,
    fetched_at: Instant,
}

#[derive(Debug)]
pub struct SignatureCache {
    ttl: Duration,
    capacity: usize,
    entries: RwLock<HashMap<[u8; 4], CacheEntry>>,
}

impl Default for SignatureCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

impl SignatureCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            ttl,
            capacity,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_config(config: &DecoderConfig) -> Self {
        Self::new(
            Duration::from_secs(config.cache_ttl_secs),
            config.cache_capacity,
        )
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Cached candidates for `selector`, unless missing or expired.
    pub fn get(&self, selector: [u8; 4]) -> Option<Vec<String>> {
        self.get_at(selector, Instant::now())
    }

    pub fn get_at(&self, selector: [u8; 4], now: Instant) -> Option<Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(&selector)
            .filter(|e| !self.is_expired(e, now))
            .map(|e| e.signatures.clone())
    }

    /// Store candidates for `selector`. An empty list is a valid entry.
    pub fn insert(&self, selector: [u8; 4], signatures: Vec<String>) {
        self.insert_at(selector, signatures, Instant::now());
    }

    pub fn insert_at(&self, selector: [u8; 4], signatures: Vec<String>, now: Instant) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(
            selector,
            CacheEntry {
                signatures,
                fetched_at: now,
            },
        );

        if entries.len() > self.capacity {
            let before = entries.len();
            entries.retain(|_, e| !self.is_expired(e, now));
            while entries.len() > self.capacity {
                let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, e)| e.fetched_at)
                    .map(|(k, _)| *k)
                else {
                    break;
                };
                entries.remove(&oldest);
            }
            debug!(evicted = before - entries.len(), "signature cache evicted entries");
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        now.saturating_duration_since(entry.fetched_at) >= self.ttl
    }
}

// ─── Caching resolver ─────────────────────────────────────────────────────────

/// Cache-first wrapper around another resolver.
pub struct CachingResolver<R> {
    inner: R,
    cache: Arc<SignatureCache>,
    name: String,
}

impl<R: SignatureResolver> CachingResolver<R> {
    pub fn new(inner: R, cache: Arc<SignatureCache>) -> Self {
        let name = format!("cached({})", inner.name());
        Self { inner, cache, name }
    }

    pub fn cache(&self) -> &Arc<SignatureCache> {
        &self.cache
    }
}

#[async_trait]
impl<R: SignatureResolver> SignatureResolver for CachingResolver<R> {
    async fn lookup(&self, selector: [u8; 4]) -> Vec<String> {
        if let Some(hit) = self.cache.get(selector) {
            return hit;
        }
        let signatures = self.inner.lookup(selector).await;
        self.cache.insert(selector, signatures.clone());
        signatures
    }

    fn name(&self) -> &str {
        &self.name
    }
}
