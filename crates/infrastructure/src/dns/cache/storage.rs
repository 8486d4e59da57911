use super::metrics::{CacheMetrics, CacheStats};
use custom_dns_domain::{DnsResponse, ResolutionKey};
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// One eviction pass frees this fraction of capacity.
const EVICTION_BATCH_DIVISOR: usize = 16;

pub(super) struct CacheEntry {
    pub(super) response: Arc<DnsResponse>,
    pub(super) expires_at: Instant,
}

impl CacheEntry {
    #[inline]
    pub(super) fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// TTL-bounded answer cache keyed by `ResolutionKey`.
///
/// Entries are never served at or past their expiry: expired entries are
/// removed by the lookup that finds them and by periodic sweeps. Every
/// `flush()` starts a new generation; stores tagged with an older
/// generation are dropped so an answer obtained before a configuration
/// change cannot repopulate the flushed cache.
pub struct DnsCache {
    pub(super) entries: DashMap<ResolutionKey, CacheEntry, FxBuildHasher>,
    pub(super) max_entries: usize,
    pub(super) metrics: CacheMetrics,
    generation: AtomicU64,
}

impl DnsCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            max_entries: max_entries.max(1),
            metrics: CacheMetrics::default(),
            generation: AtomicU64::new(0),
        }
    }

    pub fn lookup(&self, key: &ResolutionKey) -> Option<Arc<DnsResponse>> {
        let now = Instant::now();

        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                self.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);
                return Some(Arc::clone(&entry.response));
            }
        } else {
            self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
            return None;
        }

        if self
            .entries
            .remove_if(key, |_, entry| entry.is_expired(now))
            .is_some()
        {
            self.metrics.expirations.fetch_add(1, AtomicOrdering::Relaxed);
            debug!(key = %key, "Expired cache entry removed on lookup");
        }
        self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
        None
    }

    /// Live entry for `key` without touching metrics or expiring anything.
    pub fn peek(&self, key: &ResolutionKey) -> Option<Arc<DnsResponse>> {
        let now = Instant::now();
        self.entries
            .get(key)
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| Arc::clone(&entry.response))
    }

    /// Store under the current generation with the response's own TTL.
    pub fn store(&self, key: ResolutionKey, response: Arc<DnsResponse>) -> bool {
        let ttl = response.cache_ttl(0);
        self.store_with_ttl(key, response, ttl, self.generation())
    }

    /// Store with an explicit TTL if `generation` is still current.
    /// Returns whether the entry was kept.
    pub fn store_with_ttl(
        &self,
        key: ResolutionKey,
        response: Arc<DnsResponse>,
        ttl_secs: u32,
        generation: u64,
    ) -> bool {
        if generation != self.generation() {
            self.metrics.stale_stores.fetch_add(1, AtomicOrdering::Relaxed);
            debug!(key = %key, "Dropping answer from a flushed generation");
            return false;
        }

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.make_room();
        }

        let expires_at = Instant::now() + Duration::from_secs(u64::from(ttl_secs));
        self.entries.insert(
            key.clone(),
            CacheEntry {
                response: Arc::clone(&response),
                expires_at,
            },
        );

        // A flush may have run between the generation check and the insert.
        if generation != self.generation() {
            self.entries
                .remove_if(&key, |_, entry| Arc::ptr_eq(&entry.response, &response));
            self.metrics.stale_stores.fetch_add(1, AtomicOrdering::Relaxed);
            return false;
        }

        self.metrics.insertions.fetch_add(1, AtomicOrdering::Relaxed);
        true
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(AtomicOrdering::Acquire)
    }

    /// Drop every entry and start a new generation.
    pub fn flush(&self) {
        self.generation.fetch_add(1, AtomicOrdering::AcqRel);
        let removed = self.entries.len();
        self.entries.clear();
        self.metrics.flushes.fetch_add(1, AtomicOrdering::Relaxed);
        info!(removed, "Cache flushed");
    }

    /// Sweep expired entries; if nothing expired, evict a batch of the
    /// entries closest to expiry so the next inserts find room without a scan.
    fn make_room(&self) {
        if self.sweep() > 0 && self.entries.len() < self.max_entries {
            return;
        }

        let batch = (self.max_entries / EVICTION_BATCH_DIVISOR).max(1);
        let mut candidates: Vec<(Instant, ResolutionKey)> = self
            .entries
            .iter()
            .map(|e| (e.value().expires_at, e.key().clone()))
            .collect();
        if candidates.len() > batch {
            candidates.select_nth_unstable_by_key(batch - 1, |(expires_at, _)| *expires_at);
            candidates.truncate(batch);
        }

        let evicted = candidates
            .into_iter()
            .filter(|(_, key)| self.entries.remove(key).is_some())
            .count();
        if evicted > 0 {
            self.metrics
                .evictions
                .fetch_add(evicted as u64, AtomicOrdering::Relaxed);
            debug!(evicted, "Evicted entries closest to expiry");
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.metrics.snapshot(self.entries.len())
    }
}
