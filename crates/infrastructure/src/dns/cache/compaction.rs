use super::storage::DnsCache;
use std::sync::atomic::Ordering as AtomicOrdering;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

impl DnsCache {
    /// Physically remove every expired entry. Returns how many went.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_key, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());

        if removed > 0 {
            self.metrics
                .expirations
                .fetch_add(removed as u64, AtomicOrdering::Relaxed);
            debug!(removed, cache_size = self.entries.len(), "Cache sweep completed");
        }
        removed
    }
}

/// Background task that bounds memory held by expired entries nobody asks for.
pub struct CacheSweeper {
    cache: Arc<DnsCache>,
    interval: Duration,
}

impl CacheSweeper {
    pub fn new(cache: Arc<DnsCache>, interval_secs: u64) -> Self {
        Self {
            cache,
            interval: Duration::from_secs(interval_secs),
        }
    }

    pub fn start(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Cache sweeper started");

            let mut ticker = tokio::time::interval_at(Instant::now() + self.interval, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                self.cache.sweep();
            }
        })
    }
}
