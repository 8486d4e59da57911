//! Coalesces concurrent resolutions of the same key into one network query.

use custom_dns_domain::{DnsResponse, ResolutionKey, ResponseCode};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A resolution key scoped to the configuration snapshot it runs against,
/// so callers arriving after a server-list change never join a query sent
/// to the old servers.
pub type InFlightKey = (ResolutionKey, u64);

type Waiters = Vec<oneshot::Sender<Arc<DnsResponse>>>;
type InFlightMap = DashMap<InFlightKey, Waiters, FxBuildHasher>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InFlightStats {
    pub started: u64,
    pub joined: u64,
    pub in_flight: usize,
}

pub struct InFlightCoordinator {
    inflight: Arc<InFlightMap>,
    started: AtomicU64,
    joined: AtomicU64,
}

impl InFlightCoordinator {
    pub fn new() -> Self {
        Self {
            inflight: Arc::new(DashMap::with_hasher(FxBuildHasher)),
            started: AtomicU64::new(0),
            joined: AtomicU64::new(0),
        }
    }

    /// Wait for the in-flight resolution of `key`, or start one with
    /// `producer` if there is none.
    ///
    /// The producer runs on its own task: dropping this future only drops the
    /// caller's interest, never the shared network I/O. Every waiter receives
    /// the same `Arc`.
    pub async fn join_or_start<F, Fut>(
        &self,
        key: ResolutionKey,
        version: u64,
        producer: F,
    ) -> Arc<DnsResponse>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Arc<DnsResponse>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let inflight_key = (key, version);

        let is_leader = match self.inflight.entry(inflight_key.clone()) {
            Entry::Occupied(mut waiting) => {
                waiting.get_mut().push(tx);
                self.joined.fetch_add(1, Ordering::Relaxed);
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(vec![tx]);
                self.started.fetch_add(1, Ordering::Relaxed);
                true
            }
        };

        if is_leader {
            let work = producer();
            let guard = CleanupGuard {
                inflight: Arc::clone(&self.inflight),
                key: Some(inflight_key),
            };
            tokio::spawn(async move {
                let response = work.await;
                guard.complete(response);
            });
        } else {
            debug!(key = %inflight_key.0, "Joined in-flight query");
        }

        match rx.await {
            Ok(response) => response,
            Err(_) => {
                warn!("In-flight query ended without a result");
                Arc::new(DnsResponse::synthetic(ResponseCode::ServerFailure))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.inflight.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inflight.is_empty()
    }

    pub fn stats(&self) -> InFlightStats {
        InFlightStats {
            started: self.started.load(Ordering::Relaxed),
            joined: self.joined.load(Ordering::Relaxed),
            in_flight: self.inflight.len(),
        }
    }
}

impl Default for InFlightCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the in-flight entry exactly once: with a result on completion, or
/// bare (waiters see a closed channel) if the producer task dies.
struct CleanupGuard {
    inflight: Arc<InFlightMap>,
    key: Option<InFlightKey>,
}

impl CleanupGuard {
    fn complete(mut self, response: Arc<DnsResponse>) {
        if let Some(key) = self.key.take() {
            if let Some((_, waiters)) = self.inflight.remove(&key) {
                for waiter in waiters {
                    let _ = waiter.send(Arc::clone(&response));
                }
            }
        }
    }
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.inflight.remove(&key);
        }
    }
}
