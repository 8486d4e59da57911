use super::config::ChainConfig;
use super::exchange::UpstreamExchange;
use super::fallback::{AttemptOutcome, NextStep};
use super::snapshot::{ConfigSnapshot, SnapshotStore};
use crate::dns::cache::DnsCache;
use crate::dns::forwarding::MessageBuilder;
use crate::dns::inflight::{InFlightCoordinator, InFlightStats};
use async_trait::async_trait;
use custom_dns_application::ports::DnsResolver;
use custom_dns_domain::{
    DnsQuery, DnsResponse, Protocol, RecordType, ResolutionKey, ResponseCode, ServerEndpoint,
};
use smallvec::SmallVec;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Cache, in-flight coordination and the ordered fallback loop behind one
/// `resolve` call.
///
/// Cloning is cheap; clones share every piece of state.
#[derive(Clone)]
pub struct ResolverChain {
    inner: Arc<ChainInner>,
}

struct ChainInner {
    snapshot: SnapshotStore,
    cache: Option<Arc<DnsCache>>,
    inflight: InFlightCoordinator,
    exchange: Arc<dyn UpstreamExchange>,
    config: ChainConfig,
}

impl ResolverChain {
    pub(super) fn new(
        exchange: Arc<dyn UpstreamExchange>,
        cache: Option<Arc<DnsCache>>,
        endpoints: Vec<ServerEndpoint>,
        config: ChainConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ChainInner {
                snapshot: SnapshotStore::new(endpoints),
                cache,
                inflight: InFlightCoordinator::new(),
                exchange,
                config,
            }),
        }
    }

    pub async fn resolve(&self, name: &str, record_type: RecordType) -> Arc<DnsResponse> {
        self.resolve_key(ResolutionKey::new(name, record_type)).await
    }

    pub async fn resolve_key(&self, key: ResolutionKey) -> Arc<DnsResponse> {
        // Generation before snapshot: a configuration change swaps the
        // snapshot and then flushes, so a stale snapshot implies a stale
        // generation and its answer is never stored.
        let generation = self.inner.cache.as_ref().map_or(0, |c| c.generation());
        let snapshot = self.inner.snapshot.load();

        if !snapshot.is_active() {
            debug!(domain = %key.name, "No servers configured");
            return Arc::new(DnsResponse::synthetic(ResponseCode::ServerFailure));
        }

        if let Some(hit) = self.inner.cache.as_ref().and_then(|c| c.lookup(&key)) {
            debug!(domain = %key.name, record_type = %key.record_type, "Cache HIT");
            return hit;
        }

        let inner = Arc::clone(&self.inner);
        let producer_key = key.clone();
        let version = snapshot.version;

        self.inner
            .inflight
            .join_or_start(key, version, move || async move {
                inner.produce(producer_key, snapshot, generation).await
            })
            .await
    }

    /// Install a new server list, flush the cache and release transports of
    /// servers no longer configured.
    pub fn apply_servers(&self, endpoints: Vec<ServerEndpoint>) {
        let snapshot = self.inner.snapshot.replace(endpoints);
        if let Some(cache) = &self.inner.cache {
            cache.flush();
        }
        self.inner.exchange.retain(&snapshot.endpoints);

        info!(
            version = snapshot.version,
            servers = snapshot.endpoints.len(),
            "Server configuration applied"
        );
    }

    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.inner.snapshot.load()
    }

    pub fn cache(&self) -> Option<&Arc<DnsCache>> {
        self.inner.cache.as_ref()
    }

    pub fn inflight_stats(&self) -> InFlightStats {
        self.inner.inflight.stats()
    }
}

impl ChainInner {
    async fn produce(
        &self,
        key: ResolutionKey,
        snapshot: Arc<ConfigSnapshot>,
        generation: u64,
    ) -> Arc<DnsResponse> {
        // A previous wave may have stored the answer after our lookup missed.
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.peek(&key)) {
            return hit;
        }

        match tokio::time::timeout(
            self.config.resolution_timeout,
            self.run_attempt(&key, &snapshot, generation),
        )
        .await
        {
            Ok(response) => response,
            Err(_) => {
                warn!(
                    domain = %key.name,
                    record_type = %key.record_type,
                    timeout_ms = self.config.resolution_timeout.as_millis() as u64,
                    "Resolution timed out across all servers"
                );
                Arc::new(DnsResponse::synthetic(ResponseCode::Timeout))
            }
        }
    }

    async fn run_attempt(
        &self,
        key: &ResolutionKey,
        snapshot: &ConfigSnapshot,
        generation: u64,
    ) -> Arc<DnsResponse> {
        if let Err(e) = MessageBuilder::query_name(&key.name) {
            debug!(domain = %key.name, error = %e, "Name cannot be queried");
            return Arc::new(DnsResponse::synthetic(ResponseCode::Malformed));
        }

        let mut abandoned: SmallVec<[&ServerEndpoint; 2]> = SmallVec::new();

        for endpoint in snapshot.endpoints.iter() {
            if abandoned.contains(&endpoint) {
                continue;
            }

            let mut target = endpoint.clone();
            let mut query = DnsQuery::new(key.clone(), fastrand::u16(..));
            let mut timeout_retried = false;
            let mut over_tcp = false;
            let mut attempt: u32 = 1;

            loop {
                let result = self
                    .exchange
                    .exchange(&query, &target, self.config.attempt_timeout)
                    .await;
                let outcome = AttemptOutcome::classify(result, target.protocol);

                debug!(
                    domain = %key.name,
                    record_type = %key.record_type,
                    server = %target,
                    protocol = %target.protocol,
                    attempt,
                    outcome = outcome.kind(),
                    "Upstream attempt finished"
                );

                match outcome.next_step(timeout_retried, over_tcp) {
                    NextStep::Finish => return self.finish(key, outcome, generation),
                    NextStep::RetryWithFreshId => {
                        timeout_retried = true;
                        query = query.with_fresh_id(fastrand::u16(..));
                    }
                    NextStep::RetryOverTcp => {
                        over_tcp = true;
                        target = endpoint.with_protocol(Protocol::Tcp);
                        query = query.with_fresh_id(fastrand::u16(..));
                        debug!(server = %endpoint, "Truncated over UDP, retrying over TCP");
                    }
                    NextStep::AbandonEndpoint => {
                        warn!(
                            domain = %key.name,
                            server = %target,
                            error = outcome.kind(),
                            "Skipping server for this resolution"
                        );
                        abandoned.push(endpoint);
                        break;
                    }
                    NextStep::NextEndpoint => {
                        warn!(
                            domain = %key.name,
                            server = %target,
                            attempt,
                            error = outcome.kind(),
                            "Server failed, trying next"
                        );
                        break;
                    }
                }
                attempt += 1;
            }
        }

        warn!(
            domain = %key.name,
            record_type = %key.record_type,
            servers = snapshot.endpoints.len(),
            "All servers exhausted"
        );
        Arc::new(DnsResponse::synthetic(ResponseCode::ServerFailure))
    }

    fn finish(
        &self,
        key: &ResolutionKey,
        outcome: AttemptOutcome,
        generation: u64,
    ) -> Arc<DnsResponse> {
        let (response, ttl) = match outcome {
            AttemptOutcome::Answer(response) => {
                let ttl = response.cache_ttl(self.config.ttl_floor);
                (response, ttl)
            }
            AttemptOutcome::NameNotFound(response) => {
                let ttl = response.cache_ttl(self.config.negative_ttl);
                (response, ttl)
            }
            other => {
                warn!(outcome = other.kind(), "Non-terminal outcome reached finish");
                return Arc::new(DnsResponse::synthetic(ResponseCode::ServerFailure));
            }
        };

        let ttl = ttl.min(self.config.max_ttl);
        let response = Arc::new(response);
        if let Some(cache) = &self.cache {
            cache.store_with_ttl(key.clone(), Arc::clone(&response), ttl, generation);
        }
        response
    }
}

#[async_trait]
impl DnsResolver for ResolverChain {
    async fn resolve(&self, key: &ResolutionKey) -> Arc<DnsResponse> {
        self.resolve_key(key.clone()).await
    }

    fn apply_servers(&self, endpoints: Vec<ServerEndpoint>) {
        ResolverChain::apply_servers(self, endpoints);
    }

    fn is_active(&self) -> bool {
        self.inner.snapshot.load().is_active()
    }
}
