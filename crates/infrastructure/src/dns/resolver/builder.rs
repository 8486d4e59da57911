use super::chain::ResolverChain;
use super::config::ChainConfig;
use super::exchange::UpstreamExchange;
use crate::dns::cache::DnsCache;
use custom_dns_domain::ServerEndpoint;
use std::sync::Arc;
use tracing::info;

pub struct ResolverBuilder {
    exchange: Arc<dyn UpstreamExchange>,
    config: ChainConfig,
    cache: Option<Arc<DnsCache>>,
    endpoints: Vec<ServerEndpoint>,
}

impl ResolverBuilder {
    pub fn new(exchange: Arc<dyn UpstreamExchange>) -> Self {
        Self {
            exchange,
            config: ChainConfig::default(),
            cache: None,
            endpoints: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: ChainConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_cache(mut self, cache: Arc<DnsCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Initial server list; empty leaves the chain inactive.
    pub fn with_endpoints(mut self, endpoints: Vec<ServerEndpoint>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn build(self) -> Arc<ResolverChain> {
        info!(
            servers = self.endpoints.len(),
            cache = self.cache.is_some(),
            attempt_timeout_ms = self.config.attempt_timeout.as_millis() as u64,
            resolution_timeout_ms = self.config.resolution_timeout.as_millis() as u64,
            "Building resolver chain"
        );

        Arc::new(ResolverChain::new(
            self.exchange,
            self.cache,
            self.endpoints,
            self.config,
        ))
    }
}
