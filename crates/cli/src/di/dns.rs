use custom_dns_domain::Config;
use custom_dns_infrastructure::dns::{
    CacheSweeper, ChainConfig, DnsCache, NetworkExchange, ResolverBuilder, ResolverChain,
    TransportOptions,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::info;

pub struct DnsServices {
    pub resolver: Arc<ResolverChain>,
    pub cache: Option<Arc<DnsCache>>,
    sweeper: Option<JoinHandle<()>>,
}

impl DnsServices {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let endpoints = config.endpoints()?;
        let options = TransportOptions::from_config(&config.transport)?;
        let exchange = Arc::new(NetworkExchange::new(options));

        let mut builder = ResolverBuilder::new(exchange)
            .with_config(ChainConfig::from_config(&config.resolver))
            .with_endpoints(endpoints);

        let mut cache = None;
        let mut sweeper = None;
        if config.cache.enabled {
            let dns_cache = Arc::new(DnsCache::new(config.cache.max_entries));
            if config.cache.sweep_interval_secs > 0 {
                sweeper = Some(
                    CacheSweeper::new(Arc::clone(&dns_cache), config.cache.sweep_interval_secs)
                        .start(),
                );
            }
            builder = builder.with_cache(Arc::clone(&dns_cache));
            cache = Some(dns_cache);
        }

        let resolver = builder.build();
        info!(
            servers = config.servers.len(),
            cache = cache.is_some(),
            "DNS services ready"
        );

        Ok(Self {
            resolver,
            cache,
            sweeper,
        })
    }
}

impl Drop for DnsServices {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
