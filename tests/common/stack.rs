use custom_dns_application::ports::{DnsResolver, SystemResolver};
use custom_dns_application::services::HostOverrideTable;
use custom_dns_application::use_cases::{ResolveHostUseCase, UpdateServersUseCase};
use custom_dns_domain::Config;
use custom_dns_infrastructure::dns::{
    ChainConfig, DnsCache, NetworkExchange, ResolverBuilder, ResolverChain, TransportOptions,
};
use custom_dns_infrastructure::system::GaiSystemResolver;
use std::sync::Arc;

/// Everything the command-line front end wires together, built from TOML.
pub struct Stack {
    pub chain: Arc<ResolverChain>,
    pub resolve_host: ResolveHostUseCase,
    pub update_servers: UpdateServersUseCase,
    pub overrides: Arc<HostOverrideTable>,
}

impl Stack {
    pub fn from_toml(toml: &str) -> Self {
        let config = Config::from_toml_str(toml).unwrap();
        config.validate().unwrap();

        let options = TransportOptions::from_config(&config.transport).unwrap();
        let chain = ResolverBuilder::new(Arc::new(NetworkExchange::new(options)))
            .with_config(ChainConfig::from_config(&config.resolver))
            .with_cache(Arc::new(DnsCache::new(config.cache.max_entries)))
            .with_endpoints(config.endpoints().unwrap())
            .build();

        let resolver: Arc<dyn DnsResolver> = chain.clone();
        let system: Arc<dyn SystemResolver> = Arc::new(GaiSystemResolver::new());
        let overrides = Arc::new(HostOverrideTable::from_config(&config.hosts).unwrap());

        Self {
            resolve_host: ResolveHostUseCase::new(
                Arc::clone(&resolver),
                system,
                Arc::clone(&overrides),
                config.resolver.on_exhaustion,
            ),
            update_servers: UpdateServersUseCase::new(resolver),
            chain,
            overrides,
        }
    }
}

/// `[[servers]]` block for a UDP server on loopback.
pub fn udp_server(port: u16) -> String {
    format!(
        "[[servers]]\naddress = \"127.0.0.1\"\nport = {}\nprotocol = \"udp\"\n",
        port
    )
}
