use super::DnsServices;
use custom_dns_application::ports::{DnsResolver, SystemResolver};
use custom_dns_application::services::HostOverrideTable;
use custom_dns_application::use_cases::{ResolveHostUseCase, UpdateServersUseCase};
use custom_dns_domain::Config;
use custom_dns_infrastructure::system::GaiSystemResolver;
use std::sync::Arc;

pub struct UseCases {
    pub resolve_host: Arc<ResolveHostUseCase>,
    pub update_servers: Arc<UpdateServersUseCase>,
    pub overrides: Arc<HostOverrideTable>,
}

impl UseCases {
    pub fn new(config: &Config, dns: &DnsServices) -> anyhow::Result<Self> {
        let resolver: Arc<dyn DnsResolver> = dns.resolver.clone();
        let system: Arc<dyn SystemResolver> = Arc::new(GaiSystemResolver::new());
        let overrides = Arc::new(HostOverrideTable::from_config(&config.hosts)?);

        Ok(Self {
            resolve_host: Arc::new(ResolveHostUseCase::new(
                Arc::clone(&resolver),
                system,
                Arc::clone(&overrides),
                config.resolver.on_exhaustion,
            )),
            update_servers: Arc::new(UpdateServersUseCase::new(resolver)),
            overrides,
        })
    }
}
