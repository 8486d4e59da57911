use crate::ports::DnsResolver;
use custom_dns_domain::config::build_endpoints;
use custom_dns_domain::{ConfigError, EndpointConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Pushes a server list from the settings layer into the resolver chain.
///
/// The list is validated as a whole; on any error the active configuration
/// is left untouched.
pub struct UpdateServersUseCase {
    resolver: Arc<dyn DnsResolver>,
}

impl UpdateServersUseCase {
    pub fn new(resolver: Arc<dyn DnsResolver>) -> Self {
        Self { resolver }
    }

    pub fn execute(&self, servers: &[EndpointConfig]) -> Result<usize, ConfigError> {
        let endpoints = build_endpoints(servers).inspect_err(|e| {
            warn!(error = %e, "Rejected server list, keeping active configuration");
        })?;

        let count = endpoints.len();
        self.resolver.apply_servers(endpoints);
        info!(servers = count, "Server list updated");
        Ok(count)
    }
}
