use crate::ports::{DnsResolver, SystemResolver};
use crate::services::HostOverrideTable;
use custom_dns_domain::{OnExhaustion, RecordType, ResolutionError, ResolutionKey, ResponseCode};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// The single call the embedding engine routes its hostname lookups into.
///
/// Order: host overrides, then the system resolver while no server is
/// configured, then the resolver chain.
pub struct ResolveHostUseCase {
    resolver: Arc<dyn DnsResolver>,
    system: Arc<dyn SystemResolver>,
    overrides: Arc<HostOverrideTable>,
    on_exhaustion: OnExhaustion,
}

impl ResolveHostUseCase {
    pub fn new(
        resolver: Arc<dyn DnsResolver>,
        system: Arc<dyn SystemResolver>,
        overrides: Arc<HostOverrideTable>,
        on_exhaustion: OnExhaustion,
    ) -> Self {
        Self {
            resolver,
            system,
            overrides,
            on_exhaustion,
        }
    }

    #[instrument(skip_all, fields(domain = %hostname, record_type = %record_type))]
    pub async fn execute(
        &self,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, ResolutionError> {
        if let Some(addresses) = self.overrides.lookup(hostname, record_type) {
            debug!(count = addresses.len(), "Answered from host overrides");
            return Ok(addresses);
        }

        if !self.resolver.is_active() {
            debug!("No servers configured, using system resolver");
            return self.system.lookup(hostname, record_type).await;
        }

        let key = ResolutionKey::new(hostname, record_type);
        let response = self.resolver.resolve(&key).await;

        match response.code {
            ResponseCode::Success => Ok(response.addresses()),
            // Malformed is only ever synthesized for a name that cannot be queried
            ResponseCode::NameNotFound | ResponseCode::Malformed => {
                Err(ResolutionError::NameNotFound)
            }
            _ => match self.on_exhaustion {
                OnExhaustion::Fail => Err(ResolutionError::ServerFailure),
                OnExhaustion::FallbackToSystemResolver => {
                    warn!("All configured servers failed, falling back to system resolver");
                    self.system.lookup(hostname, record_type).await
                }
            },
        }
    }
}
