use super::{create_transport, Transport, TransportOptions};
use custom_dns_domain::{Protocol, ServerEndpoint, TransportError};
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::sync::Arc;
use tracing::debug;

/// One lazily created transport per endpoint, so pooled connections and
/// DoH clients outlive a single resolution.
pub struct TransportRegistry {
    transports: DashMap<ServerEndpoint, Arc<Transport>, FxBuildHasher>,
    options: TransportOptions,
}

impl TransportRegistry {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            transports: DashMap::with_hasher(FxBuildHasher),
            options,
        }
    }

    pub fn get_or_create(&self, endpoint: &ServerEndpoint) -> Result<Arc<Transport>, TransportError> {
        if let Some(existing) = self.transports.get(endpoint) {
            return Ok(Arc::clone(existing.value()));
        }

        let transport = Arc::new(create_transport(endpoint, &self.options)?);
        let entry = self
            .transports
            .entry(endpoint.clone())
            .or_insert_with(|| Arc::clone(&transport));
        debug!(server = %endpoint, protocol = transport.protocol_name(), "Transport created");
        Ok(Arc::clone(entry.value()))
    }

    /// Drop transports, and with them pooled connections, for endpoints no
    /// longer configured. The TCP twin of a UDP endpoint stays alive.
    pub fn retain(&self, configured: &[ServerEndpoint]) {
        let before = self.transports.len();
        self.transports.retain(|endpoint, _| {
            configured.contains(endpoint)
                || (endpoint.protocol == Protocol::Tcp
                    && configured.contains(&endpoint.with_protocol(Protocol::Udp)))
        });
        let pruned = before.saturating_sub(self.transports.len());
        if pruned > 0 {
            debug!(pruned, "Pruned transports of removed endpoints");
        }
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }
}
