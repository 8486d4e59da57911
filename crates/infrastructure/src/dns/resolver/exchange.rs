use crate::dns::forwarding::{MessageBuilder, ResponseParser};
use crate::dns::transport::{TransportOptions, TransportRegistry};
use async_trait::async_trait;
use custom_dns_domain::{DnsQuery, DnsResponse, ServerEndpoint, UpstreamError};
use std::time::Duration;
use tracing::debug;

/// One query against one endpoint: encode, send over the endpoint's
/// transport, decode and match the reply to the query.
#[async_trait]
pub trait UpstreamExchange: Send + Sync {
    async fn exchange(
        &self,
        query: &DnsQuery,
        endpoint: &ServerEndpoint,
        timeout: Duration,
    ) -> Result<DnsResponse, UpstreamError>;

    /// Release per-endpoint resources for endpoints no longer configured.
    fn retain(&self, _endpoints: &[ServerEndpoint]) {}
}

pub struct NetworkExchange {
    registry: TransportRegistry,
}

impl NetworkExchange {
    pub fn new(options: TransportOptions) -> Self {
        Self {
            registry: TransportRegistry::new(options),
        }
    }

    pub fn registry(&self) -> &TransportRegistry {
        &self.registry
    }
}

#[async_trait]
impl UpstreamExchange for NetworkExchange {
    async fn exchange(
        &self,
        query: &DnsQuery,
        endpoint: &ServerEndpoint,
        timeout: Duration,
    ) -> Result<DnsResponse, UpstreamError> {
        let message = MessageBuilder::encode(query)?;
        let transport = self.registry.get_or_create(endpoint)?;

        let response = transport.send(&message, timeout).await?;
        debug!(
            server = %endpoint,
            protocol = response.protocol_used,
            bytes = response.bytes.len(),
            "Upstream exchange completed"
        );

        ResponseParser::decode_for(query, response.bytes)
    }

    fn retain(&self, endpoints: &[ServerEndpoint]) {
        self.registry.retain(endpoints);
    }
}
