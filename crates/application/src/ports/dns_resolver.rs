use async_trait::async_trait;
use custom_dns_domain::{DnsResponse, ResolutionKey, ServerEndpoint};
use std::sync::Arc;

/// The resolver chain as the entry point sees it.
///
/// `resolve` never fails: exhaustion comes back as a synthetic
/// `ServerFailure` response and transport errors never leave the chain.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    async fn resolve(&self, key: &ResolutionKey) -> Arc<DnsResponse>;

    /// Replace the configured server list. Resolutions already running keep
    /// the list they started with.
    fn apply_servers(&self, endpoints: Vec<ServerEndpoint>);

    /// `false` while no server is configured.
    fn is_active(&self) -> bool;
}
