use async_trait::async_trait;
use custom_dns_domain::{RecordType, ResolutionError};
use std::net::IpAddr;

/// The operating system resolver, used while the layer is inactive and as
/// the exhaustion fallback.
#[async_trait]
pub trait SystemResolver: Send + Sync {
    async fn lookup(
        &self,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, ResolutionError>;
}
