#![allow(dead_code)]

pub mod doh_server_mock;
pub mod pki;
pub mod scripted;

pub use dns_server_mock::{MockBehavior, MockDnsServer};
pub use doh_server_mock::{DohReply, MockDohServer};
pub use pki::TestPki;
pub use scripted::{a_answer, nxdomain, servfail, ScriptedExchange};

use custom_dns_domain::ServerEndpoint;
use custom_dns_infrastructure::dns::{ChainConfig, DnsCache, ResolverBuilder, ResolverChain, UpstreamExchange};
use std::sync::Arc;
use std::time::Duration;

pub fn udp_endpoint(last_octet: u8) -> ServerEndpoint {
    ServerEndpoint::udp(format!("192.0.2.{}:53", last_octet).parse().unwrap())
}

pub fn tls_endpoint(last_octet: u8) -> ServerEndpoint {
    ServerEndpoint::tls(
        format!("192.0.2.{}:853", last_octet).parse().unwrap(),
        "dns.test",
    )
}

pub fn test_config() -> ChainConfig {
    ChainConfig::default()
        .with_attempt_timeout(Duration::from_millis(300))
        .with_resolution_timeout(Duration::from_secs(3))
}

pub fn build_chain(
    exchange: Arc<dyn UpstreamExchange>,
    endpoints: Vec<ServerEndpoint>,
) -> Arc<ResolverChain> {
    ResolverBuilder::new(exchange)
        .with_config(test_config())
        .with_cache(Arc::new(DnsCache::new(1_000)))
        .with_endpoints(endpoints)
        .build()
}
