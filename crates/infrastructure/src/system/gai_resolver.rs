//! Operating system resolver via `getaddrinfo`, run on the blocking pool.

use async_trait::async_trait;
use custom_dns_application::ports::SystemResolver;
use custom_dns_domain::{RecordType, ResolutionError};
use std::net::{IpAddr, ToSocketAddrs};
use tracing::{debug, error};

#[derive(Debug, Clone, Copy, Default)]
pub struct GaiSystemResolver;

impl GaiSystemResolver {
    pub fn new() -> Self {
        Self
    }

    fn keep(addr: &IpAddr, record_type: RecordType) -> bool {
        match record_type {
            RecordType::A => addr.is_ipv4(),
            RecordType::AAAA => addr.is_ipv6(),
            _ => false,
        }
    }
}

#[async_trait]
impl SystemResolver for GaiSystemResolver {
    async fn lookup(
        &self,
        hostname: &str,
        record_type: RecordType,
    ) -> Result<Vec<IpAddr>, ResolutionError> {
        if !record_type.is_address() {
            debug!(domain = %hostname, record_type = %record_type, "getaddrinfo only answers address types");
            return Err(ResolutionError::ServerFailure);
        }

        let host = hostname.trim_end_matches('.').to_string();
        let result = tokio::task::spawn_blocking(move || {
            (host.as_str(), 0u16)
                .to_socket_addrs()
                .map(|iter| iter.map(|sa| sa.ip()).collect::<Vec<_>>())
        })
        .await;

        let addrs = result
            .map_err(|e| {
                error!(error = %e, "getaddrinfo task failed");
                ResolutionError::ServerFailure
            })?
            .map_err(|e| {
                debug!(domain = %hostname, error = %e, "getaddrinfo failed");
                ResolutionError::NameNotFound
            })?;

        let mut filtered: Vec<IpAddr> = Vec::with_capacity(addrs.len());
        for addr in addrs {
            if Self::keep(&addr, record_type) && !filtered.contains(&addr) {
                filtered.push(addr);
            }
        }

        debug!(domain = %hostname, count = filtered.len(), "Resolved via system resolver");
        Ok(filtered)
    }
}
