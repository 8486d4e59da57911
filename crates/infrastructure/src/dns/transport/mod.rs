pub mod https;
pub mod pool;
pub mod registry;
pub mod tcp;
pub mod tls;
pub mod udp;

use async_trait::async_trait;
use bytes::Bytes;
use custom_dns_domain::{DohMethod, Protocol, ServerEndpoint, TransportConfig, TransportError};
use rustls::ClientConfig;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

pub use pool::{ConnectionPool, PoolStats};
pub use registry::TransportRegistry;

/// Result of a raw DNS transport operation
#[derive(Debug)]
pub struct TransportResponse {
    /// Raw DNS response bytes (wire format)
    pub bytes: Bytes,
    /// Which protocol was used
    pub protocol_used: &'static str,
}

/// Trait for sending raw DNS messages over the wire
#[async_trait]
pub trait DnsTransport: Send + Sync {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError>;

    fn protocol_name(&self) -> &'static str;
}

/// Enum-dispatched transport, no Box/vtable on the query path.
pub enum Transport {
    Udp(udp::UdpTransport),
    Tcp(tcp::TcpTransport),
    Tls(tls::TlsTransport),
    Https(https::HttpsTransport),
}

impl Transport {
    /// Send a DNS query via the appropriate protocol (static dispatch).
    pub async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        match self {
            Self::Udp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tcp(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Tls(t) => DnsTransport::send(t, message_bytes, timeout).await,
            Self::Https(t) => DnsTransport::send(t, message_bytes, timeout).await,
        }
    }

    /// Protocol name for logging.
    pub fn protocol_name(&self) -> &'static str {
        match self {
            Self::Udp(_) => "UDP",
            Self::Tcp(_) => "TCP",
            Self::Tls(_) => "TLS",
            Self::Https(_) => "HTTPS",
        }
    }

    /// Pool statistics for the connection-oriented transports.
    pub fn pool_stats(&self) -> Option<PoolStats> {
        match self {
            Self::Tcp(t) => Some(t.pool_stats()),
            Self::Tls(t) => Some(t.pool_stats()),
            _ => None,
        }
    }
}

/// Settings shared by every transport the registry creates.
#[derive(Clone)]
pub struct TransportOptions {
    pub max_connections_per_endpoint: usize,
    pub idle_timeout: Duration,
    pub doh_method: DohMethod,
    /// Trust configuration for DoT and DoH
    pub tls_config: Arc<ClientConfig>,
}

impl TransportOptions {
    pub fn from_config(config: &TransportConfig) -> Result<Self, TransportError> {
        Ok(Self {
            max_connections_per_endpoint: config.max_connections_per_endpoint.max(1),
            idle_timeout: Duration::from_secs(config.idle_timeout_secs),
            doh_method: config.doh_method,
            tls_config: tls::default_client_config()?,
        })
    }

    /// Replace the trust configuration, e.g. with a private CA.
    pub fn with_tls_config(mut self, tls_config: Arc<ClientConfig>) -> Self {
        self.tls_config = tls_config;
        self
    }
}

/// Create the appropriate transport for an endpoint (enum dispatch).
pub fn create_transport(
    endpoint: &ServerEndpoint,
    options: &TransportOptions,
) -> Result<Transport, TransportError> {
    match endpoint.protocol {
        Protocol::Udp => Ok(Transport::Udp(udp::UdpTransport::new(endpoint.addr))),
        Protocol::Tcp => Ok(Transport::Tcp(tcp::TcpTransport::new(
            endpoint.addr,
            options.max_connections_per_endpoint,
            options.idle_timeout,
        ))),
        Protocol::Tls => {
            let hostname = endpoint.tls_identity.as_deref().ok_or_else(|| {
                TransportError::TlsValidationFailed(format!("{} has no certificate hostname", endpoint))
            })?;
            Ok(Transport::Tls(tls::TlsTransport::new(
                endpoint.addr,
                hostname,
                Arc::clone(&options.tls_config),
                options.max_connections_per_endpoint,
                options.idle_timeout,
            )?))
        }
        Protocol::Https => Ok(Transport::Https(https::HttpsTransport::new(
            endpoint.addr,
            endpoint.doh_url(),
            options.doh_method,
            &options.tls_config,
        )?)),
    }
}

/// Classify a socket error for the fallback loop.
pub(crate) fn map_io_error(err: io::Error, server: SocketAddr) -> TransportError {
    if tls::is_certificate_error(&err) {
        return TransportError::TlsValidationFailed(format!("{}: {}", server, err));
    }
    match err.kind() {
        io::ErrorKind::TimedOut => TransportError::Timeout(server.to_string()),
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::BrokenPipe => TransportError::ConnectionRefused(format!("{}: {}", server, err)),
        _ => TransportError::ProtocolViolation(format!("{}: {}", server, err)),
    }
}
