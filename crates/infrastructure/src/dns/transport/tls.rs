use super::pool::{ConnectionPool, PoolStats};
use super::tcp::connect_tcp;
use super::{map_io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use custom_dns_domain::TransportError;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use std::error::Error as StdError;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;
use tracing::{debug, warn};

/// Client configuration trusting the Mozilla root set, on the ring provider.
pub fn default_client_config() -> Result<Arc<ClientConfig>, TransportError> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    client_config_with_roots(roots)
}

pub fn client_config_with_roots(roots: RootCertStore) -> Result<Arc<ClientConfig>, TransportError> {
    let config = ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .map_err(|e| TransportError::TlsValidationFailed(format!("TLS setup: {}", e)))?
        .with_root_certificates(roots)
        .with_no_client_auth();
    Ok(Arc::new(config))
}

/// DNS-over-TLS (RFC 7858): TCP framing inside a TLS session whose
/// certificate must match the configured hostname.
pub struct TlsTransport {
    server_addr: SocketAddr,
    server_name: ServerName<'static>,
    connector: TlsConnector,
    pool: ConnectionPool<TlsStream<TcpStream>>,
}

impl TlsTransport {
    pub fn new(
        server_addr: SocketAddr,
        hostname: &str,
        tls_config: Arc<ClientConfig>,
        max_connections: usize,
        idle_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let server_name = ServerName::try_from(hostname.to_string()).map_err(|e| {
            TransportError::TlsValidationFailed(format!("invalid TLS name '{}': {}", hostname, e))
        })?;

        Ok(Self {
            server_addr,
            server_name,
            connector: TlsConnector::from(tls_config),
            pool: ConnectionPool::new(server_addr, max_connections, idle_timeout),
        })
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    async fn connect(&self) -> Result<TlsStream<TcpStream>, TransportError> {
        let tcp = connect_tcp(self.server_addr).await?;
        let stream = self
            .connector
            .connect(self.server_name.clone(), tcp)
            .await
            .map_err(|e| {
                let err = map_io_error(e, self.server_addr);
                if matches!(err, TransportError::TlsValidationFailed(_)) {
                    warn!(server = %self.server_addr, error = %err, "TLS certificate rejected");
                }
                err
            })?;
        debug!(server = %self.server_addr, "TLS session established");
        Ok(stream)
    }
}

#[async_trait]
impl DnsTransport for TlsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let bytes = tokio::time::timeout(
            timeout,
            self.pool.exchange(message_bytes, || self.connect()),
        )
        .await
        .map_err(|_| TransportError::Timeout(self.server_addr.to_string()))??;

        Ok(TransportResponse {
            bytes,
            protocol_used: "TLS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TLS"
    }
}

/// True when `err`, or anything in its source chain, is a rustls
/// certificate rejection.
pub(crate) fn is_certificate_error(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(tls) = e.downcast_ref::<rustls::Error>() {
            return matches!(
                tls,
                rustls::Error::InvalidCertificate(_) | rustls::Error::NoCertificatesPresented
            );
        }
        if let Some(inner) = e.downcast_ref::<io::Error>().and_then(|io| io.get_ref()) {
            if is_certificate_error(inner) {
                return true;
            }
        }
        current = e.source();
    }
    false
}
