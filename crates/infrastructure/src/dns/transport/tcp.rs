use super::pool::{ConnectionPool, PoolStats};
use super::{map_io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use custom_dns_domain::TransportError;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tracing::debug;

/// DNS over TCP with pooled, length-prefixed connections.
pub struct TcpTransport {
    server_addr: SocketAddr,
    pool: ConnectionPool<TcpStream>,
}

impl TcpTransport {
    pub fn new(server_addr: SocketAddr, max_connections: usize, idle_timeout: Duration) -> Self {
        Self {
            server_addr,
            pool: ConnectionPool::new(server_addr, max_connections, idle_timeout),
        }
    }

    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }
}

pub(crate) async fn connect_tcp(server_addr: SocketAddr) -> Result<TcpStream, TransportError> {
    let stream = TcpStream::connect(server_addr)
        .await
        .map_err(|e| map_io_error(e, server_addr))?;
    let _ = stream.set_nodelay(true);
    Ok(stream)
}

#[async_trait]
impl DnsTransport for TcpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let server_addr = self.server_addr;
        let bytes = tokio::time::timeout(
            timeout,
            self.pool
                .exchange(message_bytes, || connect_tcp(server_addr)),
        )
        .await
        .map_err(|_| TransportError::Timeout(server_addr.to_string()))??;

        debug!(server = %server_addr, bytes_received = bytes.len(), "TCP response received");

        Ok(TransportResponse {
            bytes,
            protocol_used: "TCP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "TCP"
    }
}
