use super::{map_io_error, DnsTransport, TransportResponse};
use async_trait::async_trait;
use bytes::Bytes;
use custom_dns_domain::TransportError;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Maximum UDP DNS response size with EDNS(0)
const MAX_UDP_RESPONSE_SIZE: usize = 4096;

/// DNS over UDP transport.
///
/// Every exchange binds its own ephemeral socket, so concurrent queries to
/// the same server never share a source port.
pub struct UdpTransport {
    server_addr: SocketAddr,
}

impl UdpTransport {
    pub fn new(server_addr: SocketAddr) -> Self {
        Self { server_addr }
    }

    async fn exchange(&self, message_bytes: &[u8], deadline: Instant) -> Result<Bytes, TransportError> {
        let bind_addr: SocketAddr = if self.server_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|e| map_io_error(e, self.server_addr))?;

        // Connected socket: the kernel drops datagrams from other peers and
        // ICMP port-unreachable surfaces as ConnectionRefused.
        socket
            .connect(self.server_addr)
            .await
            .map_err(|e| map_io_error(e, self.server_addr))?;

        let bytes_sent = socket
            .send(message_bytes)
            .await
            .map_err(|e| map_io_error(e, self.server_addr))?;

        debug!(server = %self.server_addr, bytes_sent, "UDP query sent");

        let expected_id = query_id(message_bytes);
        let mut recv_buf = vec![0u8; MAX_UDP_RESPONSE_SIZE];

        loop {
            let bytes_received = tokio::time::timeout_at(deadline, socket.recv(&mut recv_buf))
                .await
                .map_err(|_| TransportError::Timeout(self.server_addr.to_string()))?
                .map_err(|e| map_io_error(e, self.server_addr))?;

            if bytes_received >= 2 && query_id(&recv_buf[..bytes_received]) == expected_id {
                recv_buf.truncate(bytes_received);
                debug!(server = %self.server_addr, bytes_received, "UDP response received");
                return Ok(Bytes::from(recv_buf));
            }

            warn!(
                server = %self.server_addr,
                bytes_received,
                "Discarding UDP datagram with foreign transaction id"
            );
        }
    }
}

fn query_id(message: &[u8]) -> Option<u16> {
    match message {
        [hi, lo, ..] => Some(u16::from_be_bytes([*hi, *lo])),
        _ => None,
    }
}

#[async_trait]
impl DnsTransport for UdpTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        let deadline = Instant::now() + timeout;
        let bytes = self.exchange(message_bytes, deadline).await?;
        Ok(TransportResponse {
            bytes,
            protocol_used: "UDP",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "UDP"
    }
}
