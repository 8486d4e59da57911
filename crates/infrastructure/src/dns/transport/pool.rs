//! Per-endpoint connection pool for the stream transports (TCP, DoT).
//!
//! A semaphore caps how many connections are checked out at once; released
//! connections wait in an idle list and are discarded once they have been
//! idle longer than `idle_timeout`. The idle list lock is never held across
//! an await.

use bytes::Bytes;
use custom_dns_domain::TransportError;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;
use tracing::debug;

use super::map_io_error;

struct IdleConnection<S> {
    stream: S,
    idle_since: Instant,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub idle: usize,
    pub opened: u64,
    pub reused: u64,
    pub expired: u64,
}

pub struct ConnectionPool<S> {
    server_addr: SocketAddr,
    idle: Mutex<Vec<IdleConnection<S>>>,
    permits: Arc<Semaphore>,
    max_connections: usize,
    idle_timeout: Duration,
    opened: AtomicU64,
    reused: AtomicU64,
    expired: AtomicU64,
}

impl<S> ConnectionPool<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(server_addr: SocketAddr, max_connections: usize, idle_timeout: Duration) -> Self {
        let max_connections = max_connections.max(1);
        Self {
            server_addr,
            idle: Mutex::new(Vec::with_capacity(max_connections)),
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            idle_timeout,
            opened: AtomicU64::new(0),
            reused: AtomicU64::new(0),
            expired: AtomicU64::new(0),
        }
    }

    /// Send one length-prefixed message and read one reply.
    ///
    /// Prefers an idle connection; if that one turns out to be dead the
    /// exchange is retried once on a fresh connection from `connect`.
    pub async fn exchange<F, Fut>(
        &self,
        message: &[u8],
        connect: F,
    ) -> Result<Bytes, TransportError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<S, TransportError>>,
    {
        let _permit = self.acquire().await?;

        if let Some(mut stream) = self.take_idle() {
            match framed_exchange(&mut stream, message).await {
                Ok(bytes) => {
                    self.reused.fetch_add(1, Ordering::Relaxed);
                    self.release(stream);
                    return Ok(bytes);
                }
                Err(e) => {
                    debug!(
                        server = %self.server_addr,
                        error = %e,
                        "Pooled connection failed, reconnecting"
                    );
                }
            }
        }

        let mut stream = connect().await?;
        self.opened.fetch_add(1, Ordering::Relaxed);

        let bytes = framed_exchange(&mut stream, message)
            .await
            .map_err(|e| map_io_error(e, self.server_addr))?;
        self.release(stream);
        Ok(bytes)
    }

    async fn acquire(&self) -> Result<OwnedSemaphorePermit, TransportError> {
        Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| TransportError::ConnectionRefused(format!("{}: pool closed", self.server_addr)))
    }

    /// Most recently released connection that has not idled out.
    fn take_idle(&self) -> Option<S> {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        let before = idle.len();
        idle.retain(|c| now.duration_since(c.idle_since) < self.idle_timeout);
        let expired = before - idle.len();
        if expired > 0 {
            self.expired.fetch_add(expired as u64, Ordering::Relaxed);
        }
        idle.pop().map(|c| c.stream)
    }

    fn release(&self, stream: S) {
        let mut idle = self.idle.lock().unwrap_or_else(|e| e.into_inner());
        if idle.len() < self.max_connections {
            idle.push(IdleConnection {
                stream,
                idle_since: Instant::now(),
            });
        }
    }

    pub fn stats(&self) -> PoolStats {
        let idle = self.idle.lock().map(|i| i.len()).unwrap_or(0);
        PoolStats {
            idle,
            opened: self.opened.load(Ordering::Relaxed),
            reused: self.reused.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
        }
    }
}

/// Two-byte big-endian length prefix framing (RFC 1035 §4.2.2).
pub async fn framed_exchange<S>(stream: &mut S, message: &[u8]) -> io::Result<Bytes>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let len = u16::try_from(message.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "DNS message exceeds 65535 bytes"))?;

    let mut frame = Vec::with_capacity(2 + message.len());
    frame.extend_from_slice(&len.to_be_bytes());
    frame.extend_from_slice(message);
    stream.write_all(&frame).await?;
    stream.flush().await?;

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let response_len = u16::from_be_bytes(len_buf) as usize;
    if response_len == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "zero-length DNS frame"));
    }

    let mut response = vec![0u8; response_len];
    stream.read_exact(&mut response).await?;
    Ok(Bytes::from(response))
}
