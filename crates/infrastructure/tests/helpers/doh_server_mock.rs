use super::dns_server_mock::{build_response, MockBehavior};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rustls::ServerConfig;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

/// HTTP/1.1-over-TLS server speaking just enough DoH for one request per
/// connection.
pub struct MockDohServer {
    addr: SocketAddr,
    requests: Arc<AtomicUsize>,
    methods: Arc<Mutex<Vec<String>>>,
    task: JoinHandle<()>,
}

#[derive(Debug, Clone, Copy)]
pub struct DohReply {
    pub status: u16,
    pub content_type: &'static str,
}

impl Default for DohReply {
    fn default() -> Self {
        Self {
            status: 200,
            content_type: "application/dns-message",
        }
    }
}

impl MockDohServer {
    pub async fn start(
        behavior: MockBehavior,
        reply: DohReply,
        tls: Arc<ServerConfig>,
    ) -> io::Result<Self> {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
        let addr = listener.local_addr()?;
        let acceptor = TlsAcceptor::from(tls);
        let requests = Arc::new(AtomicUsize::new(0));
        let methods = Arc::new(Mutex::new(Vec::new()));

        let task = {
            let requests = Arc::clone(&requests);
            let methods = Arc::clone(&methods);
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    let acceptor = acceptor.clone();
                    let requests = Arc::clone(&requests);
                    let methods = Arc::clone(&methods);
                    tokio::spawn(async move {
                        let Ok(mut stream) = acceptor.accept(stream).await else {
                            return;
                        };
                        let Some((method, query)) = read_request(&mut stream).await else {
                            return;
                        };
                        requests.fetch_add(1, Ordering::SeqCst);
                        methods.lock().unwrap().push(method);

                        let body = build_response(&query, behavior, true).unwrap_or_default();
                        let head = format!(
                            "HTTP/1.1 {} X\r\ncontent-type: {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                            reply.status,
                            reply.content_type,
                            body.len()
                        );
                        let _ = stream.write_all(head.as_bytes()).await;
                        let _ = stream.write_all(&body).await;
                        let _ = stream.shutdown().await;
                    });
                }
            })
        };

        Ok(Self {
            addr,
            requests,
            methods,
            task,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// URL template naming the certificate host on this server's port.
    pub fn url(&self, host: &str) -> String {
        format!("https://{}:{}/dns-query", host, self.addr.port())
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

impl Drop for MockDohServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Returns the method and the DNS message from a POST body or `?dns=`.
async fn read_request<S>(stream: &mut S) -> Option<(String, Vec<u8>)>
where
    S: tokio::io::AsyncRead + Unpin,
{
    let mut buf = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    if method == "GET" {
        let encoded = target.split("dns=").nth(1)?.split('&').next()?;
        return Some((method, URL_SAFE_NO_PAD.decode(encoded).ok()?));
    }

    let content_length = lines
        .filter_map(|l| l.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.trim().parse::<usize>().ok())?;

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);
    Some((method, body))
}
