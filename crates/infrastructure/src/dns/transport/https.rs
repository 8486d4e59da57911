use super::tls::is_certificate_error;
use super::{DnsTransport, TransportResponse};
use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use custom_dns_domain::{DohMethod, TransportError};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use rustls::ClientConfig;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Expected content type for DNS-over-HTTPS responses (RFC 8484 §4.2.1)
const DNS_MESSAGE_CONTENT_TYPE: &str = "application/dns-message";

/// DNS-over-HTTPS transport (RFC 8484)
///
/// The URL host is pinned to the endpoint address in the client's resolver,
/// so a DoH server named by hostname never needs the system resolver.
pub struct HttpsTransport {
    url: String,
    method: DohMethod,
    client: reqwest::Client,
}

impl HttpsTransport {
    pub fn new(
        server_addr: SocketAddr,
        url: String,
        method: DohMethod,
        tls_config: &ClientConfig,
    ) -> Result<Self, TransportError> {
        let parsed = reqwest::Url::parse(&url)
            .map_err(|e| TransportError::ProtocolViolation(format!("invalid DoH URL '{}': {}", url, e)))?;

        let mut tls = tls_config.clone();
        tls.alpn_protocols = vec![b"h2".to_vec(), b"http/1.1".to_vec()];

        let mut builder = reqwest::Client::builder()
            .use_preconfigured_tls(tls)
            .pool_max_idle_per_host(4)
            .no_proxy();
        if let Some(host) = parsed.host_str() {
            builder = builder.resolve(host, server_addr);
        }

        let client = builder
            .build()
            .map_err(|e| TransportError::ProtocolViolation(format!("DoH client setup: {}", e)))?;

        Ok(Self { url, method, client })
    }

    fn request(&self, message_bytes: &[u8]) -> reqwest::RequestBuilder {
        match self.method {
            // POST with application/dns-message (RFC 8484 §4.1)
            DohMethod::Post => self
                .client
                .post(&self.url)
                .header(CONTENT_TYPE, DNS_MESSAGE_CONTENT_TYPE)
                .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
                .body(message_bytes.to_vec()),
            DohMethod::Get => {
                let separator = if self.url.contains('?') { '&' } else { '?' };
                let url = format!(
                    "{}{}dns={}",
                    self.url,
                    separator,
                    URL_SAFE_NO_PAD.encode(message_bytes)
                );
                self.client
                    .get(url)
                    .header(ACCEPT, DNS_MESSAGE_CONTENT_TYPE)
            }
        }
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.url.clone())
        } else if is_certificate_error(&err) {
            TransportError::TlsValidationFailed(format!("{}: {}", self.url, err))
        } else if err.is_connect() {
            TransportError::ConnectionRefused(format!("{}: {}", self.url, err))
        } else {
            TransportError::ProtocolViolation(format!("DoH request to {} failed: {}", self.url, err))
        }
    }
}

#[async_trait]
impl DnsTransport for HttpsTransport {
    async fn send(
        &self,
        message_bytes: &[u8],
        timeout: Duration,
    ) -> Result<TransportResponse, TransportError> {
        debug!(
            url = %self.url,
            method = ?self.method,
            message_len = message_bytes.len(),
            "Sending DoH query"
        );

        let exchange = async {
            let response = self
                .request(message_bytes)
                .send()
                .await
                .map_err(|e| self.map_error(e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(TransportError::ProtocolViolation(format!(
                    "DoH server {} returned HTTP {}",
                    self.url,
                    status.as_u16()
                )));
            }

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");
            if !content_type.starts_with(DNS_MESSAGE_CONTENT_TYPE) {
                return Err(TransportError::ProtocolViolation(format!(
                    "DoH server {} answered with content type '{}'",
                    self.url, content_type
                )));
            }

            response.bytes().await.map_err(|e| self.map_error(e))
        };

        let bytes = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| TransportError::Timeout(self.url.clone()))??;

        debug!(url = %self.url, response_len = bytes.len(), "DoH response received");

        Ok(TransportResponse {
            bytes,
            protocol_used: "HTTPS",
        })
    }

    fn protocol_name(&self) -> &'static str {
        "HTTPS"
    }
}
