use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

/// DNS transport protocol of an upstream endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Udp,
    Tcp,
    #[serde(alias = "dot")]
    Tls,
    #[serde(alias = "doh")]
    Https,
}

impl Protocol {
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Udp => "udp",
            Protocol::Tcp => "tcp",
            Protocol::Tls => "tls",
            Protocol::Https => "https",
        }
    }

    /// Standard port: UDP/53, TCP/53, DoT/853, DoH/443.
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Udp | Protocol::Tcp => 53,
            Protocol::Tls => 853,
            Protocol::Https => 443,
        }
    }

    pub fn requires_tls_identity(&self) -> bool {
        matches!(self, Protocol::Tls | Protocol::Https)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configured upstream: address, protocol and, for the encrypted
/// transports, the identity to validate against.
///
/// For DoT `tls_identity` is the certificate hostname; for DoH it is the URL
/// template. Immutable once built; validation happens in the config layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerEndpoint {
    pub addr: SocketAddr,
    pub protocol: Protocol,
    pub tls_identity: Option<Arc<str>>,
}

impl ServerEndpoint {
    pub fn new(addr: SocketAddr, protocol: Protocol, tls_identity: Option<Arc<str>>) -> Self {
        Self {
            addr,
            protocol,
            tls_identity,
        }
    }

    pub fn udp(addr: SocketAddr) -> Self {
        Self::new(addr, Protocol::Udp, None)
    }

    pub fn tcp(addr: SocketAddr) -> Self {
        Self::new(addr, Protocol::Tcp, None)
    }

    pub fn tls(addr: SocketAddr, hostname: &str) -> Self {
        Self::new(addr, Protocol::Tls, Some(Arc::from(hostname)))
    }

    pub fn https(addr: SocketAddr, url_template: &str) -> Self {
        Self::new(addr, Protocol::Https, Some(Arc::from(url_template)))
    }

    /// The same server reached over another protocol (UDP truncation → TCP).
    pub fn with_protocol(&self, protocol: Protocol) -> Self {
        Self {
            addr: self.addr,
            protocol,
            tls_identity: self.tls_identity.clone(),
        }
    }

    /// DoH request URL with any RFC 6570 `{?dns}` suffix stripped.
    pub fn doh_url(&self) -> String {
        match &self.tls_identity {
            Some(template) => match template.find('{') {
                Some(idx) => template[..idx].to_string(),
                None => template.to_string(),
            },
            None => format!("https://{}/dns-query", self.addr),
        }
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.protocol, &self.tls_identity) {
            (Protocol::Https, Some(url)) => write!(f, "{}@{}", url, self.addr),
            (_, Some(identity)) => write!(f, "{}://{}#{}", self.protocol, self.addr, identity),
            (_, None) => write!(f, "{}://{}", self.protocol, self.addr),
        }
    }
}
