use super::ConfigError;
use crate::endpoint::{Protocol, ServerEndpoint};
use crate::validators::{validate_doh_template, validate_hostname};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

/// One server entry as the settings layer hands it over:
/// `{address, port?, protocol, tls_identity?}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// IP literal, optionally with a port (`1.1.1.1`, `[2606:4700::1111]:53`)
    pub address: String,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default = "default_protocol")]
    pub protocol: Protocol,

    /// Certificate hostname for DoT, URL template for DoH
    #[serde(default)]
    pub tls_identity: Option<String>,
}

fn default_protocol() -> Protocol {
    Protocol::Udp
}

impl EndpointConfig {
    pub fn new(address: impl Into<String>, protocol: Protocol) -> Self {
        Self {
            address: address.into(),
            port: None,
            protocol,
            tls_identity: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_tls_identity(mut self, identity: impl Into<String>) -> Self {
        self.tls_identity = Some(identity.into());
        self
    }

    /// Validate and build the immutable endpoint the resolver chain uses.
    pub fn to_endpoint(&self) -> Result<ServerEndpoint, ConfigError> {
        let addr = self.socket_addr()?;

        let identity = match (self.protocol, self.tls_identity.as_deref()) {
            (Protocol::Udp | Protocol::Tcp, None) => None,
            (Protocol::Udp | Protocol::Tcp, Some(_)) => {
                return Err(self.invalid("tls_identity only applies to tls and https endpoints"))
            }
            (Protocol::Tls, Some(hostname)) => {
                validate_hostname(hostname).map_err(|reason| self.invalid(&reason))?;
                Some(Arc::from(hostname))
            }
            (Protocol::Tls, None) => {
                return Err(self.invalid("tls endpoints need a certificate hostname"))
            }
            (Protocol::Https, Some(template)) => {
                validate_doh_template(template).map_err(|reason| self.invalid(&reason))?;
                Some(Arc::from(template))
            }
            (Protocol::Https, None) => {
                return Err(self.invalid("https endpoints need a URL template"))
            }
        };

        Ok(ServerEndpoint::new(addr, self.protocol, identity))
    }

    fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let raw = self.address.trim();
        let addr = if let Ok(with_port) = raw.parse::<SocketAddr>() {
            if let Some(port) = self.port {
                if port != with_port.port() {
                    return Err(ConfigError::InvalidAddress {
                        address: self.address.clone(),
                        reason: format!("port {} conflicts with port field {}", with_port.port(), port),
                    });
                }
            }
            with_port
        } else {
            let bare = raw.trim_start_matches('[').trim_end_matches(']');
            let ip: IpAddr = bare.parse().map_err(|_| ConfigError::InvalidAddress {
                address: self.address.clone(),
                reason: "expected an IPv4 or IPv6 literal".to_string(),
            })?;
            SocketAddr::new(ip, self.port.unwrap_or_else(|| self.protocol.default_port()))
        };

        if addr.port() == 0 {
            return Err(ConfigError::InvalidAddress {
                address: self.address.clone(),
                reason: "port cannot be 0".to_string(),
            });
        }
        Ok(addr)
    }

    fn invalid(&self, reason: &str) -> ConfigError {
        ConfigError::InvalidEndpoint {
            endpoint: self.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for EndpointConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.protocol, self.address)?;
        if let Some(port) = self.port {
            write!(f, " port {}", port)?;
        }
        if let Some(identity) = &self.tls_identity {
            write!(f, "#{}", identity)?;
        }
        Ok(())
    }
}

/// Compact form used on the command line:
///
/// - `udp://1.1.1.1`, `tcp://[2606:4700::1111]:53`
/// - `tls://1.1.1.1#cloudflare-dns.com`
/// - `https://1.1.1.1/dns-query`
/// - `https://1.1.1.1#https://cloudflare-dns.com/dns-query{?dns}`
///
/// A bare address is UDP.
impl FromStr for EndpointConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (protocol, rest) = match s.split_once("://") {
            Some((scheme, rest)) => {
                let protocol = match scheme.to_ascii_lowercase().as_str() {
                    "udp" => Protocol::Udp,
                    "tcp" => Protocol::Tcp,
                    "tls" | "dot" => Protocol::Tls,
                    "https" | "doh" => Protocol::Https,
                    other => {
                        return Err(ConfigError::InvalidEndpoint {
                            endpoint: s.to_string(),
                            reason: format!("unknown scheme '{}'", other),
                        })
                    }
                };
                (protocol, rest)
            }
            None => (Protocol::Udp, s),
        };

        let (host, identity) = match rest.split_once('#') {
            Some((host, identity)) => (host.to_string(), Some(identity.to_string())),
            None if protocol == Protocol::Https => {
                let host = rest.split('/').next().unwrap_or(rest).to_string();
                (host, Some(format!("https://{}", rest)))
            }
            None => (rest.to_string(), None),
        };

        Ok(EndpointConfig {
            address: host,
            port: None,
            protocol,
            tls_identity: identity,
        })
    }
}
