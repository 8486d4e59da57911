//! Configuration for the resolution override layer
//!
//! - `resolver`: timeouts, exhaustion policy and TTL floors
//! - `endpoint`: one configured server as the settings layer supplies it
//! - `cache`: answer cache bounds and sweeping
//! - `transport`: connection pooling and DoH method
//! - `hosts`: manual hostname overrides
//! - `logging`: logging settings
//! - `errors`: configuration errors

pub mod cache;
pub mod endpoint;
pub mod errors;
pub mod hosts;
pub mod logging;
pub mod resolver;
pub mod transport;

pub use cache::CacheConfig;
pub use endpoint::EndpointConfig;
pub use errors::ConfigError;
pub use hosts::HostOverride;
pub use logging::LoggingConfig;
pub use resolver::{OnExhaustion, ResolverConfig};
pub use transport::{DohMethod, TransportConfig};

use crate::endpoint::ServerEndpoint;
use crate::validators::validate_hostname;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;
use std::path::Path;

const DEFAULT_CONFIG_FILES: &[&str] = &["custom-dns.toml", "/etc/custom-dns/custom-dns.toml"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Ordered server list; the first entry is the primary. Empty means inactive.
    #[serde(default)]
    pub servers: Vec<EndpointConfig>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub hosts: Vec<HostOverride>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load from `path`, or from the first default location that exists.
    /// No file at all yields the default configuration.
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => match DEFAULT_CONFIG_FILES.iter().find(|p| Path::new(p).exists()) {
                Some(path) => Self::from_file(path),
                None => Ok(Self::default()),
            },
        }
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.attempt_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.attempt_timeout_ms",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.resolver.resolution_timeout_ms < self.resolver.attempt_timeout_ms {
            return Err(ConfigError::InvalidValue {
                field: "resolver.resolution_timeout_ms",
                reason: format!(
                    "{} is shorter than attempt_timeout_ms ({})",
                    self.resolver.resolution_timeout_ms, self.resolver.attempt_timeout_ms
                ),
            });
        }
        if self.cache.max_entries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache.max_entries",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.transport.max_connections_per_endpoint == 0 {
            return Err(ConfigError::InvalidValue {
                field: "transport.max_connections_per_endpoint",
                reason: "must be greater than 0".to_string(),
            });
        }

        for host in &self.hosts {
            validate_host_override(host)?;
        }

        self.endpoints().map(|_| ())
    }

    /// Validated, ordered endpoint list for the resolver chain.
    pub fn endpoints(&self) -> Result<Vec<ServerEndpoint>, ConfigError> {
        build_endpoints(&self.servers)
    }
}

/// Validate a server list as a whole: every entry must be valid and no endpoint
/// may appear twice.
pub fn build_endpoints(servers: &[EndpointConfig]) -> Result<Vec<ServerEndpoint>, ConfigError> {
    let mut seen = HashSet::with_capacity(servers.len());
    let mut endpoints = Vec::with_capacity(servers.len());

    for server in servers {
        let endpoint = server.to_endpoint()?;
        if !seen.insert((endpoint.addr, endpoint.protocol)) {
            return Err(ConfigError::DuplicateEndpoint(endpoint.to_string()));
        }
        endpoints.push(endpoint);
    }

    Ok(endpoints)
}

pub fn validate_host_override(host: &HostOverride) -> Result<IpAddr, ConfigError> {
    validate_hostname(&host.hostname).map_err(|reason| ConfigError::InvalidHostOverride {
        hostname: host.hostname.clone(),
        reason,
    })?;
    host.address
        .trim()
        .parse::<IpAddr>()
        .map_err(|_| ConfigError::InvalidHostOverride {
            hostname: host.hostname.clone(),
            reason: format!("'{}' is not an IP address", host.address),
        })
}
