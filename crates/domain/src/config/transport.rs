use serde::{Deserialize, Serialize};

/// How DoH queries are carried (RFC 8484 §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DohMethod {
    /// Binary `application/dns-message` request body
    #[default]
    Post,
    /// base64url-encoded `?dns=` query parameter
    Get,
}

/// Connection pooling and protocol knobs shared by every transport
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransportConfig {
    /// Cap on concurrent TCP/TLS connections to one endpoint (default: 4)
    #[serde(default = "default_max_connections")]
    pub max_connections_per_endpoint: usize,

    /// Idle pooled connections older than this are closed (default: 30)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    #[serde(default)]
    pub doh_method: DohMethod,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            max_connections_per_endpoint: default_max_connections(),
            idle_timeout_secs: default_idle_timeout(),
            doh_method: DohMethod::default(),
        }
    }
}

fn default_max_connections() -> usize {
    4
}

fn default_idle_timeout() -> u64 {
    30
}
