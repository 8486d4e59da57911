use custom_dns_domain::ResolverConfig;
use std::time::Duration;

/// Chain timing and TTL policy, resolved from the domain configuration.
#[derive(Debug, Clone)]
pub struct ChainConfig {
    /// Bound on one exchange with one endpoint
    pub attempt_timeout: Duration,
    /// Bound on a whole resolution across every endpoint
    pub resolution_timeout: Duration,
    /// TTL for name-not-found answers without an SOA
    pub negative_ttl: u32,
    /// TTL for positive answers that carried no records
    pub ttl_floor: u32,
    /// Cap applied to every cached TTL
    pub max_ttl: u32,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl ChainConfig {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            attempt_timeout: Duration::from_millis(config.attempt_timeout_ms),
            resolution_timeout: Duration::from_millis(config.resolution_timeout_ms),
            negative_ttl: config.negative_ttl,
            ttl_floor: config.ttl_floor,
            max_ttl: config.max_ttl,
        }
    }

    pub fn with_attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn with_resolution_timeout(mut self, timeout: Duration) -> Self {
        self.resolution_timeout = timeout;
        self
    }
}
