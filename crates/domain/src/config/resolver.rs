use serde::{Deserialize, Serialize};

/// What the entry point does when every configured server has failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnExhaustion {
    /// Surface `server-failure` to the engine.
    Fail,
    /// Hand the lookup to the operating system resolver.
    #[default]
    FallbackToSystemResolver,
}

/// Resolver chain timing and TTL policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Per-attempt transport timeout in milliseconds (default: 2000)
    #[serde(default = "default_attempt_timeout")]
    pub attempt_timeout_ms: u64,

    /// Wall-clock bound across all endpoint attempts of one resolution (default: 5000)
    #[serde(default = "default_resolution_timeout")]
    pub resolution_timeout_ms: u64,

    #[serde(default)]
    pub on_exhaustion: OnExhaustion,

    /// TTL for name-not-found answers that carry no SOA (default: 60)
    #[serde(default = "default_negative_ttl")]
    pub negative_ttl: u32,

    /// TTL for positive answers that carry no records, e.g. NODATA (default: 0)
    #[serde(default)]
    pub ttl_floor: u32,

    /// Upper bound on how long any answer is cached, in seconds (default: 86400)
    #[serde(default = "default_max_ttl")]
    pub max_ttl: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            attempt_timeout_ms: default_attempt_timeout(),
            resolution_timeout_ms: default_resolution_timeout(),
            on_exhaustion: OnExhaustion::default(),
            negative_ttl: default_negative_ttl(),
            ttl_floor: 0,
            max_ttl: default_max_ttl(),
        }
    }
}

fn default_attempt_timeout() -> u64 {
    2000
}

fn default_resolution_timeout() -> u64 {
    5000
}

fn default_negative_ttl() -> u32 {
    60
}

fn default_max_ttl() -> u32 {
    86_400
}
