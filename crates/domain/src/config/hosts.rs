use serde::{Deserialize, Serialize};

/// Manual hostname → address entry, answered before any server is asked.
///
/// An IPv4 address answers A lookups, an IPv6 address answers AAAA lookups.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HostOverride {
    pub hostname: String,
    pub address: String,
}

impl HostOverride {
    pub fn new(hostname: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            address: address.into(),
        }
    }
}
