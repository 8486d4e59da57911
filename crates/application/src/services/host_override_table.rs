use custom_dns_domain::config::validate_host_override;
use custom_dns_domain::resolution_key::normalize_name;
use custom_dns_domain::{ConfigError, HostOverride, RecordType};
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info};

/// Manual hostname → address entries, answered before any server is asked.
///
/// A hostname may carry several addresses; IPv4 ones answer A lookups and
/// IPv6 ones answer AAAA lookups. A hostname present in the table is
/// authoritative for address lookups even when it has nothing of the asked
/// family.
pub struct HostOverrideTable {
    entries: DashMap<Arc<str>, Vec<IpAddr>, FxBuildHasher>,
}

impl HostOverrideTable {
    pub fn new() -> Self {
        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
        }
    }

    pub fn from_config(hosts: &[HostOverride]) -> Result<Self, ConfigError> {
        let table = Self::new();
        for host in hosts {
            let ip = validate_host_override(host)?;
            table.insert(&host.hostname, ip);
        }
        if !table.is_empty() {
            info!(entries = table.len(), "Host overrides loaded");
        }
        Ok(table)
    }

    /// Add `ip` under `hostname`. Re-adding an existing pair is a no-op.
    pub fn add(&self, hostname: &str, ip: &str) -> Result<IpAddr, ConfigError> {
        let ip = validate_host_override(&HostOverride::new(hostname, ip))?;
        self.insert(hostname, ip);
        debug!(hostname = %hostname, ip = %ip, "Host override added");
        Ok(ip)
    }

    fn insert(&self, hostname: &str, ip: IpAddr) {
        let name: Arc<str> = Arc::from(normalize_name(hostname).as_str());
        let mut addresses = self.entries.entry(name).or_default();
        if !addresses.contains(&ip) {
            addresses.push(ip);
        }
    }

    /// Remove every address under `hostname`. Returns whether it existed.
    pub fn remove(&self, hostname: &str) -> bool {
        let removed = self
            .entries
            .remove(normalize_name(hostname).as_str())
            .is_some();
        if removed {
            debug!(hostname = %hostname, "Host override removed");
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Snapshot of the table, sorted by hostname.
    pub fn entries(&self) -> Vec<(Arc<str>, Vec<IpAddr>)> {
        let mut entries: Vec<_> = self
            .entries
            .iter()
            .map(|e| (Arc::clone(e.key()), e.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// `None` when the table has no say for this lookup.
    pub fn lookup(&self, hostname: &str, record_type: RecordType) -> Option<Vec<IpAddr>> {
        if !record_type.is_address() {
            return None;
        }
        let entry = self.entries.get(normalize_name(hostname).as_str())?;
        Some(
            entry
                .iter()
                .copied()
                .filter(|ip| match record_type {
                    RecordType::A => ip.is_ipv4(),
                    _ => ip.is_ipv6(),
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HostOverrideTable {
    fn default() -> Self {
        Self::new()
    }
}
