use arc_swap::ArcSwap;
use custom_dns_domain::ServerEndpoint;
use std::sync::Arc;

/// The ordered server list one resolution runs against. Never mutated; a
/// configuration change installs a new snapshot with the next version.
#[derive(Debug)]
pub struct ConfigSnapshot {
    pub version: u64,
    pub endpoints: Arc<[ServerEndpoint]>,
}

impl ConfigSnapshot {
    pub fn is_active(&self) -> bool {
        !self.endpoints.is_empty()
    }
}

pub struct SnapshotStore {
    current: ArcSwap<ConfigSnapshot>,
}

impl SnapshotStore {
    pub fn new(endpoints: Vec<ServerEndpoint>) -> Self {
        Self {
            current: ArcSwap::from_pointee(ConfigSnapshot {
                version: 0,
                endpoints: Arc::from(endpoints),
            }),
        }
    }

    pub fn load(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Install `endpoints` as the next version and return it.
    pub fn replace(&self, endpoints: Vec<ServerEndpoint>) -> Arc<ConfigSnapshot> {
        let endpoints: Arc<[ServerEndpoint]> = Arc::from(endpoints);
        self.current.rcu(|old| ConfigSnapshot {
            version: old.version + 1,
            endpoints: Arc::clone(&endpoints),
        });
        self.load()
    }
}
