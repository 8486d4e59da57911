pub mod compaction;
pub mod metrics;
pub mod storage;

pub use compaction::CacheSweeper;
pub use metrics::{CacheMetrics, CacheStats};
pub use storage::DnsCache;
