pub mod cache;
pub mod forwarding;
pub mod inflight;
pub mod resolver;
pub mod transport;

pub use cache::{CacheSweeper, CacheStats, DnsCache};
pub use inflight::{InFlightCoordinator, InFlightStats};
pub use resolver::{ChainConfig, NetworkExchange, ResolverBuilder, ResolverChain, UpstreamExchange};
pub use transport::{TransportOptions, TransportRegistry};
