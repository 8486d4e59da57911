//! Resolver chain
//!
//! - **Cache**: answers served until their TTL runs out
//! - **In-flight coordinator**: one network resolution per key at a time
//! - **Fallback loop**: configured servers in order, with per-outcome retry policy
//! - **Exchange**: one query against one endpoint over its transport
//!
//! ```ignore
//! let chain = ResolverBuilder::new(exchange)
//!     .with_cache(cache)
//!     .with_endpoints(endpoints)
//!     .build();
//! ```

pub mod builder;
pub mod chain;
pub mod config;
pub mod exchange;
pub mod fallback;
pub mod snapshot;

pub use builder::ResolverBuilder;
pub use chain::ResolverChain;
pub use config::ChainConfig;
pub use exchange::{NetworkExchange, UpstreamExchange};
pub use fallback::{AttemptOutcome, NextStep};
pub use snapshot::{ConfigSnapshot, SnapshotStore};
