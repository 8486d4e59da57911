//! Custom DNS Domain Layer
pub mod config;
pub mod dns_query;
pub mod dns_response;
pub mod endpoint;
pub mod errors;
pub mod record_type;
pub mod resolution_key;
pub mod validators;

pub use config::{
    CacheConfig, Config, ConfigError, DohMethod, EndpointConfig, HostOverride, LoggingConfig,
    OnExhaustion, ResolverConfig, TransportConfig,
};
pub use dns_query::DnsQuery;
pub use dns_response::{AnswerRecord, DnsResponse, RecordData, ResponseCode};
pub use endpoint::{Protocol, ServerEndpoint};
pub use errors::{DecodeError, ResolutionError, TransportError, UpstreamError};
pub use record_type::RecordType;
pub use resolution_key::ResolutionKey;
