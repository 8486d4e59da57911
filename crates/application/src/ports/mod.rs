mod dns_resolver;
mod system_resolver;

pub use dns_resolver::DnsResolver;
pub use system_resolver::SystemResolver;
