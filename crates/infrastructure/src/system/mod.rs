pub mod gai_resolver;

pub use gai_resolver::GaiSystemResolver;
