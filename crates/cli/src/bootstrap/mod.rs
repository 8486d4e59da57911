pub mod config;
pub mod logging;

pub use config::{load_config, parse_servers};
pub use logging::init_logging;
