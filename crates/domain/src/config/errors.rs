use thiserror::Error;

/// Configuration problems surfaced to the settings layer. None of these ever
/// reach the resolver chain: an invalid list is rejected before it is applied.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid server address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Duplicate endpoint: {0}")]
    DuplicateEndpoint(String),

    #[error("Invalid host override '{hostname}': {reason}")]
    InvalidHostOverride { hostname: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
