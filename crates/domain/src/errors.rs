use thiserror::Error;

/// Malformed wire data. Always treated as if the endpoint had failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("message is {len} bytes, shorter than the 12-byte header")]
    TooShort { len: usize },

    #[error("{section} section claims {claimed} records but only {remaining} bytes remain")]
    CountExceedsData {
        section: &'static str,
        claimed: u16,
        remaining: usize,
    },

    #[error("compression pointer cycle at offset {offset}")]
    PointerCycle { offset: usize },

    #[error("malformed DNS message: {0}")]
    Malformed(String),
}

/// Failure of one exchange with one endpoint. Recoverable by fallback.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("timeout talking to {0}")]
    Timeout(String),

    #[error("connection refused by {0}")]
    ConnectionRefused(String),

    #[error("TLS validation failed for {0}")]
    TlsValidationFailed(String),

    #[error("protocol violation: {0}")]
    ProtocolViolation(String),
}

impl TransportError {
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Timeout(_) => "timeout",
            TransportError::ConnectionRefused(_) => "connection-refused",
            TransportError::TlsValidationFailed(_) => "tls-validation-failed",
            TransportError::ProtocolViolation(_) => "protocol-violation",
        }
    }
}

/// Anything that can go wrong for a single upstream exchange.
/// Never leaves the resolver chain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// The only errors that cross the public resolution boundary.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("name not found")]
    NameNotFound,

    #[error("server failure: no configured server produced a usable answer")]
    ServerFailure,
}
