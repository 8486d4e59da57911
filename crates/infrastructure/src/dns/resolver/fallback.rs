use custom_dns_domain::{
    DecodeError, DnsResponse, Protocol, ResponseCode, TransportError, UpstreamError,
};

/// Outcome of one exchange with one endpoint, as the fallback loop sees it.
#[derive(Debug)]
pub enum AttemptOutcome {
    Answer(DnsResponse),
    NameNotFound(DnsResponse),
    /// SERVFAIL, REFUSED, FORMERR and friends from the server itself
    ServerRejected(ResponseCode),
    Truncated,
    Timeout,
    ConnectionRefused,
    TlsValidationFailed,
    ProtocolViolation,
    Malformed(DecodeError),
}

/// What the loop does next for the current endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextStep {
    /// Terminal answer; cache it and stop
    Finish,
    /// Same endpoint again with a new transaction id
    RetryWithFreshId,
    /// Same server over TCP
    RetryOverTcp,
    /// Move on and skip this endpoint for the rest of the attempt
    AbandonEndpoint,
    NextEndpoint,
}

impl AttemptOutcome {
    pub fn classify(result: Result<DnsResponse, UpstreamError>, protocol: Protocol) -> Self {
        match result {
            Ok(response) if response.truncated && protocol == Protocol::Udp => Self::Truncated,
            // header-only remains of a cut reply on a stream transport
            Ok(response)
                if response.truncated
                    && response.answers.is_empty()
                    && response.code == ResponseCode::Success =>
            {
                Self::ProtocolViolation
            }
            Ok(response) => match response.code {
                ResponseCode::Success => Self::Answer(response),
                ResponseCode::NameNotFound => Self::NameNotFound(response),
                code => Self::ServerRejected(code),
            },
            Err(UpstreamError::Transport(err)) => match err {
                TransportError::Timeout(_) => Self::Timeout,
                TransportError::ConnectionRefused(_) => Self::ConnectionRefused,
                TransportError::TlsValidationFailed(_) => Self::TlsValidationFailed,
                TransportError::ProtocolViolation(_) => Self::ProtocolViolation,
            },
            Err(UpstreamError::Decode(err)) => Self::Malformed(err),
        }
    }

    /// `timeout_retried` is whether this endpoint already spent its one
    /// timeout retry; `over_tcp` whether the truncation fallback already ran.
    pub fn next_step(&self, timeout_retried: bool, over_tcp: bool) -> NextStep {
        match self {
            Self::Answer(_) | Self::NameNotFound(_) => NextStep::Finish,
            Self::Truncated if !over_tcp => NextStep::RetryOverTcp,
            Self::Timeout if !timeout_retried => NextStep::RetryWithFreshId,
            Self::TlsValidationFailed => NextStep::AbandonEndpoint,
            _ => NextStep::NextEndpoint,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Answer(_) => "answer",
            Self::NameNotFound(_) => "name-not-found",
            Self::ServerRejected(_) => "server-rejected",
            Self::Truncated => "truncated",
            Self::Timeout => "timeout",
            Self::ConnectionRefused => "connection-refused",
            Self::TlsValidationFailed => "tls-validation-failed",
            Self::ProtocolViolation => "protocol-violation",
            Self::Malformed(_) => "malformed",
        }
    }
}
