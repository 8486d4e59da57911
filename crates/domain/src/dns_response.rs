use super::RecordType;
use bytes::Bytes;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

/// Result code of a resolution as seen by the resolver chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseCode {
    Success,
    NameNotFound,
    ServerFailure,
    Malformed,
    Timeout,
}

impl ResponseCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseCode::Success => "NOERROR",
            ResponseCode::NameNotFound => "NXDOMAIN",
            ResponseCode::ServerFailure => "SERVFAIL",
            ResponseCode::Malformed => "FORMERR",
            ResponseCode::Timeout => "TIMEOUT",
        }
    }
}

impl fmt::Display for ResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record payload. Types without a dedicated variant keep their raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Cname(Arc<str>),
    Opaque { type_code: u16, payload: Bytes },
}

impl RecordData {
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            RecordData::A(v4) => Some(IpAddr::V4(*v4)),
            RecordData::Aaaa(v6) => Some(IpAddr::V6(*v6)),
            _ => None,
        }
    }
}

/// One answer section record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub name: Arc<str>,
    pub record_type: RecordType,
    /// Time to live in seconds
    pub ttl: u32,
    pub data: RecordData,
}

impl AnswerRecord {
    pub fn new(name: impl Into<Arc<str>>, ttl: u32, data: RecordData) -> Self {
        let record_type = match &data {
            RecordData::A(_) => RecordType::A,
            RecordData::Aaaa(_) => RecordType::AAAA,
            RecordData::Cname(_) => RecordType::CNAME,
            RecordData::Opaque { type_code, .. } => RecordType::from_u16(*type_code),
        };
        Self {
            name: name.into(),
            record_type,
            ttl,
            data,
        }
    }
}

/// Decoded DNS response.
///
/// `ttl` is the caching lifetime derived from the message itself: the
/// minimum answer TTL, or the SOA minimum for a negative answer. `None`
/// means the message carried neither and the caller applies its floor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsResponse {
    pub id: u16,
    pub code: ResponseCode,
    pub truncated: bool,
    pub answers: Vec<AnswerRecord>,
    pub ttl: Option<u32>,
}

impl DnsResponse {
    pub fn new(id: u16, code: ResponseCode, answers: Vec<AnswerRecord>) -> Self {
        let ttl = answers.iter().map(|a| a.ttl).min();
        Self {
            id,
            code,
            truncated: false,
            answers,
            ttl,
        }
    }

    /// Terminal response synthesized by the resolver chain, never by a server.
    pub fn synthetic(code: ResponseCode) -> Self {
        Self {
            id: 0,
            code,
            truncated: false,
            answers: Vec::new(),
            ttl: None,
        }
    }

    pub fn addresses(&self) -> Vec<IpAddr> {
        self.answers
            .iter()
            .filter_map(|a| a.data.address())
            .collect()
    }

    pub fn cname_chain(&self) -> Vec<Arc<str>> {
        self.answers
            .iter()
            .filter_map(|a| match &a.data {
                RecordData::Cname(target) => Some(Arc::clone(target)),
                _ => None,
            })
            .collect()
    }

    /// Caching lifetime, with `floor` standing in when the message carried none.
    pub fn cache_ttl(&self, floor: u32) -> u32 {
        self.ttl.unwrap_or(floor)
    }

    pub fn is_success(&self) -> bool {
        self.code == ResponseCode::Success
    }

    pub fn is_name_not_found(&self) -> bool {
        self.code == ResponseCode::NameNotFound
    }

    /// NOERROR with nothing in the answer section.
    pub fn is_nodata(&self) -> bool {
        self.code == ResponseCode::Success && self.answers.is_empty()
    }
}
