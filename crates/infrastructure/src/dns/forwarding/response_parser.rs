use super::message_builder::MessageBuilder;
use super::record_type_map::RecordTypeMapper;
use super::wire_scan::{RecordSpan, WireScanner, HEADER_LEN, QR_FLAG, TC_FLAG};
use bytes::Bytes;
use custom_dns_domain::resolution_key::normalize_name;
use custom_dns_domain::{
    AnswerRecord, DecodeError, DnsQuery, DnsResponse, RecordData, ResponseCode, TransportError,
    UpstreamError,
};
use hickory_proto::op::{Message, MessageType, ResponseCode as HickoryResponseCode};
use hickory_proto::rr::{RData, Record};
use std::sync::Arc;
use tracing::debug;

pub struct ResponseParser;

impl ResponseParser {
    /// Decode a raw response. Pure transform, no matching against a query.
    pub fn decode(response_bytes: Bytes) -> Result<DnsResponse, DecodeError> {
        match Self::parse(response_bytes.clone()) {
            Ok((_, response)) => Ok(response),
            Err(e) => Self::truncated_header(&response_bytes, e),
        }
    }

    /// Decode a response and check it answers `query`: same transaction id,
    /// QR bit set, same question. A mismatch is a protocol violation.
    pub fn decode_for(query: &DnsQuery, response_bytes: Bytes) -> Result<DnsResponse, UpstreamError> {
        let (message, response) = match Self::parse(response_bytes.clone()) {
            Ok(parsed) => parsed,
            Err(e) => {
                let header = Self::truncated_header(&response_bytes, e)?;
                if header.id != query.id {
                    return Err(TransportError::ProtocolViolation(format!(
                        "truncated response id {} does not match query id {}",
                        header.id, query.id
                    ))
                    .into());
                }
                return Ok(header);
            }
        };

        if message.id() != query.id {
            return Err(TransportError::ProtocolViolation(format!(
                "response id {} does not match query id {}",
                message.id(),
                query.id
            ))
            .into());
        }

        if message.message_type() != MessageType::Response {
            return Err(
                TransportError::ProtocolViolation("reply is not a response".to_string()).into(),
            );
        }

        let expected = MessageBuilder::query_name(&query.key.name)?;
        let echoed = message.queries().first().ok_or_else(|| {
            TransportError::ProtocolViolation("response carries no question".to_string())
        })?;
        let same_name =
            normalize_name(&echoed.name().to_ascii()) == normalize_name(&expected.to_ascii());
        let same_type = RecordTypeMapper::from_hickory(echoed.query_type()) == query.key.record_type;
        if !same_name || !same_type {
            return Err(TransportError::ProtocolViolation(format!(
                "response question '{} {}' does not match query '{}'",
                echoed.name(),
                echoed.query_type(),
                query.key
            ))
            .into());
        }

        Ok(response)
    }

    fn parse(response_bytes: Bytes) -> Result<(Message, DnsResponse), DecodeError> {
        let layout = WireScanner::scan(&response_bytes)?;

        let message = Message::from_vec(&response_bytes)
            .map_err(|e| DecodeError::Malformed(format!("failed to parse DNS response: {}", e)))?;

        let code = Self::map_rcode(message.response_code());

        let answers: Vec<AnswerRecord> = message
            .answers()
            .iter()
            .zip(layout.answers.iter())
            .map(|(record, span)| Self::answer(record, span, &response_bytes))
            .collect();

        let mut response = DnsResponse::new(message.id(), code, answers);
        response.truncated = layout.truncated;

        if response.answers.is_empty() {
            response.ttl = Self::negative_soa_ttl(&message);
        }

        debug!(
            rcode = %response.code,
            answers = response.answers.len(),
            truncated = response.truncated,
            ttl = ?response.ttl,
            "DNS response parsed"
        );

        Ok((message, response))
    }

    /// A reply with TC set may be cut anywhere after the header. Keep only the
    /// header so the caller can retry over TCP; anything else keeps `err`.
    fn truncated_header(raw: &[u8], err: DecodeError) -> Result<DnsResponse, DecodeError> {
        if raw.len() < HEADER_LEN || raw[2] & QR_FLAG == 0 || raw[2] & TC_FLAG == 0 {
            return Err(err);
        }

        let id = u16::from_be_bytes([raw[0], raw[1]]);
        let rcode = HickoryResponseCode::from_low(raw[3] & 0x0F);
        let mut response = DnsResponse::new(id, Self::map_rcode(rcode), Vec::new());
        response.truncated = true;

        debug!(id, error = %err, "Truncated response body dropped, header kept");
        Ok(response)
    }

    fn answer(record: &Record, span: &RecordSpan, raw: &Bytes) -> AnswerRecord {
        let name = normalize_name(&record.name().to_ascii());
        let data = match record.data() {
            RData::A(a) => RecordData::A(a.0),
            RData::AAAA(aaaa) => RecordData::Aaaa(aaaa.0),
            RData::CNAME(canonical) => {
                RecordData::Cname(Arc::from(normalize_name(&canonical.0.to_ascii()).as_str()))
            }
            _ => RecordData::Opaque {
                type_code: span.type_code,
                payload: raw.slice(span.rdata.clone()),
            },
        };
        AnswerRecord::new(name, wire_ttl(record.ttl()), data)
    }

    /// SOA minimum from the authority section, capped by the SOA record's own TTL.
    fn negative_soa_ttl(message: &Message) -> Option<u32> {
        message.name_servers().iter().find_map(|r| {
            if let RData::SOA(soa) = r.data() {
                Some(wire_ttl(soa.minimum()).min(wire_ttl(r.ttl())))
            } else {
                None
            }
        })
    }

    pub fn map_rcode(rcode: HickoryResponseCode) -> ResponseCode {
        match rcode {
            HickoryResponseCode::NoError => ResponseCode::Success,
            HickoryResponseCode::NXDomain => ResponseCode::NameNotFound,
            HickoryResponseCode::FormErr => ResponseCode::Malformed,
            _ => ResponseCode::ServerFailure,
        }
    }
}

/// TTLs with the top bit set are read as zero (RFC 2181 §8).
fn wire_ttl(ttl: u32) -> u32 {
    if ttl > i32::MAX as u32 {
        0
    } else {
        ttl
    }
}
