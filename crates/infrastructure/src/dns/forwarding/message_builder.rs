//! DNS Message Builder
//!
//! Constructs DNS query messages in wire format using `hickory-proto`.

use super::record_type_map::RecordTypeMapper;
use custom_dns_domain::{DecodeError, DnsQuery};
use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::{DNSClass, Name};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::str::FromStr;

/// Builds DNS query messages in wire format
pub struct MessageBuilder;

impl MessageBuilder {
    /// Serialize `query` as a standard recursive query:
    /// - the query's own transaction id
    /// - RD (Recursion Desired) flag set
    /// - single IN-class question
    pub fn encode(query: &DnsQuery) -> Result<Vec<u8>, DecodeError> {
        let name = Self::query_name(&query.key.name)?;

        let mut question = Query::new();
        question.set_name(name);
        question.set_query_type(RecordTypeMapper::to_hickory(query.key.record_type));
        question.set_query_class(DNSClass::IN);

        let mut message = Message::new();
        message
            .set_id(query.id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(question);

        Self::serialize_message(&message)
    }

    /// Parse a hostname into the absolute name that goes on the wire.
    pub fn query_name(domain: &str) -> Result<Name, DecodeError> {
        let mut name = Name::from_str(domain).map_err(|e| {
            DecodeError::Malformed(format!("invalid domain '{}': {}", domain, e))
        })?;
        name.set_fqdn(true);
        Ok(name)
    }

    fn serialize_message(message: &Message) -> Result<Vec<u8>, DecodeError> {
        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);

        message.emit(&mut encoder).map_err(|e| {
            DecodeError::Malformed(format!("failed to serialize DNS message: {}", e))
        })?;

        Ok(buf)
    }
}
