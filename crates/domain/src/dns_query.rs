use super::ResolutionKey;

/// One outgoing exchange: the key being resolved plus the transaction id
/// the transport will put on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DnsQuery {
    pub key: ResolutionKey,
    pub id: u16,
}

impl DnsQuery {
    pub fn new(key: ResolutionKey, id: u16) -> Self {
        Self { key, id }
    }

    /// Same key, different transaction id. Used for retries so a late reply
    /// to the first attempt can never be mistaken for the second.
    pub fn with_fresh_id(&self, id: u16) -> Self {
        let id = if id == self.id { id.wrapping_add(1) } else { id };
        Self {
            key: self.key.clone(),
            id,
        }
    }
}
