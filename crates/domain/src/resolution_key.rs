use super::RecordType;
use std::fmt;
use std::sync::Arc;

/// Cache and coordinator index: a case-normalized name plus record type.
///
/// The name is lower-cased and stripped of its trailing root dot, so
/// `Example.COM.` and `example.com` address the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolutionKey {
    pub name: Arc<str>,
    pub record_type: RecordType,
}

impl ResolutionKey {
    pub fn new(name: &str, record_type: RecordType) -> Self {
        Self {
            name: Arc::from(normalize_name(name).as_str()),
            record_type,
        }
    }
}

impl fmt::Display for ResolutionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.record_type)
    }
}

/// Lower-case a hostname and drop the trailing root label dot.
pub fn normalize_name(name: &str) -> String {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    trimmed.to_ascii_lowercase()
}
