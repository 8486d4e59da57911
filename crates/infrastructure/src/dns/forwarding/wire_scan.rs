//! Structural walk over a raw DNS message.
//!
//! Runs before the message is handed to `hickory-proto` so that the three
//! framing faults (short header, counts the payload cannot hold, looping
//! compression pointers) surface as their own `DecodeError` kinds. It also
//! records where each answer's RDATA lives so unsupported record types can be
//! kept as opaque payloads without re-encoding.

use custom_dns_domain::DecodeError;
use smallvec::SmallVec;
use std::ops::Range;

pub const HEADER_LEN: usize = 12;

pub const QR_FLAG: u8 = 0x80;
pub const TC_FLAG: u8 = 0x02;
const MAX_NAME_LEN: usize = 255;
/// Root label plus QTYPE and QCLASS.
const MIN_QUESTION_LEN: usize = 1 + 4;
/// Root label plus TYPE, CLASS, TTL and RDLENGTH.
const MIN_RECORD_LEN: usize = 1 + 10;

/// Location of one answer record inside the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSpan {
    pub type_code: u16,
    pub ttl: u32,
    pub rdata: Range<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireLayout {
    pub id: u16,
    pub truncated: bool,
    pub question_count: u16,
    pub answers: Vec<RecordSpan>,
}

pub struct WireScanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireScanner<'a> {
    pub fn scan(buf: &'a [u8]) -> Result<WireLayout, DecodeError> {
        if buf.len() < HEADER_LEN {
            return Err(DecodeError::TooShort { len: buf.len() });
        }

        let id = u16::from_be_bytes([buf[0], buf[1]]);
        let truncated = buf[2] & TC_FLAG != 0;
        let qdcount = u16::from_be_bytes([buf[4], buf[5]]);
        let ancount = u16::from_be_bytes([buf[6], buf[7]]);
        let nscount = u16::from_be_bytes([buf[8], buf[9]]);
        let arcount = u16::from_be_bytes([buf[10], buf[11]]);

        let mut scanner = WireScanner {
            buf,
            pos: HEADER_LEN,
        };

        scanner.check_count("question", qdcount, MIN_QUESTION_LEN)?;
        for _ in 0..qdcount {
            scanner.skip_name()?;
            scanner.take(4)?;
        }

        scanner.check_count("answer", ancount, MIN_RECORD_LEN)?;
        let mut answers = Vec::with_capacity(ancount as usize);
        for _ in 0..ancount {
            answers.push(scanner.record()?);
        }

        scanner.check_count("authority", nscount, MIN_RECORD_LEN)?;
        for _ in 0..nscount {
            scanner.record()?;
        }

        scanner.check_count("additional", arcount, MIN_RECORD_LEN)?;
        for _ in 0..arcount {
            scanner.record()?;
        }

        Ok(WireLayout {
            id,
            truncated,
            question_count: qdcount,
            answers,
        })
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn check_count(
        &self,
        section: &'static str,
        claimed: u16,
        min_len: usize,
    ) -> Result<(), DecodeError> {
        if claimed as usize * min_len > self.remaining() {
            return Err(DecodeError::CountExceedsData {
                section,
                claimed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::Malformed(format!(
                "record runs past end of message at offset {}",
                self.pos
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn record(&mut self) -> Result<RecordSpan, DecodeError> {
        self.skip_name()?;
        let fixed = self.take(10)?;
        let type_code = u16::from_be_bytes([fixed[0], fixed[1]]);
        let ttl = u32::from_be_bytes([fixed[4], fixed[5], fixed[6], fixed[7]]);
        let rdlength = u16::from_be_bytes([fixed[8], fixed[9]]) as usize;

        let start = self.pos;
        self.take(rdlength)?;
        Ok(RecordSpan {
            type_code,
            ttl,
            rdata: start..self.pos,
        })
    }

    /// Advance past a possibly compressed name, following pointers only to
    /// validate them.
    fn skip_name(&mut self) -> Result<(), DecodeError> {
        self.pos = walk_name(self.buf, self.pos)?;
        Ok(())
    }
}

/// Walk the name starting at `start` and return the offset just past it in
/// the original byte stream.
///
/// A compression pointer must point strictly before itself, and no pointer
/// may be followed twice; either violation is a cycle.
pub fn walk_name(buf: &[u8], start: usize) -> Result<usize, DecodeError> {
    let mut pos = start;
    let mut end: Option<usize> = None;
    let mut visited: SmallVec<[usize; 8]> = SmallVec::new();
    let mut name_len = 0usize;

    loop {
        let len = *buf.get(pos).ok_or_else(|| {
            DecodeError::Malformed(format!("name runs past end of message at offset {}", pos))
        })?;

        match len & 0xC0 {
            0x00 => {
                if len == 0 {
                    return Ok(end.unwrap_or(pos + 1));
                }
                let label_len = len as usize;
                name_len += label_len + 1;
                if name_len > MAX_NAME_LEN {
                    return Err(DecodeError::Malformed(format!(
                        "name at offset {} exceeds {} bytes",
                        start, MAX_NAME_LEN
                    )));
                }
                if pos + 1 + label_len > buf.len() {
                    return Err(DecodeError::Malformed(format!(
                        "label at offset {} runs past end of message",
                        pos
                    )));
                }
                pos += 1 + label_len;
            }
            0xC0 => {
                let low = *buf.get(pos + 1).ok_or_else(|| {
                    DecodeError::Malformed(format!("truncated pointer at offset {}", pos))
                })?;
                let target = (((len & 0x3F) as usize) << 8) | low as usize;

                if target >= pos || visited.contains(&pos) {
                    return Err(DecodeError::PointerCycle { offset: pos });
                }
                visited.push(pos);

                if end.is_none() {
                    end = Some(pos + 2);
                }
                pos = target;
            }
            _ => {
                return Err(DecodeError::Malformed(format!(
                    "unsupported label type {:#04x} at offset {}",
                    len, pos
                )))
            }
        }
    }
}
