//! DNS message encoding and decoding (RFC 1035, SRV per RFC 2782).
//!
//! Only what a stub resolver needs: one-question queries out, answers with
//! SRV, A and AAAA data back. Other record types are skipped.

use bytes::{BufMut, Bytes, BytesMut};
use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;
use zocket_core::service::ServiceRecord;

/// DNS header is always 12 bytes
pub const HEADER_SIZE: usize = 12;

/// Largest response accepted over UDP without EDNS
pub const MAX_UDP_PAYLOAD: usize = 512;

const MAX_LABEL_LEN: usize = 63;
const MAX_NAME_LEN: usize = 255;
const MAX_POINTER_JUMPS: usize = 16;

const FLAG_QR: u16 = 0x8000;
const FLAG_TC: u16 = 0x0200;
const FLAG_RD: u16 = 0x0100;
const RCODE_MASK: u16 = 0x000F;

/// NXDOMAIN: the queried name does not exist
pub const RCODE_NXDOMAIN: u8 = 3;

const CLASS_IN: u16 = 1;

/// Record types this codec understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum RecordType {
    A = 1,
    Aaaa = 28,
    Srv = 33,
}

/// Wire format errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    #[error("Message truncated at offset {0}")]
    Incomplete(usize),

    #[error("Label too long in {0}")]
    LabelTooLong(String),

    #[error("Name too long: {0}")]
    NameTooLong(String),

    #[error("Empty label in {0}")]
    EmptyLabel(String),

    #[error("Compression pointer loop")]
    PointerLoop,

    #[error("Unsupported label type {0:#04x}")]
    BadLabel(u8),

    #[error("Not a response")]
    NotResponse,

    #[error("Bad rdata length {len} for record type {rtype}")]
    BadRdata { rtype: u16, len: usize },
}

/// Result type alias for wire operations
pub type Result<T> = std::result::Result<T, WireError>;

/// Decoded answer data
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    Srv(ServiceRecord),
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    /// Any other type, identified by its numeric code
    Other(u16),
}

/// Decoded response
#[derive(Debug, Clone)]
pub struct DnsResponse {
    pub id: u16,
    pub rcode: u8,
    pub truncated: bool,
    pub answers: Vec<RecordData>,
}

impl DnsResponse {
    /// SRV answers in answer order
    pub fn srv_records(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.answers.iter().filter_map(|r| match r {
            RecordData::Srv(srv) => Some(srv),
            _ => None,
        })
    }
}

/// Encode a recursive single-question query.
///
/// Layout:
/// ```text
/// [0..2]   ID
/// [2..4]   Flags (RD)
/// [4..6]   QDCOUNT = 1
/// [6..12]  ANCOUNT, NSCOUNT, ARCOUNT = 0
/// [12..]   QNAME, QTYPE, QCLASS
/// ```
pub fn encode_query(id: u16, name: &str, rtype: RecordType) -> Result<Bytes> {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + name.len() + 6);
    buf.put_u16(id);
    buf.put_u16(FLAG_RD);
    buf.put_u16(1);
    buf.put_u16(0);
    buf.put_u16(0);
    buf.put_u16(0);
    encode_name(&mut buf, name)?;
    buf.put_u16(rtype as u16);
    buf.put_u16(CLASS_IN);
    Ok(buf.freeze())
}

fn encode_name(buf: &mut BytesMut, name: &str) -> Result<()> {
    let trimmed = name.trim_end_matches('.');
    if trimmed.len() > MAX_NAME_LEN - 2 {
        return Err(WireError::NameTooLong(name.to_string()));
    }
    if !trimmed.is_empty() {
        for label in trimmed.split('.') {
            if label.is_empty() {
                return Err(WireError::EmptyLabel(name.to_string()));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(WireError::LabelTooLong(name.to_string()));
            }
            buf.put_u8(label.len() as u8);
            buf.put_slice(label.as_bytes());
        }
    }
    buf.put_u8(0);
    Ok(())
}

fn read_u16(msg: &[u8], pos: usize) -> Result<u16> {
    msg.get(pos..pos + 2)
        .map(|b| u16::from_be_bytes([b[0], b[1]]))
        .ok_or(WireError::Incomplete(pos))
}

/// Read a possibly compressed name starting at `pos`.
///
/// Returns the dotted name and the offset just past it in the original
/// (uncompressed) position.
fn read_name(msg: &[u8], mut pos: usize) -> Result<(String, usize)> {
    let mut name = String::new();
    let mut end = None;
    let mut jumps = 0;

    loop {
        let len = *msg.get(pos).ok_or(WireError::Incomplete(pos))?;
        match len & 0xC0 {
            0x00 => {
                if len == 0 {
                    return Ok((name, end.unwrap_or(pos + 1)));
                }
                let start = pos + 1;
                let label = msg
                    .get(start..start + len as usize)
                    .ok_or(WireError::Incomplete(start))?;
                if !name.is_empty() {
                    name.push('.');
                }
                name.push_str(&String::from_utf8_lossy(label));
                if name.len() > MAX_NAME_LEN {
                    return Err(WireError::NameTooLong(name));
                }
                pos = start + len as usize;
            }
            0xC0 => {
                let pointer = usize::from(read_u16(msg, pos)? & 0x3FFF);
                if end.is_none() {
                    end = Some(pos + 2);
                }
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(WireError::PointerLoop);
                }
                pos = pointer;
            }
            other => return Err(WireError::BadLabel(other)),
        }
    }
}

fn read_record(msg: &[u8], pos: usize) -> Result<(RecordData, usize)> {
    let (_owner, pos) = read_name(msg, pos)?;
    let rtype = read_u16(msg, pos)?;
    let _class = read_u16(msg, pos + 2)?;
    // TTL occupies pos + 4 .. pos + 8
    let rdlen = usize::from(read_u16(msg, pos + 8)?);
    let rdata_start = pos + 10;
    let rdata_end = rdata_start + rdlen;
    let rdata = msg
        .get(rdata_start..rdata_end)
        .ok_or(WireError::Incomplete(rdata_start))?;

    let data = match rtype {
        t if t == RecordType::Srv as u16 => {
            if rdlen < 7 {
                return Err(WireError::BadRdata { rtype, len: rdlen });
            }
            let priority = read_u16(msg, rdata_start)?;
            let weight = read_u16(msg, rdata_start + 2)?;
            let port = read_u16(msg, rdata_start + 4)?;
            // Target may use compression pointers into the whole message
            let (target, _) = read_name(msg, rdata_start + 6)?;
            RecordData::Srv(ServiceRecord {
                target,
                port,
                priority,
                weight,
            })
        }
        t if t == RecordType::A as u16 => {
            let octets: [u8; 4] = rdata
                .try_into()
                .map_err(|_| WireError::BadRdata { rtype, len: rdlen })?;
            RecordData::A(Ipv4Addr::from(octets))
        }
        t if t == RecordType::Aaaa as u16 => {
            let octets: [u8; 16] = rdata
                .try_into()
                .map_err(|_| WireError::BadRdata { rtype, len: rdlen })?;
            RecordData::Aaaa(Ipv6Addr::from(octets))
        }
        other => RecordData::Other(other),
    };

    Ok((data, rdata_end))
}

/// Decode a response datagram.
///
/// Only the answer section is decoded. A reply with the TC bit may end in
/// the middle of an answer; decoding then stops at the last complete one.
pub fn decode_response(msg: &[u8]) -> Result<DnsResponse> {
    if msg.len() < HEADER_SIZE {
        return Err(WireError::Incomplete(msg.len()));
    }

    let id = read_u16(msg, 0)?;
    let flags = read_u16(msg, 2)?;
    if flags & FLAG_QR == 0 {
        return Err(WireError::NotResponse);
    }
    let truncated = flags & FLAG_TC != 0;
    let qdcount = read_u16(msg, 4)?;
    let ancount = read_u16(msg, 6)?;

    let mut pos = HEADER_SIZE;
    for _ in 0..qdcount {
        let (_, next) = read_name(msg, pos)?;
        pos = next + 4;
    }

    let mut answers = Vec::with_capacity(usize::from(ancount));
    for _ in 0..ancount {
        match read_record(msg, pos) {
            Ok((record, next)) => {
                answers.push(record);
                pos = next;
            }
            Err(_) if truncated => break,
            Err(e) => return Err(e),
        }
    }

    Ok(DnsResponse {
        id,
        rcode: (flags & RCODE_MASK) as u8,
        truncated,
        answers,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a response to `query` carrying the given SRV answers.
    ///
    /// Targets are written uncompressed; the owner name of each answer is a
    /// pointer to the question.
    pub(crate) fn srv_response(query: &[u8], rcode: u8, answers: &[ServiceRecord]) -> Vec<u8> {
        let mut out = query.to_vec();
        let flags = FLAG_QR | FLAG_RD | 0x0080 | u16::from(rcode);
        out[2..4].copy_from_slice(&flags.to_be_bytes());
        out[6..8].copy_from_slice(&(answers.len() as u16).to_be_bytes());
        for srv in answers {
            let mut rdata = BytesMut::new();
            rdata.put_u16(srv.priority);
            rdata.put_u16(srv.weight);
            rdata.put_u16(srv.port);
            encode_name(&mut rdata, &srv.target).unwrap();

            out.extend_from_slice(&[0xC0, HEADER_SIZE as u8]);
            out.extend_from_slice(&(RecordType::Srv as u16).to_be_bytes());
            out.extend_from_slice(&CLASS_IN.to_be_bytes());
            out.extend_from_slice(&300u32.to_be_bytes());
            out.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
            out.extend_from_slice(&rdata);
        }
        out
    }

    #[test]
    fn test_encode_query_layout() {
        let q = encode_query(0xBEEF, "_svc._tcp.example.com", RecordType::Srv).unwrap();
        assert_eq!(&q[0..2], &[0xBE, 0xEF]);
        assert_eq!(&q[2..4], &[0x01, 0x00]);
        assert_eq!(&q[4..6], &[0x00, 0x01]);
        assert_eq!(q[12], 4);
        assert_eq!(&q[13..17], b"_svc");
        assert_eq!(&q[q.len() - 4..], &[0x00, 0x21, 0x00, 0x01]);
    }

    #[test]
    fn test_encode_rejects_bad_names() {
        let long = "a".repeat(64);
        assert_eq!(
            encode_query(1, &format!("{long}.com"), RecordType::A),
            Err(WireError::LabelTooLong(format!("{long}.com")))
        );
        assert!(matches!(
            encode_query(1, "a..com", RecordType::A),
            Err(WireError::EmptyLabel(_))
        ));
    }

    #[test]
    fn test_decode_srv_answers_in_order() {
        let q = encode_query(7, "_svc._tcp.example.com", RecordType::Srv).unwrap();
        let resp = srv_response(
            &q,
            0,
            &[
                ServiceRecord::new("a.example.com", 1000, 10, 5),
                ServiceRecord::new("b.example.com", 2000, 10, 20),
            ],
        );
        let decoded = decode_response(&resp).unwrap();
        assert_eq!(decoded.id, 7);
        assert_eq!(decoded.rcode, 0);
        let srv: Vec<_> = decoded.srv_records().cloned().collect();
        assert_eq!(srv[0], ServiceRecord::new("a.example.com", 1000, 10, 5));
        assert_eq!(srv[1], ServiceRecord::new("b.example.com", 2000, 10, 20));
    }

    #[test]
    fn test_decode_stops_at_cut_answer_when_truncated() {
        let q = encode_query(7, "_svc._tcp.example.com", RecordType::Srv).unwrap();
        let mut resp = srv_response(
            &q,
            0,
            &[
                ServiceRecord::new("a.example.com", 1000, 10, 5),
                ServiceRecord::new("b.example.com", 2000, 10, 20),
            ],
        );
        resp.truncate(resp.len() - 5);
        assert!(matches!(decode_response(&resp), Err(WireError::Incomplete(_))));

        resp[2] |= 0x02;
        let decoded = decode_response(&resp).unwrap();
        assert!(decoded.truncated);
        assert_eq!(decoded.answers.len(), 1);
    }

    #[test]
    fn test_decode_compressed_target() {
        let q = encode_query(9, "_svc._tcp.example.com", RecordType::Srv).unwrap();
        let mut resp = srv_response(&q, 0, &[]);
        resp[6..8].copy_from_slice(&1u16.to_be_bytes());
        // rdata: prio 1, weight 2, port 3, target "a" + pointer to "example.com"
        // "example.com" starts at 12 + 1 + 4 + 1 + 4 = 22 in the question
        let rdata = [0, 1, 0, 2, 0, 3, 1, b'a', 0xC0, 22];
        resp.extend_from_slice(&[0xC0, 12, 0, 33, 0, 1, 0, 0, 0, 60, 0, rdata.len() as u8]);
        resp.extend_from_slice(&rdata);

        let decoded = decode_response(&resp).unwrap();
        let srv = decoded.srv_records().next().unwrap();
        assert_eq!(srv.target, "a.example.com");
        assert_eq!((srv.priority, srv.weight, srv.port), (1, 2, 3));
    }

    #[test]
    fn test_decode_a_record() {
        let q = encode_query(3, "host.example.com", RecordType::A).unwrap();
        let mut resp = srv_response(&q, 0, &[]);
        resp[6..8].copy_from_slice(&1u16.to_be_bytes());
        resp.extend_from_slice(&[0xC0, 12, 0, 1, 0, 1, 0, 0, 0, 60, 0, 4, 10, 0, 0, 2]);

        let decoded = decode_response(&resp).unwrap();
        assert_eq!(decoded.answers, vec![RecordData::A(Ipv4Addr::new(10, 0, 0, 2))]);
    }

    #[test]
    fn test_decode_nxdomain() {
        let q = encode_query(5, "_nope._tcp.example.com", RecordType::Srv).unwrap();
        let resp = srv_response(&q, RCODE_NXDOMAIN, &[]);
        let decoded = decode_response(&resp).unwrap();
        assert_eq!(decoded.rcode, RCODE_NXDOMAIN);
        assert_eq!(decoded.srv_records().count(), 0);
    }

    #[test]
    fn test_decode_rejects_pointer_loop() {
        let q = encode_query(5, "x.example.com", RecordType::A).unwrap();
        let mut resp = srv_response(&q, 0, &[]);
        resp[6..8].copy_from_slice(&1u16.to_be_bytes());
        let at = resp.len() as u8;
        resp.extend_from_slice(&[0xC0, at]);
        assert_eq!(decode_response(&resp).unwrap_err(), WireError::PointerLoop);
    }

    #[test]
    fn test_decode_rejects_queries_and_short_input() {
        let q = encode_query(1, "example.com", RecordType::A).unwrap();
        assert_eq!(decode_response(&q).unwrap_err(), WireError::NotResponse);
        assert!(matches!(
            decode_response(&q[..5]),
            Err(WireError::Incomplete(_))
        ));
    }
}
