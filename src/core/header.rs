//! Shared frame header.
//!
//! Both PIAP and TITP open every frame with the same 20-byte envelope; the
//! `magic` field is what lets one socket carry both protocols. Multi-byte
//! integers are big-endian on the wire, and the header carries no padding.

use bytes::{Buf, BufMut};

use crate::error::{ProtocolError, Result};

/// Size of the encoded frame header in bytes.
pub const HEADER_LEN: usize = 20;

/// The fixed envelope shared by both protocols.
///
/// `timestamp` is seconds since the Unix epoch; zero means "unchecked".
/// `reserved` must be zero on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub magic: u32,
    pub version: u16,
    pub msg_type: u16,
    pub payload_length: u32,
    pub timestamp: u32,
    pub reserved: u32,
}

impl FrameHeader {
    /// Build a header for an outgoing frame. The timestamp starts at zero;
    /// senders that want TTL enforcement stamp it explicitly.
    pub fn new(magic: u32, version: u16, msg_type: u16, payload_length: u32) -> Self {
        Self {
            magic,
            version,
            msg_type,
            payload_length,
            timestamp: 0,
            reserved: 0,
        }
    }

    /// Append the encoded header to `buf`. Writes exactly [`HEADER_LEN`] bytes.
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32(self.magic);
        buf.put_u16(self.version);
        buf.put_u16(self.msg_type);
        buf.put_u32(self.payload_length);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.reserved);
    }

    /// Decode a header from the front of `bytes`.
    ///
    /// Only structural validation happens here (enough bytes present);
    /// magic and version checks belong to the protocol-specific decoders,
    /// which know which constants to expect.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_LEN {
            return Err(ProtocolError::InvalidHeader);
        }

        let mut cur = bytes;
        Ok(Self {
            magic: cur.get_u32(),
            version: cur.get_u16(),
            msg_type: cur.get_u16(),
            payload_length: cur.get_u32(),
            timestamp: cur.get_u32(),
            reserved: cur.get_u32(),
        })
    }
}
