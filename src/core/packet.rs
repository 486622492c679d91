//! # Packet Framing
//!
//! Every message travels behind a 4-byte header:
//! ```text
//! [size: u24 LE] [sequence: u8] [payload: size bytes]
//! ```
//!
//! The size field caps a single frame at 16 777 215 bytes. Sequence numbers
//! are taken modulo 256 when encoding, so callers may keep a wider counter.

use crate::config::{HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::error::{ProtocolError, Result};
use crate::protocol::Encode;
use bytes::{BufMut, BytesMut};
use tracing::debug;

/// Decoded frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PacketHeader {
    pub size: u32,
    pub sequence: u8,
}

impl PacketHeader {
    /// Build a header, validating the size and wrapping the sequence.
    ///
    /// # Errors
    /// Returns `PacketTooLarge` if `size` exceeds 16 777 215.
    pub fn new(size: u64, sequence: u32) -> Result<Self> {
        if size > u64::from(MAX_PAYLOAD_SIZE) {
            debug!(size, "rejecting oversized packet header");
            return Err(ProtocolError::PacketTooLarge(size));
        }
        Ok(Self {
            size: size as u32,
            sequence: (sequence % 256) as u8,
        })
    }

    /// Assemble a header from the first four bytes of `buf`.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        let [b0, b1, b2, sequence] = match buf.get(..HEADER_SIZE) {
            Some(&[b0, b1, b2, b3]) => [b0, b1, b2, b3],
            _ => {
                return Err(ProtocolError::TruncatedInput {
                    needed: HEADER_SIZE,
                    available: buf.len(),
                })
            }
        };
        Ok(Self {
            size: u32::from_le_bytes([b0, b1, b2, 0]),
            sequence,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [b0, b1, b2, _] = self.size.to_le_bytes();
        [b0, b1, b2, self.sequence]
    }
}

/// Decode a 4-byte header.
pub fn decode_header(buf: &[u8]) -> Result<PacketHeader> {
    PacketHeader::decode(buf)
}

/// Encode a header, failing with `PacketTooLarge` above 16 777 215 bytes.
pub fn encode_header(size: u64, sequence: u32) -> Result<[u8; HEADER_SIZE]> {
    Ok(PacketHeader::new(size, sequence)?.to_bytes())
}

/// A framed message: sequence number plus raw payload.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Packet {
    pub sequence: u8,
    pub payload: Vec<u8>,
}

impl Packet {
    pub fn new(sequence: u8, payload: Vec<u8>) -> Self {
        Self { sequence, payload }
    }

    /// Encode a typed message as the payload of a new packet
    pub fn from_message<M: Encode>(sequence: u8, message: &M) -> Result<Self> {
        let payload = message.to_bytes()?;
        if payload.len() > MAX_PAYLOAD_SIZE as usize {
            return Err(ProtocolError::PacketTooLarge(payload.len() as u64));
        }
        Ok(Self::new(sequence, payload))
    }

    pub fn header(&self) -> Result<PacketHeader> {
        PacketHeader::new(self.payload.len() as u64, u32::from(self.sequence))
    }

    /// Append header and payload to `buf`
    pub fn write_to<B: BufMut>(&self, buf: &mut B) -> Result<()> {
        let header = self.header()?;
        buf.put_slice(&header.to_bytes());
        buf.put_slice(&self.payload);
        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = BytesMut::with_capacity(HEADER_SIZE + self.payload.len());
        self.write_to(&mut out)?;
        Ok(out.to_vec())
    }

    /// Decode one frame from the front of `buf`, returning it with the number of
    /// bytes consumed. Trailing bytes belong to later frames and are left alone.
    pub fn from_bytes(buf: &[u8]) -> Result<(Self, usize)> {
        let header = PacketHeader::decode(buf)?;
        let total = HEADER_SIZE + header.size as usize;
        if buf.len() < total {
            return Err(ProtocolError::TruncatedInput {
                needed: total,
                available: buf.len(),
            });
        }
        let payload = buf[HEADER_SIZE..total].to_vec();
        Ok((Self::new(header.sequence, payload), total))
    }
}
