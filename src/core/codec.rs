//! Tokio codec that splits a byte stream into [`Packet`]s.
//!
//! The codec only frames: payloads are handed back untouched for the message
//! decoders in [`crate::protocol`]. Partial frames stay in the buffer until the
//! rest arrives.

use crate::config::{ProtocolConfig, HEADER_SIZE, MAX_PAYLOAD_SIZE};
use crate::core::packet::{Packet, PacketHeader};
use crate::error::{ProtocolError, Result};
use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketCodec {
    max_payload_size: u32,
}

impl Default for PacketCodec {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl PacketCodec {
    /// Codec with a tighter payload limit; values above 16 777 215 are clamped
    pub fn with_max_payload_size(max_payload_size: u32) -> Self {
        Self {
            max_payload_size: max_payload_size.min(MAX_PAYLOAD_SIZE),
        }
    }

    pub fn from_config(config: &ProtocolConfig) -> Self {
        Self::with_max_payload_size(config.max_payload_size)
    }

    pub fn max_payload_size(&self) -> u32 {
        self.max_payload_size
    }
}

impl Decoder for PacketCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        let header = PacketHeader::decode(&src[..HEADER_SIZE])?;
        if header.size > self.max_payload_size {
            debug!(
                size = header.size,
                limit = self.max_payload_size,
                "inbound frame exceeds payload limit"
            );
            return Err(ProtocolError::PacketTooLarge(u64::from(header.size)));
        }

        let total = HEADER_SIZE + header.size as usize;
        if src.len() < total {
            src.reserve(total - src.len());
            return Ok(None);
        }

        src.advance(HEADER_SIZE);
        let payload = src.split_to(header.size as usize);
        Ok(Some(Packet::new(header.sequence, payload.to_vec())))
    }
}

impl Encoder<Packet> for PacketCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<()> {
        if item.payload.len() > self.max_payload_size as usize {
            debug!(
                size = item.payload.len(),
                limit = self.max_payload_size,
                "outbound payload exceeds limit"
            );
            return Err(ProtocolError::PacketTooLarge(item.payload.len() as u64));
        }
        dst.reserve(HEADER_SIZE + item.payload.len());
        item.write_to(dst)
    }
}
