//! Integration tests for the stream codec
//!
//! These tests drive `PacketCodec` the way `Framed` does: bytes arrive in
//! arbitrary chunks and frames come out whole, in order, with the buffer left
//! holding whatever belongs to the next frame.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::{BufMut, BytesMut};
use mysql_wire_codec::config::MAX_PAYLOAD_SIZE;
use mysql_wire_codec::core::codec::PacketCodec;
use mysql_wire_codec::core::packet::Packet;
use mysql_wire_codec::error::ProtocolError;
use tokio_util::codec::{Decoder, Encoder};

#[test]
fn test_codec_decode_consumes_exactly_one_frame() {
    let mut codec = PacketCodec::default();

    let mut buffer = BytesMut::new();
    buffer.put_slice(&Packet::new(0, vec![1, 2, 3, 4, 5]).to_bytes().unwrap());
    buffer.put_slice(&Packet::new(1, vec![9]).to_bytes().unwrap());

    let first = codec.decode(&mut buffer).expect("Failed to decode").unwrap();
    assert_eq!(first.payload, vec![1, 2, 3, 4, 5]);
    assert_eq!(first.sequence, 0);

    // Second frame is still intact
    assert_eq!(&buffer[..], &[1, 0, 0, 1, 9]);
    let second = codec.decode(&mut buffer).unwrap().unwrap();
    assert_eq!(second.sequence, 1);
    assert!(buffer.is_empty());
}

#[test]
fn test_codec_partial_header_preserves_buffer() {
    let mut codec = PacketCodec::default();
    let mut buffer = BytesMut::from(&[0x05, 0x00, 0x00][..]);

    let result = codec.decode(&mut buffer).expect("Decode should not error");

    assert!(result.is_none());
    assert_eq!(buffer.len(), 3);
}

#[test]
fn test_codec_partial_payload_waits_for_rest() {
    let mut codec = PacketCodec::default();
    let bytes = Packet::new(3, b"SELECT 1".to_vec()).to_bytes().unwrap();

    let mut buffer = BytesMut::from(&bytes[..6]);
    assert!(codec.decode(&mut buffer).unwrap().is_none());
    assert_eq!(buffer.len(), 6);

    buffer.put_slice(&bytes[6..]);
    let packet = codec.decode(&mut buffer).unwrap().unwrap();
    assert_eq!(packet.payload, b"SELECT 1");
    assert_eq!(packet.sequence, 3);
}

#[test]
fn test_codec_byte_at_a_time() {
    let mut codec = PacketCodec::default();
    let bytes = Packet::new(7, (0..=255u8).collect()).to_bytes().unwrap();

    let mut buffer = BytesMut::new();
    let mut decoded = None;
    for (i, byte) in bytes.iter().enumerate() {
        buffer.put_u8(*byte);
        match codec.decode(&mut buffer).unwrap() {
            Some(packet) => {
                assert_eq!(i, bytes.len() - 1, "frame completed early");
                decoded = Some(packet);
            }
            None => assert!(i < bytes.len() - 1),
        }
    }
    assert_eq!(decoded.unwrap().payload.len(), 256);
}

#[test]
fn test_codec_encode_writes_header() {
    let mut codec = PacketCodec::default();
    let mut buffer = BytesMut::new();

    codec.encode(Packet::new(2, vec![0xAA; 300]), &mut buffer).unwrap();

    assert_eq!(buffer.len(), 4 + 300);
    assert_eq!(&buffer[..4], &[0x2C, 0x01, 0x00, 0x02]);
}

#[test]
fn test_codec_empty_payload() {
    let mut codec = PacketCodec::default();
    let mut buffer = BytesMut::new();
    codec.encode(Packet::new(0, Vec::new()), &mut buffer).unwrap();
    assert_eq!(&buffer[..], &[0, 0, 0, 0]);

    let packet = codec.decode(&mut buffer).unwrap().unwrap();
    assert!(packet.payload.is_empty());
}

#[test]
fn test_codec_limit_applies_both_ways() {
    let mut codec = PacketCodec::with_max_payload_size(16);

    let mut buffer = BytesMut::new();
    assert!(matches!(
        codec.encode(Packet::new(0, vec![0; 17]), &mut buffer),
        Err(ProtocolError::PacketTooLarge(17))
    ));
    assert!(buffer.is_empty());

    let mut inbound = BytesMut::from(&[17u8, 0, 0, 0][..]);
    assert!(codec.decode(&mut inbound).is_err());
}

#[test]
fn test_codec_accepts_largest_header() {
    let mut codec = PacketCodec::default();
    // Header alone announcing a full-size frame: wait, don't fail
    let mut buffer = BytesMut::from(&[0xFF, 0xFF, 0xFF, 0x00][..]);
    assert!(codec.decode(&mut buffer).unwrap().is_none());
    assert!(buffer.capacity() >= MAX_PAYLOAD_SIZE as usize);
}
