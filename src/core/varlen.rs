//! # Length-Encoded Primitives
//!
//! Variable-width integers and strings shared by every higher-level packet.
//!
//! ## Wire Format
//! ```text
//! first byte   meaning                         width
//! 0..=250      the value itself                1
//! 251          SQL NULL (row values only)      1
//! 252          u16 LE follows                  3
//! 253          u24 LE follows                  4
//! 254          u64 LE follows                  9
//! 255          invalid                         -
//! ```
//!
//! Encoding always picks the narrowest width, so values 251..=255 never appear
//! as a single byte.

use crate::core::reader::PayloadReader;
use crate::error::{ProtocolError, Result};
use bytes::BufMut;

/// Marker for a NULL column value in a text row
pub const NULL_MARKER: u8 = 251;
const U16_MARKER: u8 = 252;
const U24_MARKER: u8 = 253;
const U64_MARKER: u8 = 254;
const INVALID_MARKER: u8 = 255;

/// Largest value that fits in the single-byte form
pub const MAX_SINGLE_BYTE: u64 = 250;

/// Read a length that may be the NULL marker.
pub(crate) fn read_length_or_null(reader: &mut PayloadReader<'_>) -> Result<Option<u64>> {
    let marker = reader.read_u8()?;
    let value = match marker {
        0..=250 => u64::from(marker),
        NULL_MARKER => return Ok(None),
        U16_MARKER => u64::from(reader.read_u16_le()?),
        U24_MARKER => u64::from(reader.read_u24_le()?),
        U64_MARKER => reader.read_u64_le()?,
        INVALID_MARKER => return Err(ProtocolError::InvalidLengthEncoding(marker)),
    };
    Ok(Some(value))
}

pub(crate) fn read_length(reader: &mut PayloadReader<'_>) -> Result<u64> {
    read_length_or_null(reader)?.ok_or(ProtocolError::UnexpectedNull)
}

pub(crate) fn read_string<'a>(reader: &mut PayloadReader<'a>) -> Result<&'a [u8]> {
    let len = read_length(reader)?;
    let len = usize::try_from(len).map_err(|_| ProtocolError::TruncatedInput {
        needed: usize::MAX,
        available: reader.remaining(),
    })?;
    reader.read_bytes(len)
}

/// Decode a length-encoded integer, returning `(value, bytes_consumed)`.
///
/// # Errors
/// - `InvalidLengthEncoding` for the `255` marker
/// - `UnexpectedNull` for the `251` marker, which is only meaningful inside rows
/// - `TruncatedInput` if the buffer ends inside the value
pub fn decode_length(buf: &[u8]) -> Result<(u64, usize)> {
    let mut reader = PayloadReader::new(buf);
    let value = read_length(&mut reader)?;
    Ok((value, reader.position()))
}

/// Decode a length-encoded string, returning an owned copy and the bytes consumed
/// (prefix plus body).
pub fn decode_string(buf: &[u8]) -> Result<(Vec<u8>, usize)> {
    let mut reader = PayloadReader::new(buf);
    let value = read_string(&mut reader)?.to_vec();
    Ok((value, reader.position()))
}

/// Decode `field_count` text-row values; `None` stands for SQL NULL.
///
/// The row is materialized eagerly. Fails with `TruncatedInput` if the buffer
/// runs out before every value has been read.
pub fn decode_row(field_count: usize, buf: &[u8]) -> Result<(Vec<Option<Vec<u8>>>, usize)> {
    let mut reader = PayloadReader::new(buf);
    let mut row = Vec::with_capacity(field_count.min(buf.len()));
    for _ in 0..field_count {
        if reader.peek_u8()? == NULL_MARKER {
            reader.read_u8()?;
            row.push(None);
        } else {
            row.push(Some(read_string(&mut reader)?.to_vec()));
        }
    }
    Ok((row, reader.position()))
}

/// Number of bytes `value` occupies once length-encoded
pub fn encoded_length_size(value: u64) -> usize {
    match value {
        0..=MAX_SINGLE_BYTE => 1,
        0..=0xFFFF => 3,
        0..=0xFF_FFFF => 4,
        _ => 9,
    }
}

/// Append a length-encoded integer using the narrowest width.
pub fn put_length<B: BufMut>(buf: &mut B, value: u64) {
    match encoded_length_size(value) {
        1 => buf.put_u8(value as u8),
        3 => {
            buf.put_u8(U16_MARKER);
            buf.put_u16_le(value as u16);
        }
        4 => {
            buf.put_u8(U24_MARKER);
            buf.put_uint_le(value, 3);
        }
        _ => {
            buf.put_u8(U64_MARKER);
            buf.put_u64_le(value);
        }
    }
}

/// Length-encode `value` into a fresh buffer.
pub fn encode_length(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_length_size(value));
    put_length(&mut out, value);
    out
}

/// Append a length-prefixed string.
pub fn put_string<B: BufMut>(buf: &mut B, value: &[u8]) {
    put_length(buf, value.len() as u64);
    buf.put_slice(value);
}

/// Append a text row; `None` is written as the NULL marker.
pub fn put_row<B: BufMut>(buf: &mut B, row: &[Option<&[u8]>]) {
    for value in row {
        match value {
            Some(value) => put_string(buf, value),
            None => buf.put_u8(NULL_MARKER),
        }
    }
}
