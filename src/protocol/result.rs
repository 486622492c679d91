//! Result packets sent by the server in reply to a command.
//!
//! The first payload byte picks the packet type:
//!
//! | first byte | packet   |
//! |------------|----------|
//! | `0`        | OK       |
//! | `1..=250`  | column count of a result set |
//! | `254`      | EOF      |
//! | `255`      | Error    |
//!
//! `251..=253` never lead a result packet and are rejected. OK, Error and EOF
//! packets changed layout in 4.1; the caller says which layout to expect and
//! the decoded value records it as a variant, so 4.1-only fields simply do not
//! exist on a 4.0 packet.

use crate::core::bitfield::ServerStatus;
use crate::core::reader::PayloadReader;
use crate::core::varlen::{put_length, read_length};
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::{Encode, ProtocolVersion};
use bytes::{BufMut, BytesMut};
use std::fmt;
use tracing::{debug, instrument, trace};

const OK_HEADER: u8 = 0;
const EOF_HEADER: u8 = 254;
const ERROR_HEADER: u8 = 255;
const MAX_COLUMN_COUNT: u8 = 250;

/// Default SQL state for errors built without one
pub const DEFAULT_SQLSTATE: [u8; 5] = *b"HY000";

fn expect_header(reader: &mut PayloadReader<'_>, header: u8, expected: &'static str) -> Result<()> {
    let received = reader.read_u8()?;
    if received != header {
        debug!(expected, received, "unexpected result header");
        return Err(ProtocolError::BadFieldCount { expected, received });
    }
    Ok(())
}

/// Fields an OK packet carries only from 4.1 on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OkLayout {
    Protocol40,
    Protocol41 { warning_count: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OkResult {
    pub affected_rows: u64,
    pub insert_id: u64,
    pub status: ServerStatus,
    pub message: Vec<u8>,
    pub layout: OkLayout,
}

impl OkResult {
    pub fn new(
        affected_rows: u64,
        insert_id: u64,
        status: ServerStatus,
        version: ProtocolVersion,
    ) -> Self {
        let layout = match version {
            ProtocolVersion::Protocol40 => OkLayout::Protocol40,
            ProtocolVersion::Protocol41 => OkLayout::Protocol41 { warning_count: 0 },
        };
        Self {
            affected_rows,
            insert_id,
            status,
            message: Vec::new(),
            layout,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        match self.layout {
            OkLayout::Protocol40 => ProtocolVersion::Protocol40,
            OkLayout::Protocol41 { .. } => ProtocolVersion::Protocol41,
        }
    }

    pub fn warning_count(&self) -> Option<u16> {
        match self.layout {
            OkLayout::Protocol40 => None,
            OkLayout::Protocol41 { warning_count } => Some(warning_count),
        }
    }

    pub fn decode(buf: &[u8], version: ProtocolVersion) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        expect_header(&mut reader, OK_HEADER, constants::EXPECTED_OK)?;
        let affected_rows = read_length(&mut reader)?;
        let insert_id = read_length(&mut reader)?;

        let (status, layout) = match version {
            // 4.0 servers may stop right after the insert id
            ProtocolVersion::Protocol40 if reader.is_empty() => (0, OkLayout::Protocol40),
            ProtocolVersion::Protocol40 => (reader.read_u16_le()?, OkLayout::Protocol40),
            ProtocolVersion::Protocol41 => {
                let status = reader.read_u16_le()?;
                let warning_count = reader.read_u16_le()?;
                (status, OkLayout::Protocol41 { warning_count })
            }
        };
        let message = reader.read_rest().to_vec();

        let result = Self {
            affected_rows,
            insert_id,
            status: ServerStatus::new(u32::from(status)),
            message,
            layout,
        };
        Ok((result, reader.position()))
    }
}

impl Encode for OkResult {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(OK_HEADER);
        put_length(buf, self.affected_rows);
        put_length(buf, self.insert_id);
        buf.put_u16_le((self.status.value() & 0xFFFF) as u16);
        if let OkLayout::Protocol41 { warning_count } = self.layout {
            buf.put_u16_le(warning_count);
        }
        buf.put_slice(&self.message);
        Ok(())
    }
}

/// Fields an Error packet carries only from 4.1 on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorLayout {
    Protocol40,
    Protocol41 { sqlstate_marker: u8, sqlstate: [u8; 5] },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResult {
    pub error_code: u16,
    pub message: Vec<u8>,
    pub layout: ErrorLayout,
}

impl ErrorResult {
    /// Error with the `#` marker and `HY000` state on 4.1
    pub fn new(error_code: u16, message: impl Into<Vec<u8>>, version: ProtocolVersion) -> Self {
        let layout = match version {
            ProtocolVersion::Protocol40 => ErrorLayout::Protocol40,
            ProtocolVersion::Protocol41 => ErrorLayout::Protocol41 {
                sqlstate_marker: b'#',
                sqlstate: DEFAULT_SQLSTATE,
            },
        };
        Self {
            error_code,
            message: message.into(),
            layout,
        }
    }

    pub fn version(&self) -> ProtocolVersion {
        match self.layout {
            ErrorLayout::Protocol40 => ProtocolVersion::Protocol40,
            ErrorLayout::Protocol41 { .. } => ProtocolVersion::Protocol41,
        }
    }

    pub fn sqlstate(&self) -> Option<&[u8; 5]> {
        match &self.layout {
            ErrorLayout::Protocol40 => None,
            ErrorLayout::Protocol41 { sqlstate, .. } => Some(sqlstate),
        }
    }

    pub fn decode(buf: &[u8], version: ProtocolVersion) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        expect_header(&mut reader, ERROR_HEADER, constants::EXPECTED_ERROR)?;
        let error_code = reader.read_u16_le()?;
        let layout = match version {
            ProtocolVersion::Protocol40 => ErrorLayout::Protocol40,
            ProtocolVersion::Protocol41 => ErrorLayout::Protocol41 {
                sqlstate_marker: reader.read_u8()?,
                sqlstate: reader.read_array()?,
            },
        };
        let message = reader.read_rest().to_vec();

        let result = Self {
            error_code,
            message,
            layout,
        };
        Ok((result, reader.position()))
    }
}

impl Encode for ErrorResult {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(ERROR_HEADER);
        buf.put_u16_le(self.error_code);
        if let ErrorLayout::Protocol41 {
            sqlstate_marker,
            sqlstate,
        } = &self.layout
        {
            buf.put_u8(*sqlstate_marker);
            buf.put_slice(sqlstate);
        }
        buf.put_slice(&self.message);
        Ok(())
    }
}

/// End-of-rows marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EofResult {
    Protocol40,
    Protocol41 {
        warning_count: u16,
        status: ServerStatus,
    },
}

impl EofResult {
    pub fn version(&self) -> ProtocolVersion {
        match self {
            EofResult::Protocol40 => ProtocolVersion::Protocol40,
            EofResult::Protocol41 { .. } => ProtocolVersion::Protocol41,
        }
    }

    /// Trailing bytes after a 4.0 EOF marker are not part of the packet and are
    /// not counted as consumed.
    pub fn decode(buf: &[u8], version: ProtocolVersion) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        expect_header(&mut reader, EOF_HEADER, constants::EXPECTED_EOF)?;
        let result = match version {
            ProtocolVersion::Protocol40 => EofResult::Protocol40,
            ProtocolVersion::Protocol41 => EofResult::Protocol41 {
                warning_count: reader.read_u16_le()?,
                status: ServerStatus::new(u32::from(reader.read_u16_le()?)),
            },
        };
        Ok((result, reader.position()))
    }
}

impl Encode for EofResult {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(EOF_HEADER);
        if let EofResult::Protocol41 {
            warning_count,
            status,
        } = self
        {
            buf.put_u16_le(*warning_count);
            buf.put_u16_le((status.value() & 0xFFFF) as u16);
        }
        Ok(())
    }
}

/// Column count announcing a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountResult {
    count: u8,
}

impl CountResult {
    /// # Errors
    /// `BadFieldCount` unless `count` is in `1..=250`.
    pub fn new(count: u8) -> Result<Self> {
        if count == 0 || count > MAX_COLUMN_COUNT {
            return Err(ProtocolError::BadFieldCount {
                expected: constants::EXPECTED_ROW_COUNT,
                received: count,
            });
        }
        Ok(Self { count })
    }

    pub fn count(&self) -> u8 {
        self.count
    }

    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        let result = Self::new(reader.read_u8()?).inspect_err(|err| {
            debug!(%err, "invalid column count");
        })?;
        Ok((result, reader.position()))
    }
}

impl Encode for CountResult {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.put_u8(self.count);
        Ok(())
    }
}

/// Any result packet, classified by its first byte
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultMessage {
    Ok(OkResult),
    Error(ErrorResult),
    Eof(EofResult),
    Count(CountResult),
}

impl ResultMessage {
    #[instrument(level = "trace", skip(buf), fields(len = buf.len()))]
    pub fn decode(buf: &[u8], version: ProtocolVersion) -> Result<(Self, usize)> {
        let first = *buf.first().ok_or(ProtocolError::TruncatedInput {
            needed: 1,
            available: 0,
        })?;
        let (message, consumed) = match first {
            OK_HEADER => {
                let (ok, consumed) = OkResult::decode(buf, version)?;
                (ResultMessage::Ok(ok), consumed)
            }
            EOF_HEADER => {
                let (eof, consumed) = EofResult::decode(buf, version)?;
                (ResultMessage::Eof(eof), consumed)
            }
            ERROR_HEADER => {
                let (error, consumed) = ErrorResult::decode(buf, version)?;
                (ResultMessage::Error(error), consumed)
            }
            _ => {
                let (count, consumed) = CountResult::decode(buf)?;
                (ResultMessage::Count(count), consumed)
            }
        };
        trace!(kind = message.kind(), consumed, "classified result packet");
        Ok((message, consumed))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResultMessage::Ok(_) => "OK",
            ResultMessage::Error(_) => "ERROR",
            ResultMessage::Eof(_) => "EOF",
            ResultMessage::Count(_) => "COUNT",
        }
    }
}

impl Encode for ResultMessage {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        match self {
            ResultMessage::Ok(ok) => ok.encode(buf),
            ResultMessage::Error(error) => error.encode(buf),
            ResultMessage::Eof(eof) => eof.encode(buf),
            ResultMessage::Count(count) => count.encode(buf),
        }
    }
}

impl fmt::Display for OkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OK(affected {}, insert id {}, {}",
            self.affected_rows, self.insert_id, self.status
        )?;
        if let OkLayout::Protocol41 { warning_count } = self.layout {
            write!(f, ", warnings {warning_count}")?;
        }
        write!(f, ", message {:?})", String::from_utf8_lossy(&self.message))
    }
}

impl fmt::Display for ErrorResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error({}", self.error_code)?;
        if let ErrorLayout::Protocol41 { sqlstate, .. } = &self.layout {
            write!(f, ", state {}", String::from_utf8_lossy(sqlstate))?;
        }
        write!(f, ", message {:?})", String::from_utf8_lossy(&self.message))
    }
}

impl fmt::Display for EofResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EofResult::Protocol40 => write!(f, "EOF"),
            EofResult::Protocol41 {
                warning_count,
                status,
            } => write!(f, "EOF(warnings {warning_count}, {status})"),
        }
    }
}

impl fmt::Display for CountResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Count({})", self.count)
    }
}

impl fmt::Display for ResultMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultMessage::Ok(ok) => fmt::Display::fmt(ok, f),
            ResultMessage::Error(error) => fmt::Display::fmt(error, f),
            ResultMessage::Eof(eof) => fmt::Display::fmt(eof, f),
            ResultMessage::Count(count) => fmt::Display::fmt(count, f),
        }
    }
}

/// Classify and decode a result payload
pub fn create_result(buf: &[u8], version: ProtocolVersion) -> Result<(ResultMessage, usize)> {
    ResultMessage::decode(buf, version)
}

#[cfg(test)]
mod tests {
    use super::*;

    const V40: ProtocolVersion = ProtocolVersion::Protocol40;
    const V41: ProtocolVersion = ProtocolVersion::Protocol41;

    #[test]
    fn test_ok_41() {
        let mut data = vec![0, 3, 5];
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(&7u16.to_le_bytes());
        data.extend_from_slice(b"test");

        let (ok, consumed) = OkResult::decode(&data, V41).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(ok.affected_rows, 3);
        assert_eq!(ok.insert_id, 5);
        assert_eq!(ok.status.value(), 2);
        assert_eq!(ok.warning_count(), Some(7));
        assert_eq!(ok.message, b"test");
        assert_eq!(ok.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_ok_40() {
        let mut data = vec![0, 3, 5];
        data.extend_from_slice(&2u16.to_le_bytes());
        data.extend_from_slice(b"test");

        let (ok, _) = OkResult::decode(&data, V40).unwrap();
        assert_eq!(ok.status.value(), 2);
        assert_eq!(ok.warning_count(), None);
        assert_eq!(ok.message, b"test");
        assert_eq!(ok.version(), V40);
        assert_eq!(ok.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_ok_40_short_form() {
        let (ok, consumed) = OkResult::decode(&[0, 1, 0], V40).unwrap();
        assert_eq!(consumed, 3);
        assert_eq!(ok.status.value(), 0);
        assert!(ok.message.is_empty());
    }

    #[test]
    fn test_ok_length_encoded_counters() {
        let mut data = vec![0, 252, 0x10, 0x27]; // 10000 affected rows
        data.push(253);
        data.extend_from_slice(&[0x40, 0x42, 0x0F]); // insert id 1_000_000
        data.extend_from_slice(&[0, 0, 0, 0]);
        let (ok, _) = OkResult::decode(&data, V41).unwrap();
        assert_eq!(ok.affected_rows, 10_000);
        assert_eq!(ok.insert_id, 1_000_000);
        assert_eq!(ok.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_ok_41_truncated() {
        assert!(matches!(
            OkResult::decode(&[0, 0, 0, 2, 0], V41),
            Err(ProtocolError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_error_41() {
        let mut data = vec![255];
        data.extend_from_slice(&1234u16.to_le_bytes());
        data.extend_from_slice(b"#ABCDEtest");

        let (error, consumed) = ErrorResult::decode(&data, V41).unwrap();
        assert_eq!(consumed, data.len());
        assert_eq!(error.error_code, 1234);
        assert_eq!(
            error.layout,
            ErrorLayout::Protocol41 {
                sqlstate_marker: b'#',
                sqlstate: *b"ABCDE"
            }
        );
        assert_eq!(error.message, b"test");
        assert_eq!(error.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_error_40() {
        let mut data = vec![255];
        data.extend_from_slice(&1234u16.to_le_bytes());
        data.extend_from_slice(b"test");

        let (error, _) = ErrorResult::decode(&data, V40).unwrap();
        assert_eq!(error.sqlstate(), None);
        assert_eq!(error.message, b"test");
        assert_eq!(error.to_bytes().unwrap(), data);
    }

    #[test]
    fn test_error_new_defaults() {
        let error = ErrorResult::new(1045, "Access denied", V41);
        assert_eq!(error.sqlstate(), Some(b"HY000"));
        let bytes = error.to_bytes().unwrap();
        assert_eq!(&bytes[3..9], b"#HY000");
    }

    #[test]
    fn test_eof_layouts() {
        let mut data = vec![254];
        data.extend_from_slice(&3u16.to_le_bytes());
        data.extend_from_slice(&5u16.to_le_bytes());
        let (eof, consumed) = EofResult::decode(&data, V41).unwrap();
        assert_eq!(consumed, 5);
        assert_eq!(
            eof,
            EofResult::Protocol41 {
                warning_count: 3,
                status: ServerStatus::new(5)
            }
        );
        assert_eq!(eof.to_bytes().unwrap(), data);

        let (eof, consumed) = EofResult::decode(&[254], V40).unwrap();
        assert_eq!(eof, EofResult::Protocol40);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn test_headers_are_checked() {
        assert!(matches!(
            OkResult::decode(&[1, 0, 0], V40),
            Err(ProtocolError::BadFieldCount { received: 1, .. })
        ));
        assert!(matches!(
            ErrorResult::decode(&[0, 0, 0], V40),
            Err(ProtocolError::BadFieldCount { received: 0, .. })
        ));
        assert!(matches!(
            EofResult::decode(&[255], V40),
            Err(ProtocolError::BadFieldCount { received: 255, .. })
        ));
    }

    #[test]
    fn test_count_range() {
        assert_eq!(CountResult::decode(&[3]).unwrap().0.count(), 3);
        assert_eq!(CountResult::decode(&[250]).unwrap().0.count(), 250);
        for bad in [0u8, 251, 252, 253, 254, 255] {
            assert!(matches!(
                CountResult::decode(&[bad]),
                Err(ProtocolError::BadFieldCount { received, .. }) if received == bad
            ));
        }
    }

    #[test]
    fn test_dispatch() {
        let ok = create_result(&[0, 0, 0, 0, 0, 0, 0], V41).unwrap().0;
        assert!(matches!(ok, ResultMessage::Ok(_)));

        let eof = create_result(&[254, 0, 0, 0, 0], V41).unwrap().0;
        assert!(matches!(eof, ResultMessage::Eof(_)));

        let error = create_result(&[255, 1, 0, b'#', b'0', b'0', b'0', b'0', b'0'], V41)
            .unwrap()
            .0;
        assert!(matches!(error, ResultMessage::Error(_)));

        match create_result(&[37], V41).unwrap().0 {
            ResultMessage::Count(count) => assert_eq!(count.count(), 37),
            other => panic!("expected count, got {other:?}"),
        }
    }

    #[test]
    fn test_dispatch_rejects_reserved_leaders() {
        for leader in [251u8, 252, 253] {
            assert!(matches!(
                create_result(&[leader, 0, 0], V41),
                Err(ProtocolError::BadFieldCount { .. })
            ));
        }
        assert!(create_result(&[], V41).is_err());
    }

    #[test]
    fn test_display() {
        let mut ok = OkResult::new(3, 9, ServerStatus::new(2), V41);
        ok.message = b"done".to_vec();
        assert_eq!(
            ResultMessage::Ok(ok).to_string(),
            "OK(affected 3, insert id 9, ServerStatus[AUTOCOMMIT], warnings 0, message \"done\")"
        );
        assert_eq!(
            OkResult::new(1, 0, ServerStatus::default(), V40).to_string(),
            "OK(affected 1, insert id 0, ServerStatus[], message \"\")"
        );

        let error = ErrorResult::new(1045, "denied", V41);
        assert_eq!(error.to_string(), "Error(1045, state HY000, message \"denied\")");
        let error = ErrorResult::new(1045, "denied", V40);
        assert_eq!(error.to_string(), "Error(1045, message \"denied\")");

        let eof = EofResult::Protocol41 {
            warning_count: 1,
            status: ServerStatus::new(0b1001),
        };
        assert_eq!(
            eof.to_string(),
            "EOF(warnings 1, ServerStatus[IN_TRANS|MORE_RESULTS_EXISTS])"
        );
        assert_eq!(EofResult::Protocol40.to_string(), "EOF");
        assert_eq!(CountResult::new(4).unwrap().to_string(), "Count(4)");
    }

    #[test]
    fn test_zero_leader_never_becomes_count() {
        for version in [V40, V41] {
            let (message, _) = create_result(&[0, 0, 0, 0, 0, 0, 0], version).unwrap();
            assert!(!matches!(message, ResultMessage::Count(_)));
        }
    }
}
