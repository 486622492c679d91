//! # Error Types
//!
//! Every failure the codec can report, from a short buffer to an oversized frame.
//!
//! ## Error Categories
//! - **Framing Errors**: oversized packets, truncated headers or payloads
//! - **Primitive Errors**: invalid length-encoding markers, unexpected NULLs
//! - **Message Errors**: bad result discriminators, unterminated handshake strings
//! - **Bit Field Errors**: unknown or reserved flag names
//! - **Ambient Errors**: I/O from the stream codec, configuration problems
//!
//! Decoding is all-or-nothing: a message either decodes completely or an error
//! is returned and nothing partial escapes.
//!
//! ## Example Usage
//! ```rust
//! use mysql_wire_codec::core::varlen::decode_length;
//! use mysql_wire_codec::error::ProtocolError;
//!
//! match decode_length(&[0xFF]) {
//!     Err(ProtocolError::InvalidLengthEncoding(marker)) => assert_eq!(marker, 0xFF),
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants to reduce allocations in error paths.
pub mod constants {
    /// Handshake string fields
    pub const ERR_SERVER_VERSION_UNTERMINATED: &str = "server version is not NUL-terminated";
    pub const ERR_USER_UNTERMINATED: &str = "user name is not NUL-terminated";
    pub const ERR_SCRAMBLE_LENGTH_MISSING: &str = "scramble length byte is missing";

    /// Result discriminators
    pub const EXPECTED_OK: &str = "0";
    pub const EXPECTED_EOF: &str = "254";
    pub const EXPECTED_ERROR: &str = "255";
    pub const EXPECTED_ROW_COUNT: &str = "1-250";
}

/// ProtocolError is the primary error type for all codec operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid length encoding marker: {0}")]
    InvalidLengthEncoding(u8),

    #[error("Bad field count: expected {expected}, received {received}")]
    BadFieldCount { expected: &'static str, received: u8 },

    #[error("Truncated input: needed {needed} bytes, {available} available")]
    TruncatedInput { needed: usize, available: usize },

    #[error("Truncated handshake: {0}")]
    TruncatedHandshake(&'static str),

    #[error("Packet too large: {0} bytes (maximum 16777215)")]
    PacketTooLarge(u64),

    #[error("Field {field} too long: {len} bytes (maximum {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("Field {field} contains a NUL byte but is NUL-terminated on the wire")]
    EmbeddedNul { field: &'static str },

    #[error("Unexpected NULL marker where a string is required")]
    UnexpectedNull,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
