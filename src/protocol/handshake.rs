//! Handshake packets: the server greeting and the client's response.
//!
//! ## Server greeting
//! ```text
//! protocol_version  u8
//! server_version    bytes, NUL-terminated
//! thread_id         u32 LE
//! scramble[0..8]    8 bytes
//! filler            u8
//! capabilities      u16 LE (low 16 bits)
//! charset           u8
//! status            u16 LE
//! reserved          13 bytes
//! scramble[8..20]   12 bytes
//! filler            u8
//! ```
//!
//! ## Client response
//! ```text
//! capabilities      u32 LE
//! max_packet_size   u32 LE
//! charset           u8
//! reserved          23 bytes
//! user              bytes, NUL-terminated
//! scramble_len      u8 (0 = no scramble)
//! scramble          scramble_len bytes
//! database          bytes, optional trailing NUL
//! ```
//!
//! Field order is the whole contract here; the tests pin both layouts against
//! literal byte fixtures.

use crate::config::{ProtocolConfig, DEFAULT_PROTOCOL_VERSION, MAX_PAYLOAD_SIZE, SCRAMBLE_SIZE};
use crate::core::bitfield::{Capabilities, ServerStatus};
use crate::core::reader::PayloadReader;
use crate::error::{constants, ProtocolError, Result};
use crate::protocol::auth::{generate_scramble, native_password_scramble, Scramble};
use crate::protocol::Encode;
use bytes::{BufMut, BytesMut};
use std::fmt;
use tracing::{debug, instrument};

const SCRAMBLE_HEAD: usize = 8;
const GREETING_RESERVED: usize = 13;
const RESPONSE_RESERVED: usize = 23;

/// Initial packet sent by the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerHandshake {
    pub protocol_version: u8,
    pub server_version: Vec<u8>,
    pub thread_id: u32,
    pub scramble: Scramble,
    pub filler1: u8,
    /// Only the low 16 bits travel in this packet
    pub capabilities: Capabilities,
    pub charset: u8,
    pub status: ServerStatus,
    pub reserved: [u8; GREETING_RESERVED],
    pub filler2: u8,
}

impl Default for ServerHandshake {
    fn default() -> Self {
        Self {
            protocol_version: DEFAULT_PROTOCOL_VERSION,
            server_version: Vec::new(),
            thread_id: 0,
            scramble: [0; SCRAMBLE_SIZE],
            filler1: 0,
            capabilities: Capabilities::default(),
            charset: 0,
            status: ServerStatus::default(),
            reserved: [0; GREETING_RESERVED],
            filler2: 0,
        }
    }
}

impl ServerHandshake {
    pub fn new(thread_id: u32, server_version: impl Into<Vec<u8>>, scramble: Scramble) -> Self {
        Self {
            server_version: server_version.into(),
            thread_id,
            scramble,
            ..Self::default()
        }
    }

    /// Greeting advertising the configured version and charset with a fresh scramble
    pub fn from_config(config: &ProtocolConfig, thread_id: u32) -> Self {
        Self {
            capabilities: Capabilities::client_default(),
            charset: config.charset,
            status: ServerStatus::new(0b10), // AUTOCOMMIT
            ..Self::new(thread_id, config.server_version.as_bytes(), generate_scramble())
        }
    }

    #[instrument(level = "trace", skip_all, fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        let protocol_version = reader.read_u8()?;
        let server_version = reader
            .read_nul_terminated()
            .ok_or_else(|| {
                debug!("server greeting has no version terminator");
                ProtocolError::TruncatedHandshake(constants::ERR_SERVER_VERSION_UNTERMINATED)
            })?
            .to_vec();

        let thread_id = reader.read_u32_le()?;
        let head: [u8; SCRAMBLE_HEAD] = reader.read_array()?;
        let filler1 = reader.read_u8()?;
        let capabilities = Capabilities::new(u32::from(reader.read_u16_le()?));
        let charset = reader.read_u8()?;
        let status = ServerStatus::new(u32::from(reader.read_u16_le()?));
        let reserved = reader.read_array()?;
        let tail: [u8; SCRAMBLE_SIZE - SCRAMBLE_HEAD] = reader.read_array()?;
        let filler2 = reader.read_u8()?;

        let mut scramble = [0u8; SCRAMBLE_SIZE];
        scramble[..SCRAMBLE_HEAD].copy_from_slice(&head);
        scramble[SCRAMBLE_HEAD..].copy_from_slice(&tail);

        let handshake = Self {
            protocol_version,
            server_version,
            thread_id,
            scramble,
            filler1,
            capabilities,
            charset,
            status,
            reserved,
            filler2,
        };
        Ok((handshake, reader.position()))
    }
}

/// Fail with `EmbeddedNul` if `value` could not be read back up to its terminator
fn check_terminable(field: &'static str, value: &[u8]) -> Result<()> {
    if value.contains(&0) {
        debug!(field, "refusing to encode NUL inside a NUL-terminated field");
        return Err(ProtocolError::EmbeddedNul { field });
    }
    Ok(())
}

impl Encode for ServerHandshake {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        check_terminable("server_version", &self.server_version)?;
        buf.reserve(self.server_version.len() + 46);
        buf.put_u8(self.protocol_version);
        buf.put_slice(&self.server_version);
        buf.put_u8(0);
        buf.put_u32_le(self.thread_id);
        buf.put_slice(&self.scramble[..SCRAMBLE_HEAD]);
        buf.put_u8(self.filler1);
        buf.put_u16_le((self.capabilities.value() & 0xFFFF) as u16);
        buf.put_u8(self.charset);
        buf.put_u16_le((self.status.value() & 0xFFFF) as u16);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.scramble[SCRAMBLE_HEAD..]);
        buf.put_u8(self.filler2);
        Ok(())
    }
}

impl fmt::Display for ServerHandshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ServerHandshake(protocol {}, version {:?}, thread {}, charset {}, {}, {})",
            self.protocol_version,
            String::from_utf8_lossy(&self.server_version),
            self.thread_id,
            self.charset,
            self.capabilities,
            self.status
        )
    }
}

/// Response sent by the client after the greeting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHandshake {
    pub capabilities: Capabilities,
    pub max_packet_size: u32,
    pub charset: u8,
    pub reserved: [u8; RESPONSE_RESERVED],
    pub user: Vec<u8>,
    /// `None` when the scramble length byte is zero
    pub scramble: Option<Vec<u8>>,
    /// `None` when nothing follows the scramble
    pub database: Option<Vec<u8>>,
}

impl Default for ClientHandshake {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::default(),
            max_packet_size: 0,
            charset: 0,
            reserved: [0; RESPONSE_RESERVED],
            user: Vec::new(),
            scramble: None,
            database: None,
        }
    }
}

impl ClientHandshake {
    pub fn new(
        capabilities: Capabilities,
        charset: u8,
        user: impl Into<Vec<u8>>,
        scramble: Option<Vec<u8>>,
        database: Option<Vec<u8>>,
    ) -> Self {
        Self {
            capabilities,
            max_packet_size: MAX_PAYLOAD_SIZE,
            charset,
            user: user.into(),
            scramble,
            database,
            ..Self::default()
        }
    }

    /// Response answering `greeting` with a hashed password.
    ///
    /// An empty password produces an absent scramble.
    pub fn with_password(
        greeting: &ServerHandshake,
        user: impl Into<Vec<u8>>,
        password: &[u8],
        database: Option<Vec<u8>>,
    ) -> Self {
        let token = native_password_scramble(password, &greeting.scramble);
        Self::new(
            Capabilities::client_default(),
            greeting.charset,
            user,
            token.map(|t| t.to_vec()),
            database,
        )
    }

    #[instrument(level = "trace", skip_all, fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        let capabilities = Capabilities::new(reader.read_u32_le()?);
        let max_packet_size = reader.read_u32_le()?;
        let charset = reader.read_u8()?;
        let reserved = reader.read_array()?;

        let user = reader
            .read_nul_terminated()
            .ok_or(ProtocolError::TruncatedHandshake(
                constants::ERR_USER_UNTERMINATED,
            ))?
            .to_vec();

        let scramble_len = reader.read_u8().map_err(|_| {
            ProtocolError::TruncatedHandshake(constants::ERR_SCRAMBLE_LENGTH_MISSING)
        })?;
        let scramble = match scramble_len {
            0 => None,
            len => Some(reader.read_bytes(usize::from(len))?.to_vec()),
        };

        // Exactly one trailing NUL is stripped if present.
        let database = match reader.read_rest() {
            [] => None,
            [name @ .., 0] => Some(name.to_vec()),
            name => Some(name.to_vec()),
        };

        let handshake = Self {
            capabilities,
            max_packet_size,
            charset,
            reserved,
            user,
            scramble,
            database,
        };
        Ok((handshake, reader.position()))
    }
}

impl Encode for ClientHandshake {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        let scramble = self.scramble.as_deref().unwrap_or_default();
        let scramble_len = u8::try_from(scramble.len()).map_err(|_| ProtocolError::FieldTooLong {
            field: "scramble",
            len: scramble.len(),
            max: usize::from(u8::MAX),
        })?;
        check_terminable("user", &self.user)?;

        buf.put_u32_le(self.capabilities.value());
        buf.put_u32_le(self.max_packet_size);
        buf.put_u8(self.charset);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.user);
        buf.put_u8(0);
        buf.put_u8(scramble_len);
        buf.put_slice(scramble);
        if let Some(database) = &self.database {
            buf.put_slice(database);
            buf.put_u8(0);
        }
        Ok(())
    }
}

impl fmt::Display for ClientHandshake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientHandshake(user {:?}, database {:?}, scramble {} bytes, charset {}, {})",
            String::from_utf8_lossy(&self.user),
            self.database.as_deref().map(String::from_utf8_lossy),
            self.scramble.as_ref().map_or(0, Vec::len),
            self.charset,
            self.capabilities
        )
    }
}
