//! # Protocol Messages
//!
//! Typed views over frame payloads. Each message type offers two explicit
//! constructors, `new(..)` from fields and `decode(..)` from bytes, and encodes
//! through the [`Encode`] trait.
//!
//! ## Message Families
//! - **Command**: client requests, a command byte plus opaque payload
//! - **Handshake**: the server greeting and the client's response
//! - **Column**: column definition metadata
//! - **Result**: OK / Error / EOF / column-count packets
//! - **Auth**: scramble generation and password hashing for the handshake
//!
//! Decoders copy everything they return out of the input buffer.

pub mod auth;
pub mod column;
pub mod command;
pub mod handshake;
pub mod result;


use crate::error::Result;
use bytes::BytesMut;
use serde::{Deserialize, Serialize};

/// Serialize a message payload (without the frame header).
pub trait Encode {
    /// Append the payload bytes to `buf`
    fn encode(&self, buf: &mut BytesMut) -> Result<()>;

    /// Encode into a fresh buffer
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.to_vec())
    }
}

/// Which historical layout result packets use.
///
/// Nothing on the wire identifies the layout; callers know it from the
/// negotiated capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProtocolVersion {
    /// Pre-4.1 servers
    #[serde(rename = "4.0")]
    Protocol40,
    /// 4.1 and later
    #[default]
    #[serde(rename = "4.1")]
    Protocol41,
}

pub use column::{Column, ColumnType};
pub use command::{Command, CommandId};
pub use handshake::{ClientHandshake, ServerHandshake};
pub use result::{create_result, CountResult, EofResult, ErrorResult, OkResult, ResultMessage};
