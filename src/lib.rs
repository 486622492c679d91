//! # mysql-wire-codec
//!
//! Bit-exact encoding and decoding of the MySQL client/server wire protocol.
//!
//! ## Layers
//! - [`core`]: frame headers, the tokio [`PacketCodec`], length-encoded
//!   integers and strings, and named bit fields
//! - [`protocol`]: typed messages (commands, handshake, column definitions,
//!   result packets) that decode from and encode to frame payloads
//! - [`config`] / [`utils`]: codec configuration and tracing setup
//!
//! Decoders take a byte slice and return the decoded value together with the
//! number of bytes consumed. Encoders append to a [`bytes::BytesMut`]. No I/O
//! happens here; pair [`PacketCodec`] with `tokio_util::codec::Framed` for
//! that.
//!
//! ```
//! use mysql_wire_codec::protocol::{create_result, Command, ProtocolVersion, ResultMessage};
//! use mysql_wire_codec::core::packet::Packet;
//!
//! let query = Packet::from_message(0, &Command::query("SELECT 1")).unwrap();
//! assert_eq!(&query.to_bytes().unwrap()[..5], &[9, 0, 0, 0, 3]);
//!
//! let (result, _) = create_result(&[0, 1, 0, 2, 0, 0, 0], ProtocolVersion::Protocol41).unwrap();
//! assert!(matches!(result, ResultMessage::Ok(ok) if ok.affected_rows == 1));
//! ```

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used, clippy::panic))]

pub mod config;
pub mod core;
pub mod error;
pub mod protocol;
pub mod utils;

pub use crate::config::CodecConfig;
pub use crate::core::codec::PacketCodec;
pub use crate::core::packet::Packet;
pub use crate::error::{ProtocolError, Result};
