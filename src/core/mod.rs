//! # Core Protocol Components
//!
//! Low-level framing and the primitives every message is built from.
//!
//! ## Components
//! - **BitField**: named views over capability, status and column flag words
//! - **Varlen**: length-encoded integers, strings and text rows
//! - **Packet**: the 4-byte frame header and whole frames
//! - **Codec**: Tokio codec for framing over byte streams
//! - **Reader**: bounds-checked little-endian cursor
//!
//! ## Wire Format
//! ```text
//! [Size(3, LE)] [Sequence(1)] [Payload(Size)]
//! ```
//!
//! ## Limits
//! - Maximum payload per frame: 16 777 215 bytes
//! - Sequence numbers wrap at 256

pub mod bitfield;
pub mod codec;
pub mod packet;
pub mod reader;
pub mod varlen;
