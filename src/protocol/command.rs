//! Client command packets.
//!
//! ```text
//! [command id: u8] [payload: rest of packet]
//! ```
//!
//! The payload is opaque at this layer: query text, a schema name, statement
//! ids. A query is just a command with id `Query` and the SQL as payload, so
//! it gets a factory rather than a type of its own.

use crate::error::{ProtocolError, Result};
use crate::protocol::Encode;
use bytes::{BufMut, BytesMut};
use std::fmt;

/// Command identifiers sent as the first payload byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandId {
    Sleep = 0,
    Quit = 1,
    InitDb = 2,
    Query = 3,
    FieldList = 4,
    CreateDb = 5,
    DropDb = 6,
    Refresh = 7,
    Shutdown = 8,
    Statistics = 9,
    ProcessInfo = 10,
    Connect = 11,
    ProcessKill = 12,
    Debug = 13,
    Ping = 14,
    Time = 15,
    DelayedInsert = 16,
    ChangeUser = 17,
    BinlogDump = 18,
    TableDump = 19,
    ConnectOut = 20,
    RegisterSlave = 21,
    StmtPrepare = 22,
    StmtExecute = 23,
    StmtSendLongData = 24,
    StmtClose = 25,
    StmtReset = 26,
    SetOption = 27,
    StmtFetch = 28,
    Daemon = 29,
    End = 30,
}

impl CommandId {
    const ALL: [CommandId; 31] = [
        CommandId::Sleep,
        CommandId::Quit,
        CommandId::InitDb,
        CommandId::Query,
        CommandId::FieldList,
        CommandId::CreateDb,
        CommandId::DropDb,
        CommandId::Refresh,
        CommandId::Shutdown,
        CommandId::Statistics,
        CommandId::ProcessInfo,
        CommandId::Connect,
        CommandId::ProcessKill,
        CommandId::Debug,
        CommandId::Ping,
        CommandId::Time,
        CommandId::DelayedInsert,
        CommandId::ChangeUser,
        CommandId::BinlogDump,
        CommandId::TableDump,
        CommandId::ConnectOut,
        CommandId::RegisterSlave,
        CommandId::StmtPrepare,
        CommandId::StmtExecute,
        CommandId::StmtSendLongData,
        CommandId::StmtClose,
        CommandId::StmtReset,
        CommandId::SetOption,
        CommandId::StmtFetch,
        CommandId::Daemon,
        CommandId::End,
    ];
}

impl TryFrom<u8> for CommandId {
    type Error = ProtocolError;

    fn try_from(byte: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(byte))
            .copied()
            .ok_or_else(|| ProtocolError::UnknownField(format!("CommandId.{byte}")))
    }
}

impl From<CommandId> for u8 {
    fn from(id: CommandId) -> Self {
        id as u8
    }
}

/// A command packet: one id byte followed by an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub command_id: u8,
    pub payload: Vec<u8>,
}

impl Default for Command {
    fn default() -> Self {
        Self::new(CommandId::Sleep, Vec::new())
    }
}

impl Command {
    pub fn new(command_id: impl Into<u8>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command_id: command_id.into(),
            payload: payload.into(),
        }
    }

    /// A `Query` command carrying `query` as its payload
    pub fn query(query: impl Into<Vec<u8>>) -> Self {
        Self::new(CommandId::Query, query)
    }

    /// Decode a command payload; the whole buffer is consumed.
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let (&command_id, payload) = buf.split_first().ok_or(ProtocolError::TruncatedInput {
            needed: 1,
            available: 0,
        })?;
        Ok((Self::new(command_id, payload), buf.len()))
    }

    /// The command id, if it is one this codec knows
    pub fn id(&self) -> Option<CommandId> {
        CommandId::try_from(self.command_id).ok()
    }
}

impl Encode for Command {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        buf.reserve(1 + self.payload.len());
        buf.put_u8(self.command_id);
        buf.put_slice(&self.payload);
        Ok(())
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => write!(f, "Command({id:?}, {} bytes)", self.payload.len()),
            None => write!(
                f,
                "Command(#{}, {} bytes)",
                self.command_id,
                self.payload.len()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_sleep() {
        let command = Command::default();
        assert_eq!(command.command_id, 0);
        assert!(command.payload.is_empty());
    }

    #[test]
    fn test_decode_query() {
        let (command, consumed) = Command::decode(b"\x03abc").unwrap();
        assert_eq!(command.id(), Some(CommandId::Query));
        assert_eq!(command.payload, b"abc");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn test_query_factory_encodes() {
        let bytes = Command::query("abc").to_bytes().unwrap();
        assert_eq!(bytes, b"\x03abc");
        assert_eq!(Command::decode(&bytes).unwrap().0, Command::query("abc"));
    }

    #[test]
    fn test_empty_buffer() {
        assert!(matches!(
            Command::decode(&[]),
            Err(ProtocolError::TruncatedInput { .. })
        ));
    }

    #[test]
    fn test_command_id_table() {
        for byte in 0..=30u8 {
            assert_eq!(u8::from(CommandId::try_from(byte).unwrap()), byte);
        }
        assert!(CommandId::try_from(31).is_err());
    }

    #[test]
    fn test_unknown_id_still_decodes() {
        let (command, _) = Command::decode(&[200, 1, 2]).unwrap();
        assert_eq!(command.command_id, 200);
        assert_eq!(command.id(), None);
    }
}
