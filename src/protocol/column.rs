//! Column definition packets.
//!
//! Six length-encoded strings followed by a 13-byte fixed block; anything
//! after the block is the column's default value.
//!
//! ```text
//! catalog, db, table, orig_table, name, orig_name   length-encoded strings
//! unused1        u8
//! charset        u16 LE
//! column_size    u32 LE
//! column_type    u8
//! flags          u16 LE
//! decimals       u8
//! reserved       2 bytes
//! default_value  rest
//! ```

use crate::core::bitfield::ColumnFlags;
use crate::core::reader::PayloadReader;
use crate::core::varlen::{put_string, read_string};
use crate::error::{ProtocolError, Result};
use crate::protocol::Encode;
use bytes::{BufMut, BytesMut};
use std::fmt;
use tracing::instrument;

/// Column type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ColumnType {
    Decimal = 0,
    Tiny = 1,
    Short = 2,
    Long = 3,
    Float = 4,
    Double = 5,
    Null = 6,
    Timestamp = 7,
    LongLong = 8,
    Int24 = 9,
    Date = 10,
    Time = 11,
    DateTime = 12,
    Year = 13,
    NewDate = 14,
    VarChar = 15,
    Bit = 16,
    NewDecimal = 246,
    Enum = 247,
    Set = 248,
    TinyBlob = 249,
    MediumBlob = 250,
    LongBlob = 251,
    Blob = 252,
    VarString = 253,
    String = 254,
    Geometry = 255,
}

impl TryFrom<u8> for ColumnType {
    type Error = ProtocolError;

    fn try_from(code: u8) -> Result<Self> {
        let column_type = match code {
            0 => ColumnType::Decimal,
            1 => ColumnType::Tiny,
            2 => ColumnType::Short,
            3 => ColumnType::Long,
            4 => ColumnType::Float,
            5 => ColumnType::Double,
            6 => ColumnType::Null,
            7 => ColumnType::Timestamp,
            8 => ColumnType::LongLong,
            9 => ColumnType::Int24,
            10 => ColumnType::Date,
            11 => ColumnType::Time,
            12 => ColumnType::DateTime,
            13 => ColumnType::Year,
            14 => ColumnType::NewDate,
            15 => ColumnType::VarChar,
            16 => ColumnType::Bit,
            246 => ColumnType::NewDecimal,
            247 => ColumnType::Enum,
            248 => ColumnType::Set,
            249 => ColumnType::TinyBlob,
            250 => ColumnType::MediumBlob,
            251 => ColumnType::LongBlob,
            252 => ColumnType::Blob,
            253 => ColumnType::VarString,
            254 => ColumnType::String,
            255 => ColumnType::Geometry,
            other => return Err(ProtocolError::UnknownField(format!("ColumnType.{other}"))),
        };
        Ok(column_type)
    }
}

impl From<ColumnType> for u8 {
    fn from(column_type: ColumnType) -> Self {
        column_type as u8
    }
}

/// Column definition metadata
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Column {
    pub catalog: Vec<u8>,
    pub db: Vec<u8>,
    pub table: Vec<u8>,
    pub orig_table: Vec<u8>,
    pub name: Vec<u8>,
    pub orig_name: Vec<u8>,
    pub unused1: u8,
    pub charset: u16,
    pub column_size: u32,
    /// Raw type code; see [`Column::kind`] for the typed view
    pub column_type: u8,
    /// Only the low 16 bits travel on the wire
    pub flags: ColumnFlags,
    pub decimals: u8,
    pub reserved: [u8; 2],
    pub default_value: Vec<u8>,
}

impl Column {
    /// Column named `name` in `db.table`, with the original names mirrored
    pub fn new(
        db: impl Into<Vec<u8>>,
        table: impl Into<Vec<u8>>,
        name: impl Into<Vec<u8>>,
        column_type: ColumnType,
    ) -> Self {
        let table = table.into();
        let name = name.into();
        Self {
            catalog: b"def".to_vec(),
            db: db.into(),
            orig_table: table.clone(),
            table,
            orig_name: name.clone(),
            name,
            column_type: column_type.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> Option<ColumnType> {
        ColumnType::try_from(self.column_type).ok()
    }

    /// Decode a column definition; the default value takes the rest of the buffer.
    #[instrument(level = "trace", skip_all, fields(len = buf.len()))]
    pub fn decode(buf: &[u8]) -> Result<(Self, usize)> {
        let mut reader = PayloadReader::new(buf);
        let catalog = read_string(&mut reader)?.to_vec();
        let db = read_string(&mut reader)?.to_vec();
        let table = read_string(&mut reader)?.to_vec();
        let orig_table = read_string(&mut reader)?.to_vec();
        let name = read_string(&mut reader)?.to_vec();
        let orig_name = read_string(&mut reader)?.to_vec();

        let unused1 = reader.read_u8()?;
        let charset = reader.read_u16_le()?;
        let column_size = reader.read_u32_le()?;
        let column_type = reader.read_u8()?;
        let flags = ColumnFlags::new(u32::from(reader.read_u16_le()?));
        let decimals = reader.read_u8()?;
        let reserved = reader.read_array()?;
        let default_value = reader.read_rest().to_vec();

        let column = Self {
            catalog,
            db,
            table,
            orig_table,
            name,
            orig_name,
            unused1,
            charset,
            column_size,
            column_type,
            flags,
            decimals,
            reserved,
            default_value,
        };
        Ok((column, reader.position()))
    }
}

impl Encode for Column {
    fn encode(&self, buf: &mut BytesMut) -> Result<()> {
        for field in [
            &self.catalog,
            &self.db,
            &self.table,
            &self.orig_table,
            &self.name,
            &self.orig_name,
        ] {
            put_string(buf, field);
        }
        buf.put_u8(self.unused1);
        buf.put_u16_le(self.charset);
        buf.put_u32_le(self.column_size);
        buf.put_u8(self.column_type);
        buf.put_u16_le((self.flags.value() & 0xFFFF) as u16);
        buf.put_u8(self.decimals);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.default_value);
        Ok(())
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind() {
            Some(kind) => format!("{kind:?}"),
            None => format!("#{}", self.column_type),
        };
        write!(
            f,
            "Column({}.{}.{} as {}, {kind}({}), charset {}, decimals {}, {})",
            String::from_utf8_lossy(&self.db),
            String::from_utf8_lossy(&self.orig_table),
            String::from_utf8_lossy(&self.orig_name),
            String::from_utf8_lossy(&self.name),
            self.column_size,
            self.charset,
            self.decimals,
            self.flags
        )
    }
}
