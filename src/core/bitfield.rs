//! # Named Bit Fields
//!
//! Capability, status and column flag words are plain integers on the wire, but
//! callers think of them as sets of named bits. `BitField<T>` pairs the raw
//! integer with a static, ordered name table supplied by `T`: the bit position
//! of a name is its index in the table, and `None` entries mark reserved slots
//! that no name resolves to.
//!
//! Two lookups are exposed per name:
//! - [`BitField::get_bit`] / [`BitField::set_bit`] test and toggle the bit
//! - [`BitField::mask_for`] returns the raw `1 << index` mask
//!
//! ```rust
//! use mysql_wire_codec::core::bitfield::Capabilities;
//!
//! let mut caps = Capabilities::default();
//! caps.set_bit("PROTOCOL_41", true).unwrap();
//! assert!(caps.get_bit("PROTOCOL_41").unwrap());
//! assert_eq!(caps.value(), Capabilities::mask_for("PROTOCOL_41").unwrap());
//! ```

use crate::error::{ProtocolError, Result};
use std::fmt;
use std::marker::PhantomData;

/// Static name table backing a [`BitField`].
pub trait FieldTable {
    /// Human-readable table name, used in error messages
    const NAME: &'static str;
    /// Bit names ordered by position; `None` marks a reserved bit
    const FIELDS: &'static [Option<&'static str>];
}

/// An unsigned integer viewed through a fixed table of bit names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BitField<T: FieldTable> {
    value: u32,
    _table: PhantomData<T>,
}

impl<T: FieldTable> BitField<T> {
    /// Wrap a raw integer
    pub const fn new(value: u32) -> Self {
        Self {
            value,
            _table: PhantomData,
        }
    }

    /// Build a field with every listed name set
    pub fn from_names(names: &[&str]) -> Result<Self> {
        let mut field = Self::new(0);
        for name in names {
            field.set_bit(name, true)?;
        }
        Ok(field)
    }

    /// Raw backing integer, as written to the wire
    pub const fn value(&self) -> u32 {
        self.value
    }

    /// Bit position of a declared name
    pub fn index_of(name: &str) -> Result<u32> {
        T::FIELDS
            .iter()
            .position(|field| *field == Some(name))
            .map(|index| index as u32)
            .ok_or_else(|| ProtocolError::UnknownField(format!("{}.{}", T::NAME, name)))
    }

    /// `1 << index` for a declared name
    pub fn mask_for(name: &str) -> Result<u32> {
        Ok(1 << Self::index_of(name)?)
    }

    /// Whether the named bit is set; `UnknownField` for undeclared or reserved names
    pub fn get_bit(&self, name: &str) -> Result<bool> {
        Ok(self.value & Self::mask_for(name)? != 0)
    }

    /// Set or clear the named bit, leaving every other bit alone
    pub fn set_bit(&mut self, name: &str, on: bool) -> Result<()> {
        let mask = Self::mask_for(name)?;
        if on {
            self.value |= mask;
        } else {
            self.value &= !mask;
        }
        Ok(())
    }

    /// Names of every set bit that has one, in position order
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        T::FIELDS
            .iter()
            .enumerate()
            .filter_map(move |(index, field)| match field {
                Some(name) if self.value & (1 << index) != 0 => Some(*name),
                _ => None,
            })
    }
}

impl<T: FieldTable> From<u32> for BitField<T> {
    fn from(value: u32) -> Self {
        Self::new(value)
    }
}

impl<T: FieldTable> fmt::Display for BitField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.names().collect();
        write!(f, "{}[{}]", T::NAME, names.join("|"))
    }
}

/// Client/server capability names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilityNames;

impl FieldTable for CapabilityNames {
    const NAME: &'static str = "Capabilities";
    const FIELDS: &'static [Option<&'static str>] = &[
        Some("LONG_PASSWORD"),
        Some("FOUND_ROWS"),
        Some("LONG_FLAG"),
        Some("CONNECT_WITH_DB"),
        Some("NO_SCHEMA"),
        Some("COMPRESS"),
        Some("ODBC"),
        Some("LOCAL_FILES"),
        Some("IGNORE_SPACE"),
        Some("PROTOCOL_41"),
        Some("INTERACTIVE"),
        Some("SSL"),
        Some("IGNORE_SIGPIPE"),
        Some("TRANSACTIONS"),
        Some("RESERVED"),
        Some("SECURE_CONNECTION"),
        Some("MULTI_STATEMENTS"),
        Some("MULTI_RESULTS"),
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        None,
        Some("SSL_VERIFY_SERVER_CERT"),
        Some("REMEMBER_OPTIONS"),
    ];
}

/// Server status names. Bit 2 is unassigned on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct StatusNames;

impl FieldTable for StatusNames {
    const NAME: &'static str = "ServerStatus";
    const FIELDS: &'static [Option<&'static str>] = &[
        Some("IN_TRANS"),
        Some("AUTOCOMMIT"),
        None,
        Some("MORE_RESULTS_EXISTS"),
        Some("QUERY_NO_GOOD_INDEX_USED"),
        Some("QUERY_NO_INDEX_USED"),
        Some("CURSOR_EXISTS"),
        Some("LAST_ROW_SENT"),
        Some("DB_DROPPED"),
        Some("NO_BACKSLASH_ESCAPES"),
        Some("QUERY_WAS_SLOW"),
    ];
}

/// Column definition flag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColumnFlagNames;

impl FieldTable for ColumnFlagNames {
    const NAME: &'static str = "ColumnFlags";
    const FIELDS: &'static [Option<&'static str>] = &[
        Some("NOT_NULL"),
        Some("PRI_KEY"),
        Some("UNIQUE_KEY"),
        Some("MULTIPLE_KEY"),
        Some("BLOB"),
        Some("UNSIGNED"),
        Some("ZEROFILL"),
        Some("BINARY"),
        Some("ENUM"),
        Some("AUTO_INCREMENT"),
        Some("TIMESTAMP"),
        Some("SET"),
        Some("NO_DEFAULT_VALUE"),
        Some("ON_UPDATE_NOW"),
        Some("PART_KEY"),
        Some("NUM"),
        Some("UNIQUE"),
        Some("BINCMP"),
        Some("GET_FIXED_FIELDS"),
        Some("IN_PART_FUNC"),
        Some("IN_ADD_INDEX"),
        Some("RENAMED"),
    ];
}

pub type Capabilities = BitField<CapabilityNames>;
pub type ServerStatus = BitField<StatusNames>;
pub type ColumnFlags = BitField<ColumnFlagNames>;

impl Capabilities {
    /// Capabilities a 4.1 client advertises by default
    pub fn client_default() -> Self {
        // LONG_PASSWORD | FOUND_ROWS | LONG_FLAG | CONNECT_WITH_DB
        // | PROTOCOL_41 | TRANSACTIONS | SECURE_CONNECTION
        Self::new(0x0000_A20F)
    }
}
