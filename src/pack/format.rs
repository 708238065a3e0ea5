//! MessagePack format codes and their classification
//!
//! Every byte value `0x00..=0xff` maps to exactly one [`Format`].

use std::fmt;

/// Largest positive fixint (`0x00..=0x7f`)
pub const POSITIVE_FIXINT_MAX: u8 = 0x7f;
/// First fixmap code (`0x80..=0x8f`)
pub const FIXMAP: u8 = 0x80;
/// First fixarray code (`0x90..=0x9f`)
pub const FIXARRAY: u8 = 0x90;
/// First fixstr code (`0xa0..=0xbf`)
pub const FIXSTR: u8 = 0xa0;
/// Nil
pub const NIL: u8 = 0xc0;
/// Never used by the format
pub const RESERVED: u8 = 0xc1;
/// Boolean false
pub const FALSE: u8 = 0xc2;
/// Boolean true
pub const TRUE: u8 = 0xc3;
/// Binary, 8-bit length
pub const BIN8: u8 = 0xc4;
/// Binary, 16-bit length
pub const BIN16: u8 = 0xc5;
/// Binary, 32-bit length
pub const BIN32: u8 = 0xc6;
/// Extension, 8-bit length
pub const EXT8: u8 = 0xc7;
/// Extension, 16-bit length
pub const EXT16: u8 = 0xc8;
/// Extension, 32-bit length
pub const EXT32: u8 = 0xc9;
/// IEEE 754 single precision
pub const FLOAT32: u8 = 0xca;
/// IEEE 754 double precision
pub const FLOAT64: u8 = 0xcb;
/// Unsigned 8-bit
pub const UINT8: u8 = 0xcc;
/// Unsigned 16-bit
pub const UINT16: u8 = 0xcd;
/// Unsigned 32-bit
pub const UINT32: u8 = 0xce;
/// Unsigned 64-bit
pub const UINT64: u8 = 0xcf;
/// Signed 8-bit
pub const INT8: u8 = 0xd0;
/// Signed 16-bit
pub const INT16: u8 = 0xd1;
/// Signed 32-bit
pub const INT32: u8 = 0xd2;
/// Signed 64-bit
pub const INT64: u8 = 0xd3;
/// Extension with a 1-byte payload
pub const FIXEXT1: u8 = 0xd4;
/// Extension with a 2-byte payload
pub const FIXEXT2: u8 = 0xd5;
/// Extension with a 4-byte payload
pub const FIXEXT4: u8 = 0xd6;
/// Extension with an 8-byte payload
pub const FIXEXT8: u8 = 0xd7;
/// Extension with a 16-byte payload
pub const FIXEXT16: u8 = 0xd8;
/// String, 8-bit length
pub const STR8: u8 = 0xd9;
/// String, 16-bit length
pub const STR16: u8 = 0xda;
/// String, 32-bit length
pub const STR32: u8 = 0xdb;
/// Array, 16-bit length
pub const ARRAY16: u8 = 0xdc;
/// Array, 32-bit length
pub const ARRAY32: u8 = 0xdd;
/// Map, 16-bit length
pub const MAP16: u8 = 0xde;
/// Map, 32-bit length
pub const MAP32: u8 = 0xdf;
/// First negative fixint code (`0xe0..=0xff`, -32..=-1)
pub const NEGATIVE_FIXINT: u8 = 0xe0;

/// Smallest value representable as a negative fixint
pub const NEGATIVE_FIXINT_MIN: i64 = -32;
/// Longest string held in a fixstr
pub const FIXSTR_MAX_LEN: usize = 31;
/// Longest array/map held in a fixarray/fixmap
pub const FIXCONTAINER_MAX_LEN: usize = 15;

/// Classification of a leading format byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Value 0..=127 folded into the code
    PositiveFixInt(u8),
    /// Map with 0..=15 entries folded into the code
    FixMap(u8),
    /// Array with 0..=15 elements folded into the code
    FixArray(u8),
    /// String with 0..=31 bytes folded into the code
    FixStr(u8),
    /// Nil
    Nil,
    /// `0xc1`, never used
    Reserved,
    /// Boolean false
    False,
    /// Boolean true
    True,
    /// Binary with 8-bit length
    Bin8,
    /// Binary with 16-bit length
    Bin16,
    /// Binary with 32-bit length
    Bin32,
    /// Extension with 8-bit length
    Ext8,
    /// Extension with 16-bit length
    Ext16,
    /// Extension with 32-bit length
    Ext32,
    /// Single precision float
    Float32,
    /// Double precision float
    Float64,
    /// Unsigned 8-bit
    Uint8,
    /// Unsigned 16-bit
    Uint16,
    /// Unsigned 32-bit
    Uint32,
    /// Unsigned 64-bit
    Uint64,
    /// Signed 8-bit
    Int8,
    /// Signed 16-bit
    Int16,
    /// Signed 32-bit
    Int32,
    /// Signed 64-bit
    Int64,
    /// Extension, 1-byte payload
    FixExt1,
    /// Extension, 2-byte payload
    FixExt2,
    /// Extension, 4-byte payload
    FixExt4,
    /// Extension, 8-byte payload
    FixExt8,
    /// Extension, 16-byte payload
    FixExt16,
    /// String with 8-bit length
    Str8,
    /// String with 16-bit length
    Str16,
    /// String with 32-bit length
    Str32,
    /// Array with 16-bit length
    Array16,
    /// Array with 32-bit length
    Array32,
    /// Map with 16-bit length
    Map16,
    /// Map with 32-bit length
    Map32,
    /// Value -32..=-1 folded into the code
    NegativeFixInt(i8),
}

impl Format {
    /// Classify a format byte
    #[must_use]
    pub const fn from_u8(code: u8) -> Self {
        match code {
            0x00..=0x7f => Self::PositiveFixInt(code),
            0x80..=0x8f => Self::FixMap(code & 0x0f),
            0x90..=0x9f => Self::FixArray(code & 0x0f),
            0xa0..=0xbf => Self::FixStr(code & 0x1f),
            NIL => Self::Nil,
            RESERVED => Self::Reserved,
            FALSE => Self::False,
            TRUE => Self::True,
            BIN8 => Self::Bin8,
            BIN16 => Self::Bin16,
            BIN32 => Self::Bin32,
            EXT8 => Self::Ext8,
            EXT16 => Self::Ext16,
            EXT32 => Self::Ext32,
            FLOAT32 => Self::Float32,
            FLOAT64 => Self::Float64,
            UINT8 => Self::Uint8,
            UINT16 => Self::Uint16,
            UINT32 => Self::Uint32,
            UINT64 => Self::Uint64,
            INT8 => Self::Int8,
            INT16 => Self::Int16,
            INT32 => Self::Int32,
            INT64 => Self::Int64,
            FIXEXT1 => Self::FixExt1,
            FIXEXT2 => Self::FixExt2,
            FIXEXT4 => Self::FixExt4,
            FIXEXT8 => Self::FixExt8,
            FIXEXT16 => Self::FixExt16,
            STR8 => Self::Str8,
            STR16 => Self::Str16,
            STR32 => Self::Str32,
            ARRAY16 => Self::Array16,
            ARRAY32 => Self::Array32,
            MAP16 => Self::Map16,
            MAP32 => Self::Map32,
            #[allow(clippy::cast_possible_wrap)]
            0xe0..=0xff => Self::NegativeFixInt(code as i8),
        }
    }

    /// Convert back to the wire byte
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        match self {
            Self::PositiveFixInt(v) => v & POSITIVE_FIXINT_MAX,
            Self::FixMap(n) => FIXMAP | (n & 0x0f),
            Self::FixArray(n) => FIXARRAY | (n & 0x0f),
            Self::FixStr(n) => FIXSTR | (n & 0x1f),
            Self::Nil => NIL,
            Self::Reserved => RESERVED,
            Self::False => FALSE,
            Self::True => TRUE,
            Self::Bin8 => BIN8,
            Self::Bin16 => BIN16,
            Self::Bin32 => BIN32,
            Self::Ext8 => EXT8,
            Self::Ext16 => EXT16,
            Self::Ext32 => EXT32,
            Self::Float32 => FLOAT32,
            Self::Float64 => FLOAT64,
            Self::Uint8 => UINT8,
            Self::Uint16 => UINT16,
            Self::Uint32 => UINT32,
            Self::Uint64 => UINT64,
            Self::Int8 => INT8,
            Self::Int16 => INT16,
            Self::Int32 => INT32,
            Self::Int64 => INT64,
            Self::FixExt1 => FIXEXT1,
            Self::FixExt2 => FIXEXT2,
            Self::FixExt4 => FIXEXT4,
            Self::FixExt8 => FIXEXT8,
            Self::FixExt16 => FIXEXT16,
            Self::Str8 => STR8,
            Self::Str16 => STR16,
            Self::Str32 => STR32,
            Self::Array16 => ARRAY16,
            Self::Array32 => ARRAY32,
            Self::Map16 => MAP16,
            Self::Map32 => MAP32,
            #[allow(clippy::cast_sign_loss)]
            Self::NegativeFixInt(v) => (v as u8) | NEGATIVE_FIXINT,
        }
    }

    /// Value kind this format encodes
    #[must_use]
    pub const fn kind(self) -> Kind {
        match self {
            Self::Nil => Kind::Nil,
            Self::Reserved => Kind::Reserved,
            Self::False | Self::True => Kind::Bool,
            Self::PositiveFixInt(_) | Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64 => {
                Kind::UInt
            }
            Self::NegativeFixInt(_) | Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 => {
                Kind::Int
            }
            Self::Float32 | Self::Float64 => Kind::Float,
            Self::FixStr(_) | Self::Str8 | Self::Str16 | Self::Str32 => Kind::Str,
            Self::Bin8 | Self::Bin16 | Self::Bin32 => Kind::Bin,
            Self::FixArray(_) | Self::Array16 | Self::Array32 => Kind::Array,
            Self::FixMap(_) | Self::Map16 | Self::Map32 => Kind::Map,
            Self::FixExt1
            | Self::FixExt2
            | Self::FixExt4
            | Self::FixExt8
            | Self::FixExt16
            | Self::Ext8
            | Self::Ext16
            | Self::Ext32 => Kind::Ext,
        }
    }

    /// Check if the value lives entirely in the code byte
    #[must_use]
    pub const fn is_fixed(self) -> bool {
        matches!(
            self,
            Self::PositiveFixInt(_)
                | Self::NegativeFixInt(_)
                | Self::FixMap(_)
                | Self::FixArray(_)
                | Self::FixStr(_)
                | Self::Nil
                | Self::False
                | Self::True
        )
    }
}

/// Value kinds, used to describe what a destination expected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Any value (dynamic destination)
    Any,
    /// Nil
    Nil,
    /// Boolean
    Bool,
    /// Signed integer
    Int,
    /// Unsigned integer
    UInt,
    /// Any integer
    Integer,
    /// Float (or integer widened to float)
    Float,
    /// UTF-8 string
    Str,
    /// Raw bytes
    Bin,
    /// Array
    Array,
    /// Map
    Map,
    /// Extension
    Ext,
    /// Record (map or array)
    Record,
    /// The reserved `0xc1` code
    Reserved,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Any => "any value",
            Self::Nil => "nil",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::UInt => "uint",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Str => "str",
            Self::Bin => "bin",
            Self::Array => "array",
            Self::Map => "map",
            Self::Ext => "ext",
            Self::Record => "record",
            Self::Reserved => "reserved",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_byte_roundtrips() {
        for code in 0..=u8::MAX {
            assert_eq!(Format::from_u8(code).as_u8(), code, "code {code:#04x}");
        }
    }

    #[test]
    fn test_fixed_ranges() {
        assert_eq!(Format::from_u8(0x7f), Format::PositiveFixInt(127));
        assert_eq!(Format::from_u8(0x8f), Format::FixMap(15));
        assert_eq!(Format::from_u8(0x9a), Format::FixArray(10));
        assert_eq!(Format::from_u8(0xbf), Format::FixStr(31));
        assert_eq!(Format::from_u8(0xe0), Format::NegativeFixInt(-32));
        assert_eq!(Format::from_u8(0xff), Format::NegativeFixInt(-1));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(Format::from_u8(UINT64).kind(), Kind::UInt);
        assert_eq!(Format::from_u8(INT8).kind(), Kind::Int);
        assert_eq!(Format::from_u8(FIXEXT16).kind(), Kind::Ext);
        assert_eq!(Format::from_u8(RESERVED).kind(), Kind::Reserved);
        assert!(Format::from_u8(TRUE).is_fixed());
        assert!(!Format::from_u8(STR8).is_fixed());
    }
}
