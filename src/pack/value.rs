//! Dynamically typed MessagePack value

use bytes::Bytes;

use super::decode::{Decode, Decoder};
use super::encode::{Encode, Encoder};
use super::format::Kind;
use super::timestamp::Timestamp;
use super::Result;

/// Any value representable on the wire
///
/// Integers compare numerically across [`Value::Int`] and [`Value::UInt`]:
/// decoding always yields `UInt` for non-negative integers.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Nil
    #[default]
    Nil,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    UInt(u64),
    /// Single precision float
    F32(f32),
    /// Double precision float
    F64(f64),
    /// UTF-8 string
    Str(String),
    /// Raw bytes
    Bin(Bytes),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Key/value pairs in wire order
    Map(Vec<(Value, Value)>),
    /// Built-in timestamp extension
    Timestamp(Timestamp),
    /// Other registered extension: type code and raw payload. Encoding checks
    /// the payload with the registered decoder; the timestamp code is refused.
    Ext(i8, Bytes),
}

impl Value {
    /// Kind of this value
    #[must_use]
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Nil => Kind::Nil,
            Self::Bool(_) => Kind::Bool,
            Self::Int(_) => Kind::Int,
            Self::UInt(_) => Kind::UInt,
            Self::F32(_) | Self::F64(_) => Kind::Float,
            Self::Str(_) => Kind::Str,
            Self::Bin(_) => Kind::Bin,
            Self::Array(_) => Kind::Array,
            Self::Map(_) => Kind::Map,
            Self::Timestamp(_) | Self::Ext(..) => Kind::Ext,
        }
    }

    /// Check for nil
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Integer value, if this is an integer that fits `i64`
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Integer value, if this is a non-negative integer
    #[must_use]
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::UInt(v) => Some(*v),
            Self::Int(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// String contents
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Array elements
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a string key in a map
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Self::Map(entries) => entries
                .iter()
                .find(|(k, _)| k.as_str() == Some(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    fn integer(&self) -> Option<i128> {
        match self {
            Self::Int(v) => Some(i128::from(*v)),
            Self::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if let (Some(a), Some(b)) = (self.integer(), other.integer()) {
            return a == b;
        }
        match (self, other) {
            (Self::Nil, Self::Nil) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits() || a == b,
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits() || a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Bin(a), Self::Bin(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Ext(ca, a), Self::Ext(cb, b)) => ca == cb && a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_sign_loss)]
    fn from(value: i64) -> Self {
        if value >= 0 {
            Self::UInt(value as u64)
        } else {
            Self::Int(value)
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::UInt(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::UInt(u64::from(value))
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::F32(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::F64(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<Bytes> for Value {
    fn from(value: Bytes) -> Self {
        Self::Bin(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::Array(value)
    }
}

impl From<Timestamp> for Value {
    fn from(value: Timestamp) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Nil, Into::into)
    }
}

impl Encode for Value {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        match self {
            Self::Nil => enc.write_nil(),
            Self::Bool(v) => enc.write_bool(*v),
            Self::Int(v) => enc.write_i64(*v),
            Self::UInt(v) => enc.write_u64(*v),
            Self::F32(v) => enc.write_f32(*v),
            Self::F64(v) => enc.write_f64(*v),
            Self::Str(s) => enc.write_str(s),
            Self::Bin(b) => enc.write_bin(b),
            Self::Array(items) => {
                enc.write_array_len(items.len())?;
                items.iter().try_for_each(|item| item.encode(enc))
            }
            Self::Map(entries) => {
                enc.write_map_len(entries.len())?;
                for (key, value) in entries {
                    key.encode(enc)?;
                    value.encode(enc)?;
                }
                Ok(())
            }
            Self::Timestamp(ts) => ts.encode(enc),
            Self::Ext(type_code, payload) => enc.write_ext(*type_code, payload),
        }
    }
}

impl Decode for Value {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = dec.read_value()?;
        Ok(())
    }
}
