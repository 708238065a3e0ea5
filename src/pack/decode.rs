//! Single-pass, offset-driven decoder.
//!
//! Every read is bounds-checked through the cursor, so truncated or forged
//! input surfaces as [`Error::OutOfRange`] rather than a panic. Nesting is
//! capped by [`CodecConfig::max_depth`](super::CodecConfig).

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::Bytes;

use super::config::{DEFAULT_MAX_DEPTH, StructMode};
use super::cursor;
use super::ext::{ExtensionType, Registry};
use super::format::{Format, Kind, NIL};
use super::timestamp::Timestamp;
use super::value::Value;
use super::{Error, Result};

/// Most bytes a decoder reserves up front for one container
pub const MAX_PREALLOC_BYTES: usize = 1 << 20;

/// Values that can be filled in place from MessagePack
pub trait Decode {
    /// Overwrite `self` with the next value in the decoder
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()>;
}

/// A format code together with the fields that immediately follow it.
#[derive(Debug, Clone, Copy)]
enum Header {
    Nil,
    Reserved,
    Bool(bool),
    UInt(u64),
    Int(i64),
    F32(f32),
    F64(f64),
    Str(usize),
    Bin(usize),
    Array(usize),
    Map(usize),
    Ext(i8, usize),
}

/// Decoder state for one call
pub struct Decoder<'a> {
    buf: &'a [u8],
    offset: usize,
    registry: &'a Registry,
    mode: StructMode,
    depth: usize,
    max_depth: usize,
}

impl<'a> Decoder<'a> {
    /// Decode from the start of `buf`
    #[must_use]
    pub fn new(buf: &'a [u8], registry: &'a Registry) -> Self {
        Self {
            buf,
            offset: 0,
            registry,
            mode: StructMode::default(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set the struct mode reported to [`Decode`] impls
    #[must_use]
    pub const fn with_struct_mode(mut self, mode: StructMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the maximum container nesting depth
    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Offset just past the last decoded value
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset
    }

    /// Bytes left after [`position`](Self::position)
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buf.len() - self.offset
    }

    /// Struct mode in effect for this call
    #[must_use]
    pub const fn struct_mode(&self) -> StructMode {
        self.mode
    }

    /// Extension registry consulted by this call
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        self.registry
    }

    /// Upper bound for pre-allocating `len` elements of `T`: each element
    /// takes at least one input byte, and the reservation never exceeds
    /// [`MAX_PREALLOC_BYTES`].
    #[must_use]
    pub const fn capacity_hint<T>(&self, len: usize) -> usize {
        let size = size_of::<T>();
        let budget = MAX_PREALLOC_BYTES / if size == 0 { 1 } else { size };
        let remaining = self.remaining();
        let hint = if len < remaining { len } else { remaining };
        if hint < budget { hint } else { budget }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let (bytes, next) = cursor::read_bytes(self.buf, self.offset, n)?;
        self.offset = next;
        Ok(bytes)
    }

    fn u8(&mut self) -> Result<u8> {
        let (value, next) = cursor::read_u8(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    fn u16(&mut self) -> Result<u16> {
        let (value, next) = cursor::read_u16(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    fn u32(&mut self) -> Result<u32> {
        let (value, next) = cursor::read_u32(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    fn u64(&mut self) -> Result<u64> {
        let (value, next) = cursor::read_u64(self.buf, self.offset)?;
        self.offset = next;
        Ok(value)
    }

    fn len32(&mut self) -> Result<usize> {
        Ok(self.u32()? as usize)
    }

    /// Classify the next format byte without consuming it
    pub fn peek_format(&self) -> Result<Format> {
        let (code, _) = cursor::read_u8(self.buf, self.offset)?;
        Ok(Format::from_u8(code))
    }

    /// Consume a nil if one is next
    pub fn try_read_nil(&mut self) -> Result<bool> {
        let (code, next) = cursor::read_u8(self.buf, self.offset)?;
        if code == NIL {
            self.offset = next;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn read_header(&mut self) -> Result<(u8, Header)> {
        let code = self.u8()?;
        let header = match Format::from_u8(code) {
            Format::Nil => Header::Nil,
            Format::Reserved => Header::Reserved,
            Format::False => Header::Bool(false),
            Format::True => Header::Bool(true),
            Format::PositiveFixInt(v) => Header::UInt(u64::from(v)),
            Format::NegativeFixInt(v) => Header::Int(i64::from(v)),
            Format::Uint8 => Header::UInt(u64::from(self.u8()?)),
            Format::Uint16 => Header::UInt(u64::from(self.u16()?)),
            Format::Uint32 => Header::UInt(u64::from(self.u32()?)),
            Format::Uint64 => Header::UInt(self.u64()?),
            Format::Int8 => Header::Int(i64::from(self.u8()? as i8)),
            Format::Int16 => Header::Int(i64::from(self.u16()? as i16)),
            Format::Int32 => Header::Int(i64::from(self.u32()? as i32)),
            Format::Int64 => Header::Int(self.u64()? as i64),
            Format::Float32 => Header::F32(f32::from_bits(self.u32()?)),
            Format::Float64 => Header::F64(f64::from_bits(self.u64()?)),
            Format::FixStr(n) => Header::Str(usize::from(n)),
            Format::Str8 => Header::Str(usize::from(self.u8()?)),
            Format::Str16 => Header::Str(usize::from(self.u16()?)),
            Format::Str32 => Header::Str(self.len32()?),
            Format::Bin8 => Header::Bin(usize::from(self.u8()?)),
            Format::Bin16 => Header::Bin(usize::from(self.u16()?)),
            Format::Bin32 => Header::Bin(self.len32()?),
            Format::FixArray(n) => Header::Array(usize::from(n)),
            Format::Array16 => Header::Array(usize::from(self.u16()?)),
            Format::Array32 => Header::Array(self.len32()?),
            Format::FixMap(n) => Header::Map(usize::from(n)),
            Format::Map16 => Header::Map(usize::from(self.u16()?)),
            Format::Map32 => Header::Map(self.len32()?),
            Format::FixExt1 => Header::Ext(self.u8()? as i8, 1),
            Format::FixExt2 => Header::Ext(self.u8()? as i8, 2),
            Format::FixExt4 => Header::Ext(self.u8()? as i8, 4),
            Format::FixExt8 => Header::Ext(self.u8()? as i8, 8),
            Format::FixExt16 => Header::Ext(self.u8()? as i8, 16),
            Format::Ext8 => {
                let len = usize::from(self.u8()?);
                Header::Ext(self.u8()? as i8, len)
            }
            Format::Ext16 => {
                let len = usize::from(self.u16()?);
                Header::Ext(self.u8()? as i8, len)
            }
            Format::Ext32 => {
                let len = self.len32()?;
                Header::Ext(self.u8()? as i8, len)
            }
        };
        Ok((code, header))
    }

    /// Run `f` one nesting level deeper
    pub fn nested<R>(&mut self, f: impl FnOnce(&mut Self) -> Result<R>) -> Result<R> {
        if self.depth >= self.max_depth {
            return Err(Error::DepthLimitExceeded {
                max: self.max_depth,
            });
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    /// Boolean
    pub fn read_bool(&mut self) -> Result<bool> {
        match self.read_header()? {
            (_, Header::Bool(value)) => Ok(value),
            (code, _) => Err(Error::mismatch(code, Kind::Bool)),
        }
    }

    /// Any integer format, widened
    pub fn read_integer(&mut self) -> Result<i128> {
        match self.read_header()? {
            (_, Header::UInt(value)) => Ok(i128::from(value)),
            (_, Header::Int(value)) => Ok(i128::from(value)),
            (code, _) => Err(Error::mismatch(code, Kind::Integer)),
        }
    }

    /// Single precision float; integers are converted
    #[allow(clippy::cast_precision_loss)]
    pub fn read_f32(&mut self) -> Result<f32> {
        match self.read_header()? {
            (_, Header::F32(value)) => Ok(value),
            (_, Header::UInt(value)) => Ok(value as f32),
            (_, Header::Int(value)) => Ok(value as f32),
            (code, _) => Err(Error::mismatch(code, Kind::Float)),
        }
    }

    /// Double precision float; single precision and integers are converted
    #[allow(clippy::cast_precision_loss)]
    pub fn read_f64(&mut self) -> Result<f64> {
        match self.read_header()? {
            (_, Header::F64(value)) => Ok(value),
            (_, Header::F32(value)) => Ok(f64::from(value)),
            (_, Header::UInt(value)) => Ok(value as f64),
            (_, Header::Int(value)) => Ok(value as f64),
            (code, _) => Err(Error::mismatch(code, Kind::Float)),
        }
    }

    /// UTF-8 string borrowed from the input; bin payloads are accepted
    pub fn read_str(&mut self) -> Result<&'a str> {
        match self.read_header()? {
            (_, Header::Str(len) | Header::Bin(len)) => Ok(std::str::from_utf8(self.take(len)?)?),
            (code, _) => Err(Error::mismatch(code, Kind::Str)),
        }
    }

    /// Raw bytes borrowed from the input; str payloads are accepted
    pub fn read_bin(&mut self) -> Result<&'a [u8]> {
        match self.read_header()? {
            (_, Header::Bin(len) | Header::Str(len)) => self.take(len),
            (code, _) => Err(Error::mismatch(code, Kind::Bin)),
        }
    }

    /// Array header; that many values follow
    pub fn read_array_len(&mut self) -> Result<usize> {
        match self.read_header()? {
            (_, Header::Array(len)) => Ok(len),
            (code, _) => Err(Error::mismatch(code, Kind::Array)),
        }
    }

    /// Map header; that many key/value pairs follow
    pub fn read_map_len(&mut self) -> Result<usize> {
        match self.read_header()? {
            (_, Header::Map(len)) => Ok(len),
            (code, _) => Err(Error::mismatch(code, Kind::Map)),
        }
    }

    /// Extension type code and payload, borrowed from the input
    pub fn read_ext(&mut self) -> Result<(i8, &'a [u8])> {
        match self.read_header()? {
            (_, Header::Ext(type_code, len)) => Ok((type_code, self.take(len)?)),
            (code, _) => Err(Error::mismatch(code, Kind::Ext)),
        }
    }

    /// Value of a registered extension type
    pub fn read_extension<T: ExtensionType>(&mut self) -> Result<T> {
        let code = self.peek_format()?.as_u8();
        let (type_code, payload) = self.read_ext()?;
        match self.registry.lookup(type_code) {
            None => Err(Error::UnregisteredExtension { type_code }),
            Some(entry) if entry.type_id() != TypeId::of::<T>() => {
                Err(Error::mismatch(code, Kind::Ext))
            }
            Some(_) => T::from_payload(payload),
        }
    }

    /// Next value with no destination shape
    pub fn read_value(&mut self) -> Result<Value> {
        let (code, header) = self.read_header()?;
        let value = match header {
            Header::Nil => Value::Nil,
            Header::Reserved => return Err(Error::mismatch(code, Kind::Any)),
            Header::Bool(value) => Value::Bool(value),
            Header::UInt(value) => Value::UInt(value),
            Header::Int(value) => Value::from(value),
            Header::F32(value) => Value::F32(value),
            Header::F64(value) => Value::F64(value),
            Header::Str(len) => Value::Str(std::str::from_utf8(self.take(len)?)?.to_owned()),
            Header::Bin(len) => Value::Bin(Bytes::copy_from_slice(self.take(len)?)),
            Header::Array(len) => self.nested(|dec| {
                let mut items = Vec::with_capacity(dec.capacity_hint::<Value>(len));
                for _ in 0..len {
                    items.push(dec.read_value()?);
                }
                Ok(Value::Array(items))
            })?,
            Header::Map(len) => self.nested(|dec| {
                let mut entries = Vec::with_capacity(dec.capacity_hint::<(Value, Value)>(len));
                for _ in 0..len {
                    let key = dec.read_value()?;
                    entries.push((key, dec.read_value()?));
                }
                Ok(Value::Map(entries))
            })?,
            Header::Ext(type_code, len) => {
                let payload = self.take(len)?;
                self.ext_value(type_code, payload)?
            }
        };
        Ok(value)
    }

    fn ext_value(&self, type_code: i8, payload: &[u8]) -> Result<Value> {
        if type_code == Timestamp::TYPE_CODE {
            return Ok(Value::Timestamp(Timestamp::from_payload(payload)?));
        }
        let entry = self
            .registry
            .lookup(type_code)
            .ok_or(Error::UnregisteredExtension { type_code })?;
        entry.probe(payload)?;
        Ok(Value::Ext(type_code, Bytes::copy_from_slice(payload)))
    }

    /// Step over the next value without materializing it
    pub fn skip(&mut self) -> Result<()> {
        match self.read_header()? {
            (code, Header::Reserved) => Err(Error::mismatch(code, Kind::Any)),
            (_, Header::Str(len) | Header::Bin(len) | Header::Ext(_, len)) => {
                self.take(len).map(drop)
            }
            (_, Header::Array(len)) => self.nested(|dec| (0..len).try_for_each(|_| dec.skip())),
            (_, Header::Map(len)) => self.nested(|dec| {
                (0..len).try_for_each(|_| {
                    dec.skip()?;
                    dec.skip()
                })
            }),
            _ => Ok(()),
        }
    }
}

macro_rules! decode_integer {
    ($($ty:ty),*) => {$(
        impl Decode for $ty {
            fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
                if dec.try_read_nil()? {
                    *self = 0;
                    return Ok(());
                }
                let value = dec.read_integer()?;
                *self = <$ty>::try_from(value).map_err(|_| Error::IntegerOverflow {
                    value,
                    target: stringify!($ty),
                })?;
                Ok(())
            }
        }
    )*};
}

decode_integer!(u8, u16, u32, u64, usize, i8, i16, i32, i64, isize);

impl Decode for bool {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = !dec.try_read_nil()? && dec.read_bool()?;
        Ok(())
    }
}

impl Decode for f32 {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = if dec.try_read_nil()? { 0.0 } else { dec.read_f32()? };
        Ok(())
    }
}

impl Decode for f64 {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = if dec.try_read_nil()? { 0.0 } else { dec.read_f64()? };
        Ok(())
    }
}

impl Decode for String {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        self.clear();
        if !dec.try_read_nil()? {
            self.push_str(dec.read_str()?);
        }
        Ok(())
    }
}

impl Decode for Bytes {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        *self = if dec.try_read_nil()? {
            Self::new()
        } else {
            Self::copy_from_slice(dec.read_bin()?)
        };
        Ok(())
    }
}

impl Decode for () {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        if dec.try_read_nil()? {
            Ok(())
        } else {
            let code = dec.peek_format()?.as_u8();
            Err(Error::mismatch(code, Kind::Nil))
        }
    }
}

impl<T: Decode + Default> Decode for Vec<T> {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        self.clear();
        if dec.try_read_nil()? {
            return Ok(());
        }
        let len = dec.read_array_len()?;
        self.reserve(dec.capacity_hint::<T>(len));
        dec.nested(|dec| {
            for _ in 0..len {
                let mut item = T::default();
                item.decode(dec)?;
                self.push(item);
            }
            Ok(())
        })
    }
}

impl<T: Decode + Default> Decode for Option<T> {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        if dec.try_read_nil()? {
            *self = None;
            return Ok(());
        }
        self.get_or_insert_with(T::default).decode(dec)
    }
}

impl<T: Decode + ?Sized> Decode for Box<T> {
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        (**self).decode(dec)
    }
}

fn decode_pairs<K, V>(dec: &mut Decoder<'_>, mut insert: impl FnMut(K, V)) -> Result<()>
where
    K: Decode + Default,
    V: Decode + Default,
{
    if dec.try_read_nil()? {
        return Ok(());
    }
    let len = dec.read_map_len()?;
    dec.nested(|dec| {
        for _ in 0..len {
            let mut key = K::default();
            key.decode(dec)?;
            let mut value = V::default();
            value.decode(dec)?;
            insert(key, value);
        }
        Ok(())
    })
}

impl<K, V, S> Decode for HashMap<K, V, S>
where
    K: Decode + Default + Eq + Hash,
    V: Decode + Default,
    S: BuildHasher,
{
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        self.clear();
        decode_pairs::<K, V>(dec, |key, value| {
            self.insert(key, value);
        })
    }
}

impl<K, V> Decode for BTreeMap<K, V>
where
    K: Decode + Default + Ord,
    V: Decode + Default,
{
    fn decode(&mut self, dec: &mut Decoder<'_>) -> Result<()> {
        self.clear();
        decode_pairs::<K, V>(dec, |key, value| {
            self.insert(key, value);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_as<T: Decode + Default>(bytes: &[u8]) -> Result<T> {
        let registry = Registry::new();
        let mut dec = Decoder::new(bytes, &registry);
        let mut value = T::default();
        value.decode(&mut dec)?;
        Ok(value)
    }

    #[test]
    fn test_nil_yields_zero_values() {
        assert_eq!(decode_as::<u32>(&[0xc0]).unwrap(), 0);
        assert_eq!(decode_as::<i8>(&[0xc0]).unwrap(), 0);
        assert!(!decode_as::<bool>(&[0xc0]).unwrap());
        assert_eq!(decode_as::<f64>(&[0xc0]).unwrap(), 0.0);
        assert_eq!(decode_as::<String>(&[0xc0]).unwrap(), "");
        assert!(decode_as::<Vec<u8>>(&[0xc0]).unwrap().is_empty());
        assert_eq!(decode_as::<Option<u8>>(&[0xc0]).unwrap(), None);
        assert_eq!(decode_as::<Value>(&[0xc0]).unwrap(), Value::Nil);
    }

    #[test]
    fn test_non_minimal_integers_decode() {
        assert_eq!(decode_as::<u8>(&[0xcf, 0, 0, 0, 0, 0, 0, 0, 5]).unwrap(), 5);
        assert_eq!(decode_as::<i64>(&[0xd1, 0xff, 0xff]).unwrap(), -1);
        assert_eq!(decode_as::<u16>(&[0xd0, 0x10]).unwrap(), 16);
    }

    #[test]
    fn test_integer_overflow() {
        assert!(matches!(
            decode_as::<u8>(&[0xcd, 0x01, 0x00]),
            Err(Error::IntegerOverflow { value: 256, target: "u8" })
        ));
        assert!(matches!(
            decode_as::<u32>(&[0xff]),
            Err(Error::IntegerOverflow { value: -1, .. })
        ));
    }

    #[test]
    fn test_type_mismatch_reports_code_and_kind() {
        assert!(matches!(
            decode_as::<String>(&[0x05]),
            Err(Error::TypeMismatch { code: 0x05, expected: Kind::Str })
        ));
        assert!(matches!(
            decode_as::<u8>(&[0xa1, b'x']),
            Err(Error::TypeMismatch { code: 0xa1, expected: Kind::Integer })
        ));
        assert!(matches!(
            decode_as::<Value>(&[0xc1]),
            Err(Error::TypeMismatch { code: 0xc1, expected: Kind::Any })
        ));
    }

    #[test]
    fn test_float_widening() {
        assert_eq!(decode_as::<f64>(&[0xca, 0x3f, 0xc0, 0, 0]).unwrap(), 1.5);
        assert_eq!(decode_as::<f32>(&[0x07]).unwrap(), 7.0);
        assert!(decode_as::<f32>(&[0xcb, 0, 0, 0, 0, 0, 0, 0, 0]).is_err());
    }

    #[test]
    fn test_truncated_input_is_out_of_range() {
        let inputs: [&[u8]; 5] = [
            &[0xcd, 0x01],
            &[0xa5, b'a', b'b'],
            &[0xdb, 0xff, 0xff, 0xff, 0xff],
            &[0x92, 0x01],
            &[],
        ];
        for bytes in inputs {
            assert!(
                matches!(decode_as::<Value>(bytes), Err(Error::OutOfRange { .. })),
                "input {bytes:x?}"
            );
        }
    }

    #[test]
    fn test_forged_length_does_not_preallocate() {
        let bytes = [0xdd, 0xff, 0xff, 0xff, 0xff, 0x01];
        let registry = Registry::new();
        let dec = Decoder::new(&bytes, &registry);
        assert_eq!(dec.capacity_hint::<u8>(u32::MAX as usize), 6);
        assert!(decode_as::<Vec<u8>>(&bytes).is_err());
    }

    #[test]
    fn test_capacity_hint_respects_byte_budget() {
        let bytes = vec![0xc0; 4096];
        let registry = Registry::new();
        let dec = Decoder::new(&bytes, &registry);
        assert_eq!(dec.capacity_hint::<[u8; 4096]>(u32::MAX as usize), 256);
        assert_eq!(dec.capacity_hint::<u8>(u32::MAX as usize), 4096);
        assert_eq!(dec.capacity_hint::<()>(10), 10);
        let values = dec.capacity_hint::<Value>(usize::MAX);
        assert!(values * size_of::<Value>() <= MAX_PREALLOC_BYTES);

        let mut forged = vec![0xdd, 0xff, 0xff, 0xff, 0xff];
        forged.resize(1 << 20, 0xc1);
        assert!(decode_as::<Vec<Value>>(&forged).is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut bytes = vec![0x91; 64];
        bytes.push(0xc0);
        let registry = Registry::new();
        let mut dec = Decoder::new(&bytes, &registry).with_max_depth(16);
        assert!(matches!(
            dec.read_value(),
            Err(Error::DepthLimitExceeded { max: 16 })
        ));
        let mut dec = Decoder::new(&bytes, &registry).with_max_depth(16);
        assert!(matches!(dec.skip(), Err(Error::DepthLimitExceeded { .. })));
    }

    #[test]
    fn test_skip_advances_past_value() {
        let bytes = [
            0x82, 0xa1, b'a', 0x92, 0x01, 0xcd, 0x01, 0x00, 0xa1, b'b', 0xd4, 0x05, 0x00, 0x2a,
        ];
        let registry = Registry::new();
        let mut dec = Decoder::new(&bytes, &registry);
        dec.skip().unwrap();
        assert_eq!(dec.position(), 13);
        assert_eq!(dec.read_integer().unwrap(), 42);
        assert_eq!(dec.remaining(), 0);
    }

    #[test]
    fn test_unregistered_ext_in_value() {
        assert!(matches!(
            decode_as::<Value>(&[0xd4, 0x05, 0x00]),
            Err(Error::UnregisteredExtension { type_code: 5 })
        ));
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            decode_as::<String>(&[0xa2, 0xc3, 0x28]),
            Err(Error::InvalidUtf8(_))
        ));
    }

    #[test]
    fn test_maps_decode() {
        let bytes = [0x82, 0xa1, b'a', 0x01, 0xa1, b'b', 0x02];
        let map = decode_as::<BTreeMap<String, u8>>(&bytes).unwrap();
        assert_eq!(map.get("a"), Some(&1));
        let map = decode_as::<HashMap<String, u8>>(&bytes).unwrap();
        assert_eq!(map.get("b"), Some(&2));
    }
}
