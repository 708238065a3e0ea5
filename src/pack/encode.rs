//! Two-pass encoder.
//!
//! A single traversal ([`Encoder`]) runs twice over the same value: first in
//! a measuring pass that only advances the offset, then in an emitting pass
//! that writes into a buffer of exactly the measured size. Every format
//! decision lives in the shared `write_*` methods, so both passes pick the
//! same format code for every value.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

use bytes::Bytes;

use super::config::StructMode;
use super::cursor;
use super::ext::{ExtensionType, Registry};
use super::format::{
    ARRAY16, ARRAY32, BIN8, BIN16, BIN32, EXT8, EXT16, EXT32, FALSE, FIXARRAY,
    FIXCONTAINER_MAX_LEN, FIXEXT1, FIXEXT2, FIXEXT4, FIXEXT8, FIXEXT16, FIXMAP, FIXSTR,
    FIXSTR_MAX_LEN, FLOAT32, FLOAT64, INT8, INT16, INT32, INT64, MAP16, MAP32,
    NEGATIVE_FIXINT_MIN, NIL, POSITIVE_FIXINT_MAX, STR8, STR16, STR32, TRUE, UINT8, UINT16,
    UINT32, UINT64,
};
use super::timestamp::Timestamp;
use super::{Error, Result};

/// Values that can be written as MessagePack
pub trait Encode {
    /// Write `self` through the encoder
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()>;
}

enum Pass<'a> {
    Measure,
    Emit(&'a mut [u8]),
}

/// Shared measure/emit traversal state
pub struct Encoder<'a> {
    pass: Pass<'a>,
    offset: usize,
    registry: &'a Registry,
    mode: StructMode,
}

impl<'a> Encoder<'a> {
    fn measure(registry: &'a Registry, mode: StructMode) -> Self {
        Self {
            pass: Pass::Measure,
            offset: 0,
            registry,
            mode,
        }
    }

    fn emit(buf: &'a mut [u8], registry: &'a Registry, mode: StructMode) -> Self {
        Self {
            pass: Pass::Emit(buf),
            offset: 0,
            registry,
            mode,
        }
    }

    /// Exact encoded size of `value`, without writing anything
    pub fn encoded_len<T: Encode + ?Sized>(
        value: &T,
        registry: &Registry,
        mode: StructMode,
    ) -> Result<usize> {
        let mut enc = Encoder::measure(registry, mode);
        value.encode(&mut enc)?;
        Ok(enc.offset)
    }

    /// Measure, allocate exactly, then emit
    pub fn encode_to_vec<T: Encode + ?Sized>(
        value: &T,
        registry: &Registry,
        mode: StructMode,
    ) -> Result<Vec<u8>> {
        let size = Self::encoded_len(value, registry, mode)?;
        let mut buf = vec![0u8; size];
        let mut enc = Encoder::emit(&mut buf, registry, mode);
        value.encode(&mut enc)?;
        debug_assert_eq!(enc.offset, size, "measure and emit passes disagree");
        Ok(buf)
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

    /// Bytes measured or written so far
    #[must_use]
    pub const fn position(&self) -> usize {
        self.offset
    }

    fn put_u8(&mut self, value: u8) {
        self.offset = match &mut self.pass {
            Pass::Measure => self.offset + 1,
            Pass::Emit(buf) => cursor::write_u8(buf, self.offset, value),
        };
    }

    fn put_u16(&mut self, value: u16) {
        self.offset = match &mut self.pass {
            Pass::Measure => self.offset + 2,
            Pass::Emit(buf) => cursor::write_u16(buf, self.offset, value),
        };
    }

    fn put_u32(&mut self, value: u32) {
        self.offset = match &mut self.pass {
            Pass::Measure => self.offset + 4,
            Pass::Emit(buf) => cursor::write_u32(buf, self.offset, value),
        };
    }

    fn put_u64(&mut self, value: u64) {
        self.offset = match &mut self.pass {
            Pass::Measure => self.offset + 8,
            Pass::Emit(buf) => cursor::write_u64(buf, self.offset, value),
        };
    }

    fn put_bytes(&mut self, bytes: &[u8]) {
        self.offset = match &mut self.pass {
            Pass::Measure => self.offset + bytes.len(),
            Pass::Emit(buf) => cursor::write_bytes(buf, self.offset, bytes),
        };
    }

    /// Write a code byte followed by a length in the narrowest of the three
    /// prefix widths.
    #[allow(clippy::cast_possible_truncation)]
    fn put_len_prefixed(&mut self, len: usize, codes: [u8; 3], what: &str) -> Result<()> {
        if len <= usize::from(u8::MAX) && codes[0] != 0 {
            self.put_u8(codes[0]);
            self.put_u8(len as u8);
        } else if len <= usize::from(u16::MAX) {
            self.put_u8(codes[1]);
            self.put_u16(len as u16);
        } else if let Ok(len) = u32::try_from(len) {
            self.put_u8(codes[2]);
            self.put_u32(len);
        } else {
            return Err(Error::invalid_argument(format!(
                "{what} length {len} exceeds the 32-bit limit"
            )));
        }
        Ok(())
    }

    /// Nil
    pub fn write_nil(&mut self) -> Result<()> {
        self.put_u8(NIL);
        Ok(())
    }

    /// Boolean
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.put_u8(if value { TRUE } else { FALSE });
        Ok(())
    }

    /// Unsigned integer in its narrowest form
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        if value <= u64::from(POSITIVE_FIXINT_MAX) {
            self.put_u8(value as u8);
        } else if value <= u64::from(u8::MAX) {
            self.put_u8(UINT8);
            self.put_u8(value as u8);
        } else if value <= u64::from(u16::MAX) {
            self.put_u8(UINT16);
            self.put_u16(value as u16);
        } else if value <= u64::from(u32::MAX) {
            self.put_u8(UINT32);
            self.put_u32(value as u32);
        } else {
            self.put_u8(UINT64);
            self.put_u64(value);
        }
        Ok(())
    }

    /// Signed integer in its narrowest form; non-negative values use the
    /// unsigned encodings.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        if value >= 0 {
            return self.write_u64(value as u64);
        }
        if value >= NEGATIVE_FIXINT_MIN {
            self.put_u8(value as i8 as u8);
        } else if value >= i64::from(i8::MIN) {
            self.put_u8(INT8);
            self.put_u8(value as i8 as u8);
        } else if value >= i64::from(i16::MIN) {
            self.put_u8(INT16);
            self.put_u16(value as i16 as u16);
        } else if value >= i64::from(i32::MIN) {
            self.put_u8(INT32);
            self.put_u32(value as i32 as u32);
        } else {
            self.put_u8(INT64);
            self.put_u64(value as u64);
        }
        Ok(())
    }

    /// Single precision float, never widened
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.put_u8(FLOAT32);
        self.put_u32(value.to_bits());
        Ok(())
    }

    /// Double precision float, never narrowed
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.put_u8(FLOAT64);
        self.put_u64(value.to_bits());
        Ok(())
    }

    /// String header for `len` UTF-8 bytes
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_str_len(&mut self, len: usize) -> Result<()> {
        if len <= FIXSTR_MAX_LEN {
            self.put_u8(FIXSTR | len as u8);
            Ok(())
        } else {
            self.put_len_prefixed(len, [STR8, STR16, STR32], "string")
        }
    }

    /// UTF-8 string
    pub fn write_str(&mut self, value: &str) -> Result<()> {
        self.write_str_len(value.len())?;
        self.put_bytes(value.as_bytes());
        Ok(())
    }

    /// Binary blob
    pub fn write_bin(&mut self, value: &[u8]) -> Result<()> {
        self.put_len_prefixed(value.len(), [BIN8, BIN16, BIN32], "binary")?;
        self.put_bytes(value);
        Ok(())
    }

    /// Array header; `len` values must follow
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_array_len(&mut self, len: usize) -> Result<()> {
        if len <= FIXCONTAINER_MAX_LEN {
            self.put_u8(FIXARRAY | len as u8);
            Ok(())
        } else {
            self.put_len_prefixed(len, [0, ARRAY16, ARRAY32], "array")
        }
    }

    /// Map header; `len` key/value pairs must follow
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_map_len(&mut self, len: usize) -> Result<()> {
        if len <= FIXCONTAINER_MAX_LEN {
            self.put_u8(FIXMAP | len as u8);
            Ok(())
        } else {
            self.put_len_prefixed(len, [0, MAP16, MAP32], "map")
        }
    }

    /// Extension header: fixext for 1/2/4/8/16-byte payloads, else ext8/16/32
    #[allow(clippy::cast_sign_loss)]
    pub fn write_ext_header(&mut self, type_code: i8, len: usize) -> Result<()> {
        let fixed = match len {
            1 => Some(FIXEXT1),
            2 => Some(FIXEXT2),
            4 => Some(FIXEXT4),
            8 => Some(FIXEXT8),
            16 => Some(FIXEXT16),
            _ => None,
        };
        match fixed {
            Some(code) => self.put_u8(code),
            None => self.put_len_prefixed(len, [EXT8, EXT16, EXT32], "extension")?,
        }
        self.put_u8(type_code as u8);
        Ok(())
    }

    /// Raw extension with an explicit type code. The code must be registered
    /// and its decoder must accept `payload`. Timestamps go through
    /// [`Timestamp`](super::Timestamp) instead.
    pub fn write_ext(&mut self, type_code: i8, payload: &[u8]) -> Result<()> {
        if type_code == Timestamp::TYPE_CODE {
            return Err(Error::invalid_argument(
                "raw extension payloads cannot use the timestamp type code; encode a Timestamp",
            ));
        }
        let entry = self
            .registry
            .lookup(type_code)
            .ok_or(Error::UnregisteredExtension { type_code })?;
        // an emitting pass only ever follows a successful measuring pass
        if matches!(self.pass, Pass::Measure) {
            entry.probe(payload)?;
        }
        self.write_ext_header(type_code, payload.len())?;
        self.put_bytes(payload);
        Ok(())
    }

    /// Value of a registered extension type. The measuring pass only asks for
    /// the payload length; the emitting pass hands the type its exact slice.
    pub fn write_extension<T: ExtensionType>(&mut self, value: &T) -> Result<()> {
        if !self.registry.is_registered::<T>() {
            return Err(Error::UnregisteredExtensionType {
                type_name: std::any::type_name::<T>(),
            });
        }
        let len = value.payload_len();
        self.write_ext_header(T::TYPE_CODE, len)?;
        let end = self.offset + len;
        if let Pass::Emit(buf) = &mut self.pass {
            value.write_payload(&mut buf[self.offset..end]);
        }
        self.offset = end;
        Ok(())
    }
}

macro_rules! encode_unsigned {
    ($($ty:ty),*) => {$(
        impl Encode for $ty {
            fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
                enc.write_u64(u64::from(*self))
            }
        }
    )*};
}

macro_rules! encode_signed {
    ($($ty:ty),*) => {$(
        impl Encode for $ty {
            fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
                enc.write_i64(i64::from(*self))
            }
        }
    )*};
}

encode_unsigned!(u8, u16, u32, u64);
encode_signed!(i8, i16, i32, i64);

impl Encode for usize {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_u64(*self as u64)
    }
}

impl Encode for isize {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_i64(*self as i64)
    }
}

impl Encode for bool {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_bool(*self)
    }
}

impl Encode for f32 {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_f32(*self)
    }
}

impl Encode for f64 {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_f64(*self)
    }
}

impl Encode for str {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_str(self)
    }
}

impl Encode for String {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_str(self)
    }
}

impl Encode for Bytes {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_bin(self)
    }
}

impl Encode for () {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_nil()
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_array_len(self.len())?;
        self.iter().try_for_each(|item| item.encode(enc))
    }
}

impl<T: Encode, const N: usize> Encode for [T; N] {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        self.as_slice().encode(enc)
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        self.as_slice().encode(enc)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        match self {
            Some(value) => value.encode(enc),
            None => enc.write_nil(),
        }
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(enc)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        (**self).encode(enc)
    }
}

impl<K: Encode, V: Encode, S: BuildHasher> Encode for HashMap<K, V, S> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_map_len(self.len())?;
        for (key, value) in self {
            key.encode(enc)?;
            value.encode(enc)?;
        }
        Ok(())
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
        enc.write_map_len(self.len())?;
        for (key, value) in self {
            key.encode(enc)?;
            value.encode(enc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bytes_of<T: Encode + ?Sized>(value: &T) -> Vec<u8> {
        Encoder::encode_to_vec(value, &Registry::new(), StructMode::Map).unwrap()
    }

    #[test]
    fn test_concrete_examples() {
        assert_eq!(bytes_of(&255u64), [0xcc, 0xff]);
        assert_eq!(bytes_of(""), [0xa0]);
        assert_eq!(bytes_of(&()), [0xc0]);
        assert_eq!(bytes_of(&Option::<u8>::None), [0xc0]);
        assert_eq!(bytes_of(&true), [0xc3]);
        assert_eq!(bytes_of(&false), [0xc2]);
    }

    #[test]
    fn test_unsigned_boundaries() {
        let cases: [(u64, &[u8]); 9] = [
            (0, &[0x00]),
            (127, &[0x7f]),
            (128, &[0xcc, 0x80]),
            (255, &[0xcc, 0xff]),
            (256, &[0xcd, 0x01, 0x00]),
            (65_535, &[0xcd, 0xff, 0xff]),
            (65_536, &[0xce, 0x00, 0x01, 0x00, 0x00]),
            (u64::from(u32::MAX), &[0xce, 0xff, 0xff, 0xff, 0xff]),
            (
                u64::from(u32::MAX) + 1,
                &[0xcf, 0, 0, 0, 1, 0, 0, 0, 0],
            ),
        ];
        for (value, expected) in cases {
            assert_eq!(bytes_of(&value), expected, "value {value}");
        }
    }

    #[test]
    fn test_signed_boundaries() {
        let cases: [(i64, &[u8]); 9] = [
            (-1, &[0xff]),
            (-32, &[0xe0]),
            (-33, &[0xd0, 0xdf]),
            (-128, &[0xd0, 0x80]),
            (-129, &[0xd1, 0xff, 0x7f]),
            (-32_768, &[0xd1, 0x80, 0x00]),
            (-32_769, &[0xd2, 0xff, 0xff, 0x7f, 0xff]),
            (i64::from(i32::MIN) - 1, &[0xd3, 0xff, 0xff, 0xff, 0xff, 0x7f, 0xff, 0xff, 0xff]),
            (127, &[0x7f]),
        ];
        for (value, expected) in cases {
            assert_eq!(bytes_of(&value), expected, "value {value}");
        }
    }

    #[test]
    fn test_floats_keep_declared_width() {
        assert_eq!(bytes_of(&1.5f32), [0xca, 0x3f, 0xc0, 0x00, 0x00]);
        assert_eq!(
            bytes_of(&1.5f64),
            [0xcb, 0x3f, 0xf8, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_string_length_classes() {
        let cases = [
            (0usize, 1usize),
            (31, 1),
            (32, 2),
            (255, 2),
            (256, 3),
            (65_535, 3),
            (65_536, 5),
        ];
        for (len, header) in cases {
            let s = "x".repeat(len);
            let encoded = bytes_of(s.as_str());
            assert_eq!(encoded.len(), header + len, "len {len}");
        }
        assert_eq!(bytes_of("x".repeat(32).as_str())[0], STR8);
        assert_eq!(bytes_of("x".repeat(256).as_str())[0], STR16);
    }

    #[test]
    fn test_bin_never_uses_fixed_form() {
        assert_eq!(bytes_of(&Bytes::new()), [0xc4, 0x00]);
        assert_eq!(bytes_of(&Bytes::from_static(b"ab")), [0xc4, 0x02, b'a', b'b']);
    }

    #[test]
    fn test_container_headers() {
        assert_eq!(bytes_of(&vec![1u8, 2, 3]), [0x93, 1, 2, 3]);
        let sixteen = vec![0u8; 16];
        assert_eq!(&bytes_of(&sixteen)[..3], &[0xdc, 0x00, 0x10]);
        let mut map = BTreeMap::new();
        map.insert("a".to_string(), 1u8);
        assert_eq!(bytes_of(&map), [0x81, 0xa1, b'a', 0x01]);
    }

    #[test]
    fn test_ext_header_forms() {
        let registry = Registry::new();
        let mut enc = Encoder::measure(&registry, StructMode::Map);
        enc.write_ext_header(5, 4).unwrap();
        assert_eq!(enc.position(), 2);
        enc.write_ext_header(5, 3).unwrap();
        assert_eq!(enc.position(), 5);
        enc.write_ext_header(5, 300).unwrap();
        assert_eq!(enc.position(), 9);
    }

    #[test]
    fn test_raw_ext_requires_registration() {
        struct Raw;
        impl Encode for Raw {
            fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
                enc.write_ext(42, &[1, 2, 3])
            }
        }
        let result = Encoder::encode_to_vec(&Raw, &Registry::new(), StructMode::Map);
        assert!(matches!(
            result,
            Err(Error::UnregisteredExtension { type_code: 42 })
        ));
    }

    #[test]
    fn test_raw_ext_payload_checked_by_registered_decoder() {
        struct Pair([u8; 2]);
        impl ExtensionType for Pair {
            const TYPE_CODE: i8 = 42;
            fn payload_len(&self) -> usize {
                2
            }
            fn write_payload(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.0);
            }
            fn from_payload(payload: &[u8]) -> Result<Self> {
                let pair = payload
                    .try_into()
                    .map_err(|_| Error::malformed(Self::TYPE_CODE, "expected 2 bytes"))?;
                Ok(Self(pair))
            }
        }
        struct Raw(i8, &'static [u8]);
        impl Encode for Raw {
            fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
                enc.write_ext(self.0, self.1)
            }
        }

        let registry = Registry::new();
        registry.register::<Pair>().unwrap();
        assert_eq!(
            Encoder::encode_to_vec(&Raw(42, &[1, 2]), &registry, StructMode::Map).unwrap(),
            [0xd5, 42, 1, 2]
        );
        assert!(matches!(
            Encoder::encode_to_vec(&Raw(42, &[1, 2, 3]), &registry, StructMode::Map),
            Err(Error::MalformedExtensionPayload { type_code: 42, .. })
        ));
        assert!(matches!(
            Encoder::encoded_len(&Raw(-1, &[0, 0, 0, 1]), &registry, StructMode::Map),
            Err(Error::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_measure_matches_emit() {
        let registry = Registry::new();
        let value = vec![
            vec!["a".repeat(40), String::new()],
            vec!["b".repeat(300)],
        ];
        let len = Encoder::encoded_len(&value, &registry, StructMode::Map).unwrap();
        let bytes = Encoder::encode_to_vec(&value, &registry, StructMode::Map).unwrap();
        assert_eq!(len, bytes.len());
    }
}
