//! Record (struct) bindings.
//!
//! A [`Record`] declares its fields once; [`binding`] resolves which of them
//! participate and under which wire name, and caches the result per type.
//! Encoding follows the struct mode of the call. Decoding follows the shape
//! found on the wire: a map binds by name, an array binds by position.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use tracing::trace;

use super::config::StructMode;
use super::decode::Decoder;
use super::encode::Encoder;
use super::format::{Format, Kind};
use super::{Error, Result};

/// Writes one field of `T`
pub type EncodeFieldFn<T> = fn(&T, &mut Encoder<'_>) -> Result<()>;
/// Reads one field of `T` in place
pub type DecodeFieldFn<T> = fn(&mut T, &mut Decoder<'_>) -> Result<()>;

/// Per-field wire option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOption {
    /// Use the declared name
    Default,
    /// Use this wire name instead
    Rename(&'static str),
    /// Never encode or decode this field
    Skip,
}

/// Field declaration
pub struct Field<T> {
    name: &'static str,
    exported: bool,
    option: FieldOption,
    encode: EncodeFieldFn<T>,
    decode: DecodeFieldFn<T>,
}

impl<T> Field<T> {
    /// Exported field with its declared name
    #[must_use]
    pub fn new(name: &'static str, encode: EncodeFieldFn<T>, decode: DecodeFieldFn<T>) -> Self {
        Self {
            name,
            exported: true,
            option: FieldOption::Default,
            encode,
            decode,
        }
    }

    /// Mark whether the field is visible outside its type
    #[must_use]
    pub fn exported(mut self, exported: bool) -> Self {
        self.exported = exported;
        self
    }

    /// Apply a wire option
    #[must_use]
    pub fn option(mut self, option: FieldOption) -> Self {
        self.option = option;
        self
    }

    /// Wire name override
    #[must_use]
    pub fn rename(self, wire_name: &'static str) -> Self {
        self.option(FieldOption::Rename(wire_name))
    }

    /// Exclude from the wire
    #[must_use]
    pub fn skip(self) -> Self {
        self.option(FieldOption::Skip)
    }

    /// Declared name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Participates on the wire when exported and not skipped
    #[must_use]
    pub fn participates(&self) -> bool {
        self.exported && self.option != FieldOption::Skip
    }

    /// Wire name: the rename if present, else the declared name
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self.option {
            FieldOption::Rename(name) => name,
            FieldOption::Default | FieldOption::Skip => self.name,
        }
    }
}

/// A struct with a declared field layout
///
/// Usually implemented through [`record!`](crate::record).
pub trait Record: Default + Sized + 'static {
    /// Fields in declaration order
    fn fields() -> Vec<Field<Self>>;
}

struct BoundField<T> {
    wire_name: &'static str,
    encode: EncodeFieldFn<T>,
    decode: DecodeFieldFn<T>,
}

/// Resolved field table of a record type
pub struct Binding<T> {
    fields: Vec<BoundField<T>>,
    by_name: HashMap<&'static str, usize>,
}

impl<T: Record> Binding<T> {
    fn build() -> Self {
        let fields: Vec<BoundField<T>> = T::fields()
            .into_iter()
            .filter(Field::participates)
            .map(|field| BoundField {
                wire_name: field.wire_name(),
                encode: field.encode,
                decode: field.decode,
            })
            .collect();
        let by_name = fields
            .iter()
            .enumerate()
            .map(|(index, field)| (field.wire_name, index))
            .collect();
        Self { fields, by_name }
    }

    /// Number of participating fields
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check for a record with no participating fields
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Wire names in positional order
    pub fn wire_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.wire_name)
    }

    /// Position of a wire name
    #[must_use]
    pub fn index_of(&self, wire_name: &str) -> Option<usize> {
        self.by_name.get(wire_name).copied()
    }
}

type CacheMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

static BINDINGS: LazyLock<RwLock<CacheMap>> = LazyLock::new(RwLock::default);

/// Cached binding for `T`, built on first use
#[must_use]
pub fn binding<T: Record>() -> Arc<Binding<T>> {
    let type_id = TypeId::of::<T>();
    let cached = BINDINGS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&type_id)
        .cloned();
    let erased = match cached {
        Some(erased) => erased,
        None => {
            let mut cache = BINDINGS.write().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(cache.entry(type_id).or_insert_with(|| {
                trace!(record = type_name::<T>(), "building record binding");
                Arc::new(Binding::<T>::build()) as Arc<dyn Any + Send + Sync>
            }))
        }
    };
    match erased.downcast::<Binding<T>>() {
        Ok(binding) => binding,
        // TypeId keys make a foreign entry impossible; rebuild rather than panic.
        Err(_) => Arc::new(Binding::build()),
    }
}

/// Encode a record in the call's struct mode
pub fn encode_record<T: Record>(value: &T, enc: &mut Encoder<'_>) -> Result<()> {
    let binding = binding::<T>();
    match enc.struct_mode() {
        StructMode::Map => {
            enc.write_map_len(binding.len())?;
            for field in &binding.fields {
                enc.write_str(field.wire_name)?;
                (field.encode)(value, enc)?;
            }
        }
        StructMode::Array => {
            enc.write_array_len(binding.len())?;
            for field in &binding.fields {
                (field.encode)(value, enc)?;
            }
        }
    }
    Ok(())
}

/// Decode a record from either a map or an array, whichever is on the wire
///
/// Fields missing from the input keep their current value; unknown keys and
/// surplus positions are skipped.
pub fn decode_record<T: Record>(value: &mut T, dec: &mut Decoder<'_>) -> Result<()> {
    let format = dec.peek_format()?;
    match format.kind() {
        Kind::Nil => {
            dec.try_read_nil()?;
            *value = T::default();
            Ok(())
        }
        Kind::Map => {
            let len = dec.read_map_len()?;
            let binding = binding::<T>();
            dec.nested(|dec| {
                for _ in 0..len {
                    let key = dec.read_str()?;
                    match binding.index_of(key) {
                        Some(index) => (binding.fields[index].decode)(value, dec)?,
                        None => {
                            trace!(record = type_name::<T>(), key, "skipping unknown field");
                            dec.skip()?;
                        }
                    }
                }
                Ok(())
            })
        }
        Kind::Array => {
            let len = dec.read_array_len()?;
            let binding = binding::<T>();
            dec.nested(|dec| {
                for index in 0..len {
                    match binding.fields.get(index) {
                        Some(field) => (field.decode)(value, dec)?,
                        None => dec.skip()?,
                    }
                }
                Ok(())
            })
        }
        _ => Err(Error::mismatch(Format::as_u8(format), Kind::Record)),
    }
}

/// Implement [`Record`], [`Encode`](crate::Encode) and
/// [`Decode`](crate::Decode) for a struct.
///
/// Fields without a visibility qualifier are not exported and stay off the
/// wire. `=> "name"` renames a field; `=> skip` excludes it.
///
/// ```
/// #[derive(Debug, Default, PartialEq)]
/// pub struct Account {
///     pub id: u64,
///     pub owner: String,
///     session: u32,
/// }
///
/// packwire::record!(Account {
///     pub id => "account_id",
///     pub owner,
///     session,
/// });
///
/// let account = Account { id: 7, owner: "ada".into(), session: 99 };
/// let bytes = packwire::encode(&account)?;
/// let decoded: Account = packwire::from_slice(&bytes)?;
/// assert_eq!(decoded, Account { session: 0, ..account });
/// # Ok::<(), packwire::Error>(())
/// ```
#[macro_export]
macro_rules! record {
    ($ty:ty { $($vis:vis $field:ident $(=> $opt:tt)?),* $(,)? }) => {
        impl $crate::Record for $ty {
            fn fields() -> ::std::vec::Vec<$crate::Field<Self>> {
                ::std::vec![$(
                    $crate::Field::<$ty>::new(
                        ::core::stringify!($field),
                        |record: &$ty, enc| $crate::Encode::encode(&record.$field, enc),
                        |record: &mut $ty, dec| $crate::Decode::decode(&mut record.$field, dec),
                    )
                    .exported(!::core::stringify!($vis).is_empty())
                    $(.option($crate::__record_field_option!($opt)))?
                ),*]
            }
        }

        impl $crate::Encode for $ty {
            fn encode(&self, enc: &mut $crate::Encoder<'_>) -> $crate::Result<()> {
                $crate::encode_record(self, enc)
            }
        }

        impl $crate::Decode for $ty {
            fn decode(&mut self, dec: &mut $crate::Decoder<'_>) -> $crate::Result<()> {
                $crate::decode_record(self, dec)
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __record_field_option {
    (skip) => {
        $crate::FieldOption::Skip
    };
    ($name:literal) => {
        $crate::FieldOption::Rename($name)
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Decode, Encode, Registry};

    #[derive(Debug, Default, PartialEq)]
    struct Point {
        pub x: i32,
        pub y: i32,
        pub label: String,
        scratch: u8,
        pub cached: u64,
    }

    crate::record!(Point {
        pub x,
        pub y,
        pub label => "name",
        scratch,
        pub cached => skip,
    });

    fn encode_with(value: &Point, mode: StructMode) -> Vec<u8> {
        Encoder::encode_to_vec(value, &Registry::new(), mode).unwrap()
    }

    fn decode_bytes(bytes: &[u8]) -> Result<Point> {
        let registry = Registry::new();
        let mut dec = Decoder::new(bytes, &registry);
        let mut point = Point::default();
        point.decode(&mut dec)?;
        Ok(point)
    }

    fn sample() -> Point {
        Point {
            x: 1,
            y: -2,
            label: "p".into(),
            scratch: 9,
            cached: 77,
        }
    }

    #[test]
    fn test_binding_visibility_and_rename() {
        let binding = binding::<Point>();
        assert_eq!(binding.wire_names().collect::<Vec<_>>(), ["x", "y", "name"]);
        assert_eq!(binding.index_of("name"), Some(2));
        assert_eq!(binding.index_of("label"), None);
        assert!(Arc::ptr_eq(&binding, &super::binding::<Point>()));
    }

    #[test]
    fn test_map_mode_layout() {
        let bytes = encode_with(&sample(), StructMode::Map);
        assert_eq!(
            bytes,
            [
                0x83, 0xa1, b'x', 0x01, 0xa1, b'y', 0xfe, 0xa4, b'n', b'a', b'm', b'e', 0xa1,
                b'p'
            ]
        );
    }

    #[test]
    fn test_array_mode_layout() {
        let bytes = encode_with(&sample(), StructMode::Array);
        assert_eq!(bytes, [0x93, 0x01, 0xfe, 0xa1, b'p']);
    }

    #[test]
    fn test_both_modes_decode_without_being_told() {
        let expected = Point {
            scratch: 0,
            cached: 0,
            ..sample()
        };
        for mode in [StructMode::Map, StructMode::Array] {
            let bytes = encode_with(&sample(), mode);
            assert_eq!(decode_bytes(&bytes).unwrap(), expected, "mode {mode}");
        }
    }

    #[test]
    fn test_unknown_keys_and_extra_positions_skipped() {
        let map = [
            0x83, 0xa5, b'e', b'x', b't', b'r', b'a', 0x92, 0x01, 0x02, 0xa1, b'y', 0x05, 0xa1,
            b'x', 0x03,
        ];
        let point = decode_bytes(&map).unwrap();
        assert_eq!((point.x, point.y), (3, 5));

        let array = [0x94, 0x01, 0x02, 0xa0, 0xc3];
        let point = decode_bytes(&array).unwrap();
        assert_eq!((point.x, point.y), (1, 2));
    }

    #[test]
    fn test_nil_resets_record() {
        assert_eq!(decode_bytes(&[0xc0]).unwrap(), Point::default());
    }

    #[test]
    fn test_non_container_is_mismatch() {
        assert!(matches!(
            decode_bytes(&[0x2a]),
            Err(Error::TypeMismatch {
                code: 0x2a,
                expected: Kind::Record
            })
        ));
    }

    #[test]
    fn test_manual_field_declarations() {
        #[derive(Default)]
        struct Manual {
            a: u8,
        }
        impl Record for Manual {
            fn fields() -> Vec<Field<Self>> {
                vec![
                    Field::new("a", |m: &Self, enc| m.a.encode(enc), |m: &mut Self, dec| {
                        m.a.decode(dec)
                    })
                    .rename("A"),
                ]
            }
        }
        struct Wrap<'a>(&'a Manual);
        impl Encode for Wrap<'_> {
            fn encode(&self, enc: &mut Encoder<'_>) -> Result<()> {
                encode_record(self.0, enc)
            }
        }

        let binding = binding::<Manual>();
        assert_eq!(binding.wire_names().collect::<Vec<_>>(), ["A"]);
        let bytes =
            Encoder::encode_to_vec(&Wrap(&Manual { a: 4 }), &Registry::new(), StructMode::Map)
                .unwrap();
        assert_eq!(bytes, [0x81, 0xa1, b'A', 0x04]);
    }
}
