//! Packwire - exact-size MessagePack codec
//!
//! This library encodes and decodes the MessagePack wire format. Encoding
//! measures a value first and then writes it into a buffer of exactly that
//! size; decoding is a single bounds-checked pass over untrusted bytes.
//!
//! # Quick Start
//!
//! ```rust
//! use packwire::{Value, StructMode};
//!
//! #[derive(Debug, Default, PartialEq)]
//! pub struct Reading {
//!     pub sensor: String,
//!     pub celsius: f64,
//! }
//!
//! packwire::record!(Reading { pub sensor, pub celsius });
//!
//! let reading = Reading { sensor: "t1".into(), celsius: 21.5 };
//!
//! // Records encode as name-keyed maps by default...
//! let bytes = packwire::encode(&reading)?;
//! let decoded: Reading = packwire::from_slice(&bytes)?;
//! assert_eq!(decoded, reading);
//!
//! // ...or as positional arrays on request.
//! let compact = packwire::encode_with_mode(&reading, StructMode::Array)?;
//! assert!(compact.len() < bytes.len());
//!
//! // Values of unknown shape decode into `Value`.
//! let dynamic: Value = packwire::from_slice(&bytes)?;
//! assert_eq!(dynamic.get("sensor").and_then(Value::as_str), Some("t1"));
//! # Ok::<(), packwire::Error>(())
//! ```
//!
//! # Features
//!
//! - **Canonical-minimal output** - every integer, string, and container uses
//!   the narrowest format that holds it
//! - **Exact allocation** - one measure pass, one emit pass, no regrowth
//! - **Hardened decoding** - truncated input, forged lengths, and deep
//!   nesting return errors
//! - **Extension registry** - user types map to extension type codes; the
//!   timestamp extension is built in
//! - **Record bindings** - `record!` binds struct fields by name or position

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod pack;

pub use pack::{
    Binding, Codec, CodecConfig, Decode, DecodeFieldFn, Decoder, Encode, EncodeFieldFn, Encoder, Error,
    ExtensionType, Field, FieldOption, Format, Kind, MAX_PREALLOC_BYTES, Record, Registry,
    Result, StructMode, TIMESTAMP_TYPE_CODE, Timestamp, Value, binding, decode, decode_record,
    decode_with_mode, encode, encode_record, encode_with_mode, from_slice, register_extension,
    set_struct_mode, struct_mode, unregister_extension,
};

/// Packwire version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
