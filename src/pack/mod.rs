//! MessagePack codec core
//!
//! This module provides the format table, the two-pass encoder, the decoder,
//! the extension registry, and record bindings.

mod codec;
mod config;
pub mod cursor;
mod decode;
mod encode;
mod error;
mod ext;
pub mod format;
mod record;
mod timestamp;
mod value;

pub use codec::{Codec, decode, decode_with_mode, encode, encode_with_mode, from_slice};
pub use config::{CodecConfig, DEFAULT_MAX_DEPTH, StructMode, set_struct_mode, struct_mode};
pub use decode::{Decode, Decoder, MAX_PREALLOC_BYTES};
pub use encode::{Encode, Encoder};
pub use error::{Error, Result};
pub use ext::{ExtensionType, Registry, register_extension, unregister_extension};
pub use format::{Format, Kind};
pub use record::{
    Binding, DecodeFieldFn, EncodeFieldFn, Field, FieldOption, Record, binding, decode_record,
    encode_record,
};
pub use timestamp::Timestamp;
pub use value::Value;

/// Extension type code reserved for the built-in timestamp
pub const TIMESTAMP_TYPE_CODE: i8 = <Timestamp as ExtensionType>::TYPE_CODE;
