//! Encode/decode entry points
//!
//! The free functions use [`Registry::global`] and the process-wide struct
//! mode. [`Codec`] binds an explicit registry and configuration instead.

use super::config::{CodecConfig, StructMode};
use super::decode::{Decode, Decoder};
use super::encode::{Encode, Encoder};
use super::ext::Registry;
use super::Result;

/// Codec bound to one registry and configuration
#[derive(Debug, Clone)]
pub struct Codec<'r> {
    registry: &'r Registry,
    config: CodecConfig,
}

impl<'r> Codec<'r> {
    /// Codec over `registry` with default configuration
    #[must_use]
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            config: CodecConfig::default(),
        }
    }

    /// Replace the configuration
    #[must_use]
    pub fn with_config(mut self, config: CodecConfig) -> Self {
        self.config = config;
        self
    }

    /// Force a struct mode for every call on this codec
    #[must_use]
    pub fn with_struct_mode(mut self, mode: StructMode) -> Self {
        self.config.struct_mode = Some(mode);
        self
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Exact encoded size of `value`
    pub fn encoded_len<T: Encode + ?Sized>(&self, value: &T) -> Result<usize> {
        Encoder::encoded_len(value, self.registry, self.config.resolved_struct_mode())
    }

    /// Encode `value` into a buffer of exactly the required size
    ///
    /// # Errors
    ///
    /// Returns an error if a length exceeds the format's 32-bit limit or an
    /// extension value is not registered.
    pub fn encode<T: Encode + ?Sized>(&self, value: &T) -> Result<Vec<u8>> {
        Encoder::encode_to_vec(value, self.registry, self.config.resolved_struct_mode())
    }

    /// Fill `dest` from `bytes`. On error `dest` may be partially written.
    ///
    /// # Errors
    ///
    /// Returns an error if `bytes` is truncated, malformed, or does not fit
    /// the shape of `dest`.
    pub fn decode<T: Decode + ?Sized>(&self, bytes: &[u8], dest: &mut T) -> Result<()> {
        let mut dec = Decoder::new(bytes, self.registry)
            .with_struct_mode(self.config.resolved_struct_mode())
            .with_max_depth(self.config.max_depth);
        dest.decode(&mut dec)
    }

    /// Decode into a fresh `T`
    pub fn from_slice<T: Decode + Default>(&self, bytes: &[u8]) -> Result<T> {
        let mut value = T::default();
        self.decode(bytes, &mut value)?;
        Ok(value)
    }
}

impl Default for Codec<'static> {
    fn default() -> Self {
        Self::new(Registry::global())
    }
}

/// Encode with the global registry and struct mode
pub fn encode<T: Encode + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Codec::default().encode(value)
}

/// Encode with the global registry, forcing `mode` for this call
pub fn encode_with_mode<T: Encode + ?Sized>(value: &T, mode: StructMode) -> Result<Vec<u8>> {
    Codec::default().with_struct_mode(mode).encode(value)
}

/// Decode into `dest` with the global registry
pub fn decode<T: Decode + ?Sized>(bytes: &[u8], dest: &mut T) -> Result<()> {
    Codec::default().decode(bytes, dest)
}

/// Decode into `dest`, reporting `mode` to custom [`Decode`] impls.
/// Records detect map or array layout from the input either way.
pub fn decode_with_mode<T: Decode + ?Sized>(
    bytes: &[u8],
    dest: &mut T,
    mode: StructMode,
) -> Result<()> {
    Codec::default().with_struct_mode(mode).decode(bytes, dest)
}

/// Decode a fresh `T` with the global registry
pub fn from_slice<T: Decode + Default>(bytes: &[u8]) -> Result<T> {
    Codec::default().from_slice(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, Value};

    #[test]
    fn test_encoded_len_matches_output() {
        let codec = Codec::new(Registry::global());
        let value = Value::Array(vec![Value::from("abc"), Value::from(-300i64)]);
        let bytes = codec.encode(&value).unwrap();
        assert_eq!(codec.encoded_len(&value).unwrap(), bytes.len());
    }

    #[test]
    fn test_config_depth_applies() {
        let registry = Registry::new();
        let codec = Codec::new(&registry).with_config(CodecConfig {
            max_depth: 2,
            ..CodecConfig::default()
        });
        let bytes = [0x91, 0x91, 0x91, 0xc0];
        let mut value = Value::Nil;
        assert!(matches!(
            codec.decode(&bytes, &mut value),
            Err(Error::DepthLimitExceeded { max: 2 })
        ));
        assert!(codec.decode(&bytes[1..], &mut value).is_ok());
    }

    #[test]
    fn test_free_functions_roundtrip() {
        let bytes = encode(&vec![1u16, 500]).unwrap();
        assert_eq!(bytes, [0x92, 0x01, 0xcd, 0x01, 0xf4]);
        let back: Vec<u16> = from_slice(&bytes).unwrap();
        assert_eq!(back, [1, 500]);
    }
}
