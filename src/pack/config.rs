//! Codec configuration and the process-wide struct mode.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Default maximum container nesting accepted by the decoder
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// How records are laid out on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum StructMode {
    /// Map of wire name to value
    #[default]
    Map = 0,
    /// Array of values in declared field order
    Array = 1,
}

impl StructMode {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Array,
            _ => Self::Map,
        }
    }
}

impl fmt::Display for StructMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map => write!(f, "map"),
            Self::Array => write!(f, "array"),
        }
    }
}

static STRUCT_MODE: AtomicU8 = AtomicU8::new(StructMode::Map as u8);

/// Select the struct mode used by calls that do not force one
pub fn set_struct_mode(mode: StructMode) {
    STRUCT_MODE.store(mode as u8, Ordering::Release);
}

/// Struct mode currently selected process-wide
#[must_use]
pub fn struct_mode() -> StructMode {
    StructMode::from_u8(STRUCT_MODE.load(Ordering::Acquire))
}

/// Per-codec options
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CodecConfig {
    /// Forced struct mode; `None` follows [`struct_mode()`].
    pub struct_mode: Option<StructMode>,
    /// Maximum container nesting accepted when decoding.
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            struct_mode: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl CodecConfig {
    /// Struct mode this configuration resolves to right now
    #[must_use]
    pub fn resolved_struct_mode(&self) -> StructMode {
        self.struct_mode.unwrap_or_else(struct_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forced_mode_wins() {
        let config = CodecConfig {
            struct_mode: Some(StructMode::Array),
            ..CodecConfig::default()
        };
        assert_eq!(config.resolved_struct_mode(), StructMode::Array);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(StructMode::Map.to_string(), "map");
        assert_eq!(StructMode::Array.to_string(), "array");
        assert_eq!(StructMode::from_u8(StructMode::Array as u8), StructMode::Array);
    }
}
