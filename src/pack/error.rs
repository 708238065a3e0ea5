//! Packwire error types

use thiserror::Error;

use super::format::Kind;

/// Codec errors
#[derive(Error, Debug)]
pub enum Error {
    /// Argument cannot be represented or registered
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// What was wrong with the argument
        reason: String,
    },

    /// Format code not legal for the destination kind
    #[error("type mismatch: format code {code:#04x} cannot decode into {expected}")]
    TypeMismatch {
        /// Offending format code
        code: u8,
        /// Kind the destination expected
        expected: Kind,
    },

    /// Extension type code with no registration (decode side)
    #[error("unregistered extension type code {type_code}")]
    UnregisteredExtension {
        /// Embedded extension type code
        type_code: i8,
    },

    /// Extension value whose Rust type is not registered (encode side)
    #[error("extension type {type_name} is not registered")]
    UnregisteredExtensionType {
        /// Rust type name of the value
        type_name: &'static str,
    },

    /// Registered extension rejected its payload
    #[error("malformed payload for extension type {type_code}: {reason}")]
    MalformedExtensionPayload {
        /// Embedded extension type code
        type_code: i8,
        /// Why the payload was rejected
        reason: String,
    },

    /// Read past the end of the input
    #[error("out of range: need {needed} bytes at offset {offset}, buffer holds {available}")]
    OutOfRange {
        /// Offset the read started at
        offset: usize,
        /// Bytes requested
        needed: usize,
        /// Total buffer length
        available: usize,
    },

    /// Decoded integer does not fit the destination
    #[error("integer {value} does not fit in {target}")]
    IntegerOverflow {
        /// Decoded value
        value: i128,
        /// Destination type name
        target: &'static str,
    },

    /// Invalid UTF-8
    #[error("invalid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Nesting deeper than the configured limit
    #[error("nesting depth exceeds limit of {max}")]
    DepthLimitExceeded {
        /// Configured limit
        max: usize,
    },
}

impl Error {
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    pub(crate) const fn mismatch(code: u8, expected: Kind) -> Self {
        Self::TypeMismatch { code, expected }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
