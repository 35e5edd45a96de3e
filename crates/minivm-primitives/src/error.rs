//! Parsing errors for primitive types

use thiserror::Error;

/// Error raised when decoding a [`crate::Word`] or [`crate::Address`] from bytes or hex
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrimitiveError {
    /// Input was not valid hex
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    /// Input had the wrong number of bytes
    #[error("invalid length: expected {expected} bytes, got {got}")]
    InvalidLength {
        /// Bytes required by the type
        expected: usize,
        /// Bytes supplied
        got: usize,
    },
}
