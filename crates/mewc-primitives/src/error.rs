//! Error types for primitive encoding and parsing.

use thiserror::Error;

/// Errors from wire (de)serialization and primitive parsing.
#[derive(Error, Debug)]
pub enum PrimitivesError {
    /// Underlying I/O failure (includes truncated input).
    #[error("serialization I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input had bytes left over after a complete value was decoded.
    #[error("trailing bytes after decoding: {0} bytes left")]
    TrailingBytes(usize),

    /// A compact size used a longer encoding than necessary.
    #[error("non-canonical compact size encoding")]
    NonCanonicalCompactSize,

    /// A collection length prefix exceeds the sanity limit.
    #[error("collection length {got} exceeds limit {max}")]
    OversizedCollection { got: u64, max: u64 },

    /// Hex string had the wrong length for the target type.
    #[error("invalid hex length: expected {expected} characters, got {got}")]
    InvalidHexLength { expected: usize, got: usize },

    /// Hex decoding failed.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// Result type for primitive operations.
pub type PrimitivesResult<T> = Result<T, PrimitivesError>;
