//! Error types for consensus validation.

use mewc_primitives::Uint256;
use thiserror::Error;

/// Consensus validation errors.
#[derive(Error, Debug)]
pub enum ConsensusError {
    /// `nBits` decodes to a negative, zero, overflowing, or over-limit
    /// target.
    #[error("nBits out of range: {bits:#010x}")]
    BitsOutOfRange { bits: u32 },

    /// The proof-of-work hash exceeds the target derived from `nBits`.
    #[error("hash above target: hash {hash}, target {target}")]
    HashAboveTarget { hash: Uint256, target: Uint256 },

    /// A merge-mining proof failed validation.
    #[error("invalid auxpow: {0}")]
    AuxPowInvalid(String),

    /// The version flags auxpow but no proof is attached.
    #[error("block version flags auxpow but no auxpow is present")]
    AuxPowMissing,

    /// A constructed genesis block does not match its pinned constant.
    #[error("genesis assertion failed for {chain}: {field} is {got}, expected {expected}")]
    GenesisAssertion {
        chain: &'static str,
        field: &'static str,
        got: Uint256,
        expected: Uint256,
    },

    /// Malformed primitive encoding.
    #[error("serialization error: {0}")]
    Serialization(#[from] mewc_primitives::PrimitivesError),
}

/// Result type for consensus operations.
pub type ConsensusResult<T> = Result<T, ConsensusError>;
