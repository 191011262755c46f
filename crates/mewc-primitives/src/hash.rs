//! SHA-256 hashing helpers.

use crate::uint256::Uint256;
use sha2::{Digest, Sha256};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, the Bitcoin-family message digest.
pub fn sha256d(data: &[u8]) -> [u8; 32] {
    Sha256::digest(Sha256::digest(data)).into()
}

/// Double SHA-256 of the concatenation of two 32-byte values.
///
/// Used for merkle tree inner nodes.
pub fn sha256d_pair(left: &Uint256, right: &Uint256) -> Uint256 {
    let mut buf = [0u8; 64];
    buf[..32].copy_from_slice(&left.to_le_bytes());
    buf[32..].copy_from_slice(&right.to_le_bytes());
    Uint256::from_le_bytes(sha256d(&buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256d_empty_vector() {
        assert_eq!(
            hex::encode(sha256d(b"")),
            "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456"
        );
    }
}
