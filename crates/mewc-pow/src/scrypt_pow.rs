//! Scrypt proof of work for merge-mined parent headers.
//!
//! The classic scrypt-1024-1-1-256 construction: the serialized 80-byte
//! header is both password and salt.

use mewc_primitives::Uint256;
use scrypt::Params;

/// Scrypt PoW hash of a serialized pure header.
pub fn scrypt_pow_hash(header_bytes: &[u8]) -> Uint256 {
    let params = Params::new(10, 1, 1, 32).expect("static scrypt parameters are valid");
    let mut out = [0u8; 32];
    scrypt::scrypt(header_bytes, header_bytes, &params, &mut out)
        .expect("output buffer length is fixed");
    Uint256::from_le_bytes(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_input_sensitive() {
        let a = scrypt_pow_hash(&[1u8; 80]);
        assert_eq!(a, scrypt_pow_hash(&[1u8; 80]));
        assert_ne!(a, scrypt_pow_hash(&[2u8; 80]));
    }
}
