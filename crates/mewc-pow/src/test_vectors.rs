//! Known-answer vectors for the hash pipeline.
//!
//! Structural tests (determinism, padding boundaries, dispatch order) live
//! next to each module; this module pins byte-exact published digests so a
//! silent change to any covered path fails mechanically. The X16RV2 chain
//! is anchored end-to-end by the mainnet genesis header, a value the live
//! network has built on since 2022.
//
// TODO: import the sphlib short-message vectors for the Bmw, Luffa,
// Cubehash, Shavite, Simd, Echo, Hamsi and Fugue stages, and a Ravencoin
// KawPow header -> (mix_hash, final_hash) reference pair for the ethash
// path.

use crate::x16r::{self, Algo16};
use mewc_primitives::Uint256;

/// FIPS 180-2 vector for the SHA-512 stage.
#[test]
fn sha512_stage_fips_vector() {
    let out = x16r::stage(Algo16::Sha512, b"abc");
    assert_eq!(
        hex::encode(out),
        "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a\
         2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
    );
}

/// The Tiger reference digest, carried in the low 192 bits with the V2
/// zero-fill above it.
#[test]
fn tiger_interposition_pads_published_digest() {
    let out = x16r::tiger_padded(b"");
    assert_eq!(
        hex::encode(&out[..24]),
        "3293ac630c13f0245f92bbb1766e16167a4e58492dde73f3"
    );
    assert!(out[24..].iter().all(|&b| b == 0));
}

/// The mainnet genesis header hashes to its pinned block hash: 80 header
/// bytes through sixteen chained stages (an all-zero previous hash selects
/// BLAKE-512 throughout) and the 256-bit truncation.
#[test]
fn x16rv2_mainnet_genesis_vector() {
    let merkle =
        Uint256::from_hex("e8916cf6592c8433d598c3a5fe60a9741fd2a997b39d93af2d789cdd9d9a7390")
            .unwrap();

    let mut header = Vec::with_capacity(80);
    header.extend_from_slice(&4i32.to_le_bytes());
    header.extend_from_slice(&[0u8; 32]);
    header.extend_from_slice(&merkle.to_le_bytes());
    header.extend_from_slice(&1_661_730_843u32.to_le_bytes());
    header.extend_from_slice(&0x1e00ffffu32.to_le_bytes());
    header.extend_from_slice(&351_574u32.to_le_bytes());
    assert_eq!(header.len(), 80);

    let hash = x16r::x16rv2(&header, &Uint256::ZERO);
    assert_eq!(
        hash.to_hex(),
        "000000edd819220359469c54f2614b5602ebc775ea67a64602f354bdaa320f70"
    );
}

/// The testnet genesis, same pipeline with different time and nonce.
#[test]
fn x16rv2_testnet_genesis_vector() {
    let merkle =
        Uint256::from_hex("e8916cf6592c8433d598c3a5fe60a9741fd2a997b39d93af2d789cdd9d9a7390")
            .unwrap();

    let mut header = Vec::with_capacity(80);
    header.extend_from_slice(&4i32.to_le_bytes());
    header.extend_from_slice(&[0u8; 32]);
    header.extend_from_slice(&merkle.to_le_bytes());
    header.extend_from_slice(&1_661_734_222u32.to_le_bytes());
    header.extend_from_slice(&0x1e00ffffu32.to_le_bytes());
    header.extend_from_slice(&7_680_541u32.to_le_bytes());

    let hash = x16r::x16rv2(&header, &Uint256::ZERO);
    assert_eq!(
        hash.to_hex(),
        "000000eaab417d6dfe9bd75119972e1d07ecfe8ff655bef7c2acb3d9a0eeed81"
    );
}
