//! X16R and X16RV2.
//!
//! Sixteen chained 512-bit digests whose order is chosen by the nibbles of
//! the previous block hash, lowest four bits first. The final 512-bit
//! output is truncated to 256 bits. X16RV2 interposes a Tiger digest ahead
//! of the Keccak, Luffa and SHA-512 stages.

use crate::sph;
use digest::consts::U64;
use digest::Digest;
use mewc_primitives::Uint256;

/// The sixteen stage algorithms, in nibble order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Algo16 {
    Blake = 0,
    Bmw,
    Groestl,
    Jh,
    Keccak,
    Skein,
    Luffa,
    Cubehash,
    Shavite,
    Simd,
    Echo,
    Hamsi,
    Fugue,
    Shabal,
    Whirlpool,
    Sha512,
}

const ALGOS: [Algo16; 16] = [
    Algo16::Blake,
    Algo16::Bmw,
    Algo16::Groestl,
    Algo16::Jh,
    Algo16::Keccak,
    Algo16::Skein,
    Algo16::Luffa,
    Algo16::Cubehash,
    Algo16::Shavite,
    Algo16::Simd,
    Algo16::Echo,
    Algo16::Hamsi,
    Algo16::Fugue,
    Algo16::Shabal,
    Algo16::Whirlpool,
    Algo16::Sha512,
];

fn digest_to_64<D: Digest>(data: &[u8]) -> [u8; 64] {
    let out = D::new_with_prefix(data).finalize();
    let mut buf = [0u8; 64];
    buf[..out.len()].copy_from_slice(&out);
    buf
}

pub(crate) fn stage(algo: Algo16, data: &[u8]) -> [u8; 64] {
    match algo {
        Algo16::Blake => sph::blake512(data),
        Algo16::Bmw => sph::bmw512(data),
        Algo16::Groestl => digest_to_64::<groestl::Groestl512>(data),
        Algo16::Jh => digest_to_64::<jh::Jh512>(data),
        Algo16::Keccak => digest_to_64::<sha3::Keccak512>(data),
        Algo16::Skein => digest_to_64::<skein::Skein512<U64>>(data),
        Algo16::Luffa => sph::luffa512(data),
        Algo16::Cubehash => sph::cubehash512(data),
        Algo16::Shavite => sph::shavite512(data),
        Algo16::Simd => sph::simd512(data),
        Algo16::Echo => sph::echo512(data),
        Algo16::Hamsi => sph::hamsi512(data),
        Algo16::Fugue => sph::fugue512(data),
        Algo16::Shabal => digest_to_64::<shabal::Shabal512>(data),
        Algo16::Whirlpool => digest_to_64::<whirlpool::Whirlpool>(data),
        Algo16::Sha512 => digest_to_64::<sha2::Sha512>(data),
    }
}

/// Tiger, zero-padded from 192 to 512 bits, as X16RV2 feeds it forward.
pub(crate) fn tiger_padded(data: &[u8]) -> [u8; 64] {
    digest_to_64::<tiger::Tiger>(data)
}

/// The stage order selected by a previous block hash: nibble `i`, lowest
/// four bits of the low bytes first, picks stage `i`.
pub fn hash_order(prev_hash: &Uint256) -> [Algo16; 16] {
    let bytes = prev_hash.to_le_bytes();
    let mut order = [Algo16::Blake; 16];
    for (i, slot) in order.iter_mut().enumerate() {
        let nibble = (bytes[i / 2] >> ((i & 1) * 4)) & 0x0f;
        *slot = ALGOS[nibble as usize];
    }
    order
}

fn chain(data: &[u8], prev_hash: &Uint256, v2: bool) -> Uint256 {
    let order = hash_order(prev_hash);
    let mut buf: Vec<u8> = data.to_vec();
    for algo in order {
        let v2_stage = v2 && matches!(algo, Algo16::Keccak | Algo16::Luffa | Algo16::Sha512);
        let input = if v2_stage {
            tiger_padded(&buf).to_vec()
        } else {
            buf
        };
        buf = stage(algo, &input).to_vec();
    }
    let mut out = [0u8; 32];
    out.copy_from_slice(&buf[..32]);
    Uint256::from_le_bytes(out)
}

/// X16R over raw header bytes.
pub fn x16r(data: &[u8], prev_hash: &Uint256) -> Uint256 {
    chain(data, prev_hash, false)
}

/// X16RV2 over raw header bytes.
pub fn x16rv2(data: &[u8], prev_hash: &Uint256) -> Uint256 {
    chain(data, prev_hash, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_prev_hash_selects_blake_throughout() {
        // The genesis case: every nibble is zero.
        let order = hash_order(&Uint256::ZERO);
        assert!(order.iter().all(|&a| a == Algo16::Blake));
    }

    #[test]
    fn order_follows_low_nibbles() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x41; // nibble 0 = 1 (Bmw), nibble 1 = 4 (Keccak)
        bytes[1] = 0xf5; // nibble 2 = 5 (Skein), nibble 3 = f (Sha512)
        let order = hash_order(&Uint256::from_le_bytes(bytes));
        assert_eq!(order[0], Algo16::Bmw);
        assert_eq!(order[1], Algo16::Keccak);
        assert_eq!(order[2], Algo16::Skein);
        assert_eq!(order[3], Algo16::Sha512);
        assert_eq!(order[4], Algo16::Blake);
    }

    #[test]
    fn v2_matches_v1_when_no_tweaked_stage_selected() {
        // All-Blake order contains none of Keccak/Luffa/Sha512.
        let header = [0x11u8; 80];
        assert_eq!(
            x16r(&header, &Uint256::ZERO),
            x16rv2(&header, &Uint256::ZERO)
        );
    }

    #[test]
    fn v2_diverges_when_keccak_selected() {
        let mut bytes = [0u8; 32];
        bytes[0] = 0x04; // nibble 0 = 4 -> Keccak first
        let prev = Uint256::from_le_bytes(bytes);
        let header = [0x22u8; 80];
        assert_ne!(x16r(&header, &prev), x16rv2(&header, &prev));
    }

    #[test]
    fn input_length_matters() {
        let a = x16r(&[0u8; 80], &Uint256::ZERO);
        let b = x16r(&[0u8; 81], &Uint256::ZERO);
        assert_ne!(a, b);
    }
}
