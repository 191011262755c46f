//! Header hash dispatch.
//!
//! Which digest gives a block its identity is a pure function of the block
//! time, the auxpow flag, and the chain's two activation times. KawPow and
//! MeowPow blocks are identified by their *mix hash*: the mix survives
//! light verification via `hash_no_verify`, the final hash does not.

use crate::ethash::progpow::{self, Flavor, PowOutput};
use crate::ethash::{epoch_context, epoch_number};
use crate::x16r;
use mewc_primitives::hash::sha256d;
use mewc_primitives::serialize::{serialize, Encodable};
use mewc_primitives::{BlockHeader, BlockVersion, SerContext, Uint256};

/// The hash algorithms a header can be bound to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HashAlgo {
    X16r,
    X16rv2,
    Kawpow,
    Meowpow,
    /// Merge-mined: identity is the pure-header double SHA-256, security
    /// is the parent's Scrypt proof.
    Scrypt,
}

/// The two consensus activation times of a chain, threaded explicitly so
/// that serialization and hashing never consult process-global state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ActivationSchedule {
    /// KawPow activation (Unix seconds).
    pub kawpow_time: u32,
    /// MeowPow activation (Unix seconds).
    pub meowpow_time: u32,
}

impl ActivationSchedule {
    /// Schedule with both switches at the given times.
    pub const fn new(kawpow_time: u32, meowpow_time: u32) -> Self {
        ActivationSchedule {
            kawpow_time,
            meowpow_time,
        }
    }

    /// The serialization context implied by this schedule.
    pub const fn ser_context(&self) -> SerContext {
        SerContext::new(self.kawpow_time)
    }
}

/// Select the identity algorithm for a header.
///
/// Merge-mined blocks take the pure-header path regardless of time. X16R
/// is never selected: X16RV2 activated before this chain's genesis, so
/// every pre-KawPow block hashes with V2.
pub fn select_algo(time: u32, version: BlockVersion, sched: &ActivationSchedule) -> HashAlgo {
    if version.is_auxpow() {
        HashAlgo::Scrypt
    } else if time < sched.kawpow_time {
        HashAlgo::X16rv2
    } else if time < sched.meowpow_time {
        HashAlgo::Kawpow
    } else {
        HashAlgo::Meowpow
    }
}

/// The Keccak input for the ethash-family algorithms: double SHA-256 over
/// exactly the six fields {version, prev, merkle, time, bits, height}.
/// Neither nonce nor mix participates.
pub fn ethash_input_hash(header: &BlockHeader) -> Uint256 {
    let mut bytes = Vec::with_capacity(80);
    header
        .version
        .encode(&mut bytes)
        .and_then(|_| header.prev_hash.encode(&mut bytes))
        .and_then(|_| header.merkle_root.encode(&mut bytes))
        .and_then(|_| header.time.encode(&mut bytes))
        .and_then(|_| header.bits.encode(&mut bytes))
        .and_then(|_| header.height.encode(&mut bytes))
        .expect("writing to a Vec cannot fail");
    Uint256::from_le_bytes(sha256d(&bytes))
}

fn progpow_output(header: &BlockHeader, flavor: Flavor) -> PowOutput {
    let ctx = epoch_context(epoch_number(header.height));
    let input = ethash_input_hash(header);
    progpow::hash(
        flavor,
        &ctx,
        header.height,
        &input.to_le_bytes(),
        header.nonce64,
    )
}

/// The canonical block identity (`GetHash`).
///
/// For ethash-family blocks this recomputes the PoW and returns the mix
/// hash, which requires the epoch context; callers on hot paths should
/// hold on to the result.
pub fn block_hash(header: &BlockHeader, sched: &ActivationSchedule) -> Uint256 {
    match select_algo(header.time, header.version, sched) {
        HashAlgo::Scrypt => header.pure().hash(),
        HashAlgo::X16r | HashAlgo::X16rv2 => {
            x16r::x16rv2(&serialize(&header.pure()), &header.prev_hash)
        }
        HashAlgo::Kawpow => {
            Uint256::from_le_bytes(progpow_output(header, Flavor::Kawpow).mix_hash)
        }
        HashAlgo::Meowpow => {
            Uint256::from_le_bytes(progpow_output(header, Flavor::Meowpow).mix_hash)
        }
    }
}

/// The full PoW hash (`GetHashFull`): returns the target-checked final
/// hash and writes the mix. Pre-KawPow blocks use X16R here and have no
/// mix.
pub fn block_hash_full(
    header: &BlockHeader,
    sched: &ActivationSchedule,
    mix_out: &mut Uint256,
) -> Uint256 {
    if header.time < sched.kawpow_time {
        *mix_out = Uint256::ZERO;
        return x16r::x16r(&serialize(&header.pure()), &header.prev_hash);
    }
    let flavor = if header.time < sched.meowpow_time {
        Flavor::Kawpow
    } else {
        Flavor::Meowpow
    };
    let out = progpow_output(header, flavor);
    *mix_out = Uint256::from_le_bytes(out.mix_hash);
    Uint256::from_le_bytes(out.final_hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHED: ActivationSchedule = ActivationSchedule::new(1_662_493_424, 1_710_799_200);

    #[test]
    fn algo_selection_by_era() {
        let v = BlockVersion::genesis(4);
        assert_eq!(
            select_algo(SCHED.kawpow_time - 1, v, &SCHED),
            HashAlgo::X16rv2
        );
        assert_eq!(select_algo(SCHED.kawpow_time, v, &SCHED), HashAlgo::Kawpow);
        assert_eq!(
            select_algo(SCHED.meowpow_time - 1, v, &SCHED),
            HashAlgo::Kawpow
        );
        assert_eq!(
            select_algo(SCHED.meowpow_time, v, &SCHED),
            HashAlgo::Meowpow
        );
    }

    #[test]
    fn auxpow_always_takes_pure_header_path() {
        let v = BlockVersion::genesis(4).with_auxpow(true);
        for time in [0, SCHED.kawpow_time, SCHED.meowpow_time + 1] {
            assert_eq!(select_algo(time, v, &SCHED), HashAlgo::Scrypt);
        }
    }

    #[test]
    fn ethash_input_ignores_nonce_and_mix() {
        let mut header = BlockHeader {
            version: BlockVersion::genesis(4),
            time: SCHED.kawpow_time,
            bits: 0x1e00ffff,
            height: 7,
            ..Default::default()
        };
        let base = ethash_input_hash(&header);
        header.nonce64 = 99;
        header.mix_hash = Uint256::from_u64(1);
        header.nonce = 3;
        assert_eq!(ethash_input_hash(&header), base);
        header.height = 8;
        assert_ne!(ethash_input_hash(&header), base);
    }

    #[test]
    fn auxpow_identity_is_pure_header_hash() {
        let mut header = BlockHeader {
            version: BlockVersion::genesis(4).with_auxpow(true),
            time: SCHED.meowpow_time + 10,
            bits: 0x1e00ffff,
            nonce: 5,
            ..Default::default()
        };
        assert_eq!(block_hash(&header, &SCHED), header.pure().hash());
        // The pure-header identity covers the legacy nonce.
        header.nonce = 6;
        assert_eq!(block_hash(&header, &SCHED), header.pure().hash());
    }

    #[test]
    fn pre_kawpow_identity_is_x16rv2() {
        let header = BlockHeader {
            version: BlockVersion::genesis(4),
            time: SCHED.kawpow_time - 100,
            bits: 0x1e00ffff,
            nonce: 12345,
            ..Default::default()
        };
        let expected = crate::x16r::x16rv2(
            &serialize(&header.pure()),
            &header.prev_hash,
        );
        assert_eq!(block_hash(&header, &SCHED), expected);
    }
}
