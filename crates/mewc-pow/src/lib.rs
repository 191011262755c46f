//! # mewc-pow
//!
//! The proof-of-work hash functions of the chain:
//!
//! - **X16R / X16RV2** for pre-KawPow block identity: sixteen chained
//!   512-bit digests ordered by the previous block hash.
//! - **KawPow / MeowPow**, the ethash-family algorithms, with per-epoch
//!   light-cache contexts and light verification via the mix hash.
//! - **Scrypt** for merge-mined parent proofs.
//!
//! [`dispatch`] maps a header to its algorithm from the block time, the
//! auxpow version flag, and an explicit [`ActivationSchedule`].

pub mod dispatch;
pub mod ethash;
pub mod scrypt_pow;
pub mod sph;
pub mod x16r;

#[cfg(test)]
mod test_vectors;

pub use dispatch::{
    block_hash, block_hash_full, ethash_input_hash, select_algo, ActivationSchedule, HashAlgo,
};
pub use ethash::progpow::{Flavor, FlavorParams, PowOutput};
pub use ethash::{epoch_context, epoch_number, EpochContext, EPOCH_LENGTH};
pub use scrypt_pow::scrypt_pow_hash;
pub use x16r::{hash_order, x16r, x16rv2, Algo16};
