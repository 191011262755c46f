//! # mewc-consensus
//!
//! Consensus rules for the Meowcoin proof-of-work core:
//!
//! - The immutable chain parameter registry (five variants) and the
//!   deterministic genesis construction it pins.
//! - Proof-of-work validation: compact target range checks, per-algorithm
//!   verification paths, and the reduced ethash-era check.
//! - Merge-mining (AuxPoW) verification.
//! - Difficulty retargeting: DarkGravityWave v3 and the LWMA-1
//!   multi-algorithm selector, chosen by merge-mining activation height.
//!
//! Everything here is pure and synchronous over header and index data; no
//! operation suspends or retries.

pub mod auxpow;
pub mod chain;
pub mod chain_params;
pub mod darkgravity;
pub mod error;
pub mod genesis;
pub mod lwma;
pub mod pow;

pub use auxpow::check_auxpow;
pub use chain::{ancestor, BlockIndexEntry};
pub use chain_params::{
    network_for_magic, Base58Prefixes, Bip9Deployment, ChainKind, ChainParams, ChainTxData,
    ConsensusParams, DeploymentPos,
};
pub use darkgravity::dark_gravity_wave;
pub use error::{ConsensusError, ConsensusResult};
pub use genesis::{create_genesis_block, meowcoin_genesis_block, testnet4_genesis_block};
pub use lwma::lwma_next_work_required;
pub use pow::{
    calculate_next_work_required, check_header_proof_of_work, check_header_proof_of_work_full,
    check_proof_of_work, check_proof_of_work_hash, derive_target, get_next_work_required,
    permitted_difficulty_transition,
};
