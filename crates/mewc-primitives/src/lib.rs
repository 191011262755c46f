//! # mewc-primitives
//!
//! Consensus-critical primitive types for Meowcoin: the 256-bit target
//! arithmetic with its compact (`nBits`) encoding, the Bitcoin-style wire
//! codec, the dual-layout block header, and the merge-mining data model.
//!
//! Every byte emitted here is consensus: two nodes disagreeing on any
//! encoding in this crate fork the chain.

pub mod auxpow;
pub mod block;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod script;
pub mod serialize;
pub mod transaction;
pub mod uint256;
pub mod version;

pub use auxpow::{AuxPow, MerkleBranch, MERGED_MINING_HEADER};
pub use block::{Block, BlockHeader, PureHeader, SerContext};
pub use error::{PrimitivesError, PrimitivesResult};
pub use merkle::{block_merkle_root, merkle_root};
pub use script::Script;
pub use serialize::{deserialize, serialize, Decodable, Encodable};
pub use transaction::{OutPoint, Transaction, TxIn, TxOut, COIN};
pub use uint256::{CompactDecode, Uint256};
pub use version::{BlockVersion, PowAlgo};
