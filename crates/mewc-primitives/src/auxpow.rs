//! Merge-mining (AuxPoW) data structures.
//!
//! An auxpow blob proves that a parent-chain block committed to one of our
//! block hashes: the parent coinbase embeds the commitment, a merkle branch
//! links the coinbase into the parent merkle root, and the parent's pure
//! header carries the proof of work. Validation lives in the consensus
//! crate; this module is the data model and codec.

use crate::block::PureHeader;
use crate::hash::sha256d_pair;
use crate::serialize::{Decodable, Encodable};
use crate::transaction::Transaction;
use crate::uint256::Uint256;
use crate::PrimitivesResult;
use std::io::{Read, Write};

/// Magic bytes prefixing the merged-mining commitment in the parent
/// coinbase: `0xfa 0xbe 'm' 'm'`.
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, 0x6d, 0x6d];

/// A merkle inclusion proof: sibling hashes from leaf to root plus the
/// leaf's index, whose bits select the concatenation side at each level.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MerkleBranch {
    /// Sibling hashes, leaf level first.
    pub hashes: Vec<Uint256>,
    /// Index of the proven leaf.
    pub index: u32,
}

impl MerkleBranch {
    /// Fold the branch over a leaf hash, yielding the implied root.
    pub fn compute_root(&self, leaf: Uint256) -> Uint256 {
        let mut hash = leaf;
        let mut index = self.index;
        for sibling in &self.hashes {
            if index & 1 != 0 {
                hash = sha256d_pair(sibling, &hash);
            } else {
                hash = sha256d_pair(&hash, sibling);
            }
            index >>= 1;
        }
        hash
    }
}

impl Encodable for MerkleBranch {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.hashes.encode(w)?;
        (self.index as i32).encode(w)
    }
}

impl Decodable for MerkleBranch {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(MerkleBranch {
            hashes: Vec::decode(r)?,
            index: i32::decode(r)? as u32,
        })
    }
}

/// A merged-mining attestation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuxPow {
    /// The parent chain's coinbase transaction carrying the commitment.
    pub coinbase_tx: Transaction,
    /// Hash of the parent block (legacy field, not consensus-checked).
    pub parent_hash: Uint256,
    /// Proof that the coinbase is in the parent block's merkle tree.
    pub coinbase_branch: MerkleBranch,
    /// Proof that our chain's hash is in the aux merkle tree the coinbase
    /// commits to.
    pub chain_branch: MerkleBranch,
    /// The parent block's pure header, whose PoW secures this block.
    pub parent_header: PureHeader,
}

impl Encodable for AuxPow {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.coinbase_tx.encode(w)?;
        self.parent_hash.encode(w)?;
        self.coinbase_branch.encode(w)?;
        self.chain_branch.encode(w)?;
        self.parent_header.encode(w)
    }
}

impl Decodable for AuxPow {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(AuxPow {
            coinbase_tx: Transaction::decode(r)?,
            parent_hash: Uint256::decode(r)?,
            coinbase_branch: MerkleBranch::decode(r)?,
            chain_branch: MerkleBranch::decode(r)?,
            parent_header: PureHeader::decode(r)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serialize::{deserialize, serialize};
    use crate::script::Script;
    use crate::transaction::{TxIn, TxOut};

    #[test]
    fn empty_branch_is_identity() {
        let leaf = Uint256::from_u64(77);
        assert_eq!(MerkleBranch::default().compute_root(leaf), leaf);
    }

    #[test]
    fn branch_side_selection() {
        let leaf = Uint256::from_u64(1);
        let sibling = Uint256::from_u64(2);

        let left = MerkleBranch {
            hashes: vec![sibling],
            index: 0,
        };
        let right = MerkleBranch {
            hashes: vec![sibling],
            index: 1,
        };
        assert_eq!(left.compute_root(leaf), sha256d_pair(&leaf, &sibling));
        assert_eq!(right.compute_root(leaf), sha256d_pair(&sibling, &leaf));
    }

    #[test]
    fn auxpow_roundtrip() {
        let auxpow = AuxPow {
            coinbase_tx: Transaction {
                version: 1,
                inputs: vec![TxIn::coinbase(Script::new().push_slice(&[1, 2, 3]))],
                outputs: vec![TxOut {
                    value: 1,
                    script_pubkey: Script::new(),
                }],
                lock_time: 0,
            },
            parent_hash: Uint256::from_u64(4),
            coinbase_branch: MerkleBranch {
                hashes: vec![Uint256::from_u64(5)],
                index: 0,
            },
            chain_branch: MerkleBranch {
                hashes: vec![Uint256::from_u64(6), Uint256::from_u64(7)],
                index: 2,
            },
            parent_header: PureHeader::default(),
        };
        let bytes = serialize(&auxpow);
        let back: AuxPow = deserialize(&bytes).unwrap();
        assert_eq!(back, auxpow);
    }
}
