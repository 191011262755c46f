//! Transaction merkle tree.

use crate::block::Block;
use crate::hash::sha256d_pair;
use crate::uint256::Uint256;

/// Compute the merkle root over a list of transaction ids.
///
/// Bitcoin-shape tree: odd levels duplicate their last element. The
/// duplication quirk is consensus (a known CVE-2012-2459 malleability
/// source) and must be preserved.
pub fn merkle_root(mut hashes: Vec<Uint256>) -> Uint256 {
    if hashes.is_empty() {
        return Uint256::ZERO;
    }
    while hashes.len() > 1 {
        if hashes.len() % 2 != 0 {
            hashes.push(*hashes.last().unwrap());
        }
        hashes = hashes
            .chunks(2)
            .map(|pair| sha256d_pair(&pair[0], &pair[1]))
            .collect();
    }
    hashes[0]
}

/// Merkle root of a block's transactions.
pub fn block_merkle_root(block: &Block) -> Uint256 {
    merkle_root(block.txs.iter().map(|tx| tx.txid()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::sha256d_pair;

    #[test]
    fn empty_tree_is_zero() {
        assert_eq!(merkle_root(vec![]), Uint256::ZERO);
    }

    #[test]
    fn single_leaf_is_its_own_root() {
        let leaf = Uint256::from_u64(9);
        assert_eq!(merkle_root(vec![leaf]), leaf);
    }

    #[test]
    fn odd_level_duplicates_last() {
        let a = Uint256::from_u64(1);
        let b = Uint256::from_u64(2);
        let c = Uint256::from_u64(3);

        let ab = sha256d_pair(&a, &b);
        let cc = sha256d_pair(&c, &c);
        assert_eq!(merkle_root(vec![a, b, c]), sha256d_pair(&ab, &cc));
    }
}
