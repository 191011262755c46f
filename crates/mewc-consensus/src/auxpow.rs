//! Merge-mining (AuxPoW) verification.
//!
//! A merge-mined block proves its work through a parent-chain block: the
//! parent coinbase script embeds a commitment to an aux merkle tree
//! containing our block hash, and the parent header's Scrypt PoW is
//! checked against our target by the caller.

use crate::chain_params::ConsensusParams;
use crate::error::{ConsensusError, ConsensusResult};
use mewc_primitives::{AuxPow, Uint256, MERGED_MINING_HEADER};

/// Maximum depth of the aux merkle tree.
const MAX_CHAIN_BRANCH_LENGTH: usize = 30;

fn invalid(reason: &str) -> ConsensusError {
    ConsensusError::AuxPowInvalid(reason.to_string())
}

/// The slot a chain id occupies in an aux merkle tree of the given size,
/// derived from the miner-chosen nonce. Deterministic so one parent block
/// cannot commit to the same chain twice.
fn expected_index(nonce: u32, chain_id: u16, merkle_height: usize) -> u32 {
    let mut rand = nonce;
    rand = rand.wrapping_mul(1103515245).wrapping_add(12345);
    rand = rand.wrapping_add(chain_id as u32);
    rand = rand.wrapping_mul(1103515245).wrapping_add(12345);
    rand % (1u32 << merkle_height)
}

/// Validate a merge-mining proof for `block_hash` under our chain id.
///
/// The parent PoW itself is checked separately by the PoW validator; this
/// covers the commitment and both merkle branches.
pub fn check_auxpow(
    aux: &AuxPow,
    block_hash: Uint256,
    chain_id: u16,
    params: &ConsensusParams,
) -> ConsensusResult<()> {
    if aux.coinbase_branch.index != 0 {
        return Err(invalid("coinbase branch must prove the first transaction"));
    }
    if !aux.coinbase_tx.is_coinbase() {
        return Err(invalid("parent transaction is not a coinbase"));
    }
    if params.strict_chain_id && aux.parent_header.version.chain_id() == chain_id {
        return Err(invalid("parent block must not carry our chain id"));
    }
    if aux.chain_branch.hashes.len() > MAX_CHAIN_BRANCH_LENGTH {
        return Err(invalid("aux merkle branch too deep"));
    }

    // The commitment stores the aux merkle root byte-reversed.
    let chain_root = aux.chain_branch.compute_root(block_hash);
    let mut root_bytes = chain_root.to_le_bytes();
    root_bytes.reverse();

    let script = aux.coinbase_tx.inputs[0].script_sig.as_bytes();
    let root_at = find(script, &root_bytes).ok_or_else(|| invalid("commitment not found"))?;

    if let Some(header_at) = find(script, &MERGED_MINING_HEADER) {
        // With the magic marker present it must be unique and the root
        // must follow it immediately.
        if find(&script[header_at + 1..], &MERGED_MINING_HEADER).is_some() {
            return Err(invalid("multiple merged-mining headers"));
        }
        if header_at + MERGED_MINING_HEADER.len() != root_at {
            return Err(invalid("merged-mining header is not followed by the root"));
        }
    } else if root_at > 20 {
        // Without the marker the commitment must sit in the first bytes
        // of the script, so it cannot be grafted into an unrelated push.
        return Err(invalid("commitment too deep in coinbase script"));
    }

    // The root is followed by the tree size and the index nonce.
    let tail = &script[root_at + 32..];
    if tail.len() < 8 {
        return Err(invalid("commitment truncated"));
    }
    let merkle_size = u32::from_le_bytes(tail[0..4].try_into().unwrap());
    let nonce = u32::from_le_bytes(tail[4..8].try_into().unwrap());
    let merkle_height = aux.chain_branch.hashes.len();
    if merkle_size != 1u32 << merkle_height {
        return Err(invalid("aux merkle size does not match branch length"));
    }
    if aux.chain_branch.index != expected_index(nonce, chain_id, merkle_height) {
        return Err(invalid("aux merkle index does not match chain id slot"));
    }

    // The coinbase must be part of the parent block.
    let coinbase_root = aux.coinbase_branch.compute_root(aux.coinbase_tx.txid());
    if coinbase_root != aux.parent_header.merkle_root {
        return Err(invalid("coinbase branch does not reach parent merkle root"));
    }

    Ok(())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
