//! LWMA-1 multi-algorithm difficulty retargeting.
//!
//! Once merge-mining activates, two algorithm families contribute blocks
//! to one chain, so each family retargets against its own recent history:
//! a linearly weighted moving average over the last N same-algorithm
//! blocks, with the per-algorithm spacing stretched by the number of
//! active families.

use crate::chain::{ancestor, BlockIndexEntry};
use crate::chain_params::ConsensusParams;
use mewc_primitives::{BlockVersion, PowAlgo, Uint256};
use tracing::debug;

/// The backward scan is bounded to `N * 10` blocks; without the cap a
/// chain with a starved algorithm would walk to genesis on every header.
const SEARCH_WINDOW_FACTOR: i64 = 10;

/// Maximum solvetime credited to one block, in units of the per-algo
/// target spacing.
const SOLVETIME_CLAMP_FACTOR: i64 = 6;

/// Compute the compact target for the next block of the candidate's
/// algorithm. `is_auxpow` forces the Scrypt family when the caller knows
/// the candidate is merge-mined before its version is final.
pub fn lwma_next_work_required(
    chain: &[BlockIndexEntry],
    candidate_version: BlockVersion,
    is_auxpow: bool,
    params: &ConsensusParams,
) -> u32 {
    let algo = if is_auxpow {
        PowAlgo::Scrypt
    } else {
        candidate_version.algo()
    };
    let pow_limit = params.pow_limit(algo);
    let limit_compact = pow_limit.to_compact();

    let tip = match chain.last() {
        Some(tip) => tip,
        None => return limit_compact,
    };

    // Number of families currently contributing blocks.
    let aux_active =
        params.auxpow_start_height > 0 && tip.height + 1 >= params.auxpow_start_height;
    let algos: i64 = if aux_active { 2 } else { 1 };
    let spacing = params.pow_target_spacing * algos;

    let n = params.lwma_averaging_window;
    let k = n * (n + 1) * spacing / 2;
    let height = tip.height;

    if height < n {
        return limit_compact;
    }

    // Collect the last N+1 blocks of the same family, newest first.
    let mut same_algo: Vec<&BlockIndexEntry> = Vec::with_capacity((n + 1) as usize);
    let search_limit = height.min(n * SEARCH_WINDOW_FACTOR);
    let mut h = height;
    while h >= 0 && (same_algo.len() as i64) < n + 1 && height - h <= search_limit {
        let entry = match ancestor(chain, h) {
            Some(entry) => entry,
            None => break,
        };
        let entry_algo = if entry.version.is_auxpow() {
            PowAlgo::Scrypt
        } else {
            PowAlgo::Meowpow
        };
        if entry_algo == algo {
            same_algo.push(entry);
        }
        h -= 1;
    }

    if (same_algo.len() as i64) < n + 1 {
        // Not enough history for this family: inherit the oldest
        // same-family difficulty seen, or start from the limit.
        return match same_algo.last() {
            Some(oldest) => oldest.bits,
            None => limit_compact,
        };
    }

    same_algo.reverse();

    let mut sum_weighted_solvetimes = 0i64;
    let mut sum_targets = Uint256::ZERO;
    let mut prev_time = same_algo[0].time;
    for i in 1..=n {
        let entry = same_algo[i as usize];
        // Monotonise timestamps so out-of-order blocks cannot produce
        // negative solvetimes.
        let time = entry.time.max(prev_time + 1);
        let solvetime = (time - prev_time).clamp(1, SOLVETIME_CLAMP_FACTOR * spacing);
        prev_time = time;

        sum_weighted_solvetimes += i * solvetime;
        sum_targets = sum_targets.wrapping_add(Uint256::decode_compact(entry.bits).target);
    }

    let avg_target = sum_targets.div_u64(n as u64);
    let mut next = avg_target
        .wrapping_mul_u64(sum_weighted_solvetimes.max(1) as u64)
        .div_u64(k as u64);
    if next > pow_limit {
        next = pow_limit;
    }

    let next_bits = next.to_compact();
    debug!(
        tip_height = height,
        ?algo,
        families = algos,
        sum_weighted_solvetimes,
        next_bits = format!("0x{next_bits:08x}"),
        "LWMA retarget"
    );

    next_bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_params::test_params;

    const MEOWPOW_BITS: u32 = 0x1c0fffff;

    fn native(height: i64, time: i64) -> BlockIndexEntry {
        BlockIndexEntry {
            height,
            time,
            bits: MEOWPOW_BITS,
            version: BlockVersion::genesis(4),
        }
    }

    fn merged(height: i64, time: i64, bits: u32) -> BlockIndexEntry {
        BlockIndexEntry {
            height,
            time,
            bits,
            version: BlockVersion::genesis(4).with_auxpow(true).with_chain_id(2),
        }
    }

    /// A single-family chain at exactly the effective spacing reproduces
    /// the average target: the weighted solvetime sum equals k.
    #[test]
    fn equilibrium_returns_average_target() {
        let mut params = test_params();
        params.auxpow_start_height = 0;
        let spacing = params.pow_target_spacing;
        let chain: Vec<_> = (0..100).map(|i| native(i, i * spacing)).collect();

        let bits = lwma_next_work_required(&chain, BlockVersion::genesis(4), false, &params);
        assert_eq!(bits, MEOWPOW_BITS);
    }

    #[test]
    fn short_chain_returns_limit() {
        let params = test_params();
        let chain: Vec<_> = (0..10).map(|i| native(i, i * 60)).collect();
        let bits = lwma_next_work_required(&chain, BlockVersion::genesis(4), false, &params);
        assert_eq!(bits, params.pow_limit(PowAlgo::Meowpow).to_compact());
    }

    #[test]
    fn fast_family_lowers_target() {
        let mut params = test_params();
        params.auxpow_start_height = 0;
        let spacing = params.pow_target_spacing;
        // Blocks at a third of the target spacing.
        let chain: Vec<_> = (0..100).map(|i| native(i, i * spacing / 3)).collect();

        let bits = lwma_next_work_required(&chain, BlockVersion::genesis(4), false, &params);
        let next = Uint256::decode_compact(bits).target;
        let base = Uint256::decode_compact(MEOWPOW_BITS).target;
        assert!(next < base);
    }

    /// Scenario: only a handful of the recent ancestors share the
    /// candidate's family. The retarget inherits the oldest same-family
    /// difficulty instead of averaging across families.
    #[test]
    fn scarce_family_inherits_oldest_bits() {
        let mut params = test_params();
        params.auxpow_start_height = 1;
        let spacing = params.pow_target_spacing;

        let mut chain = Vec::new();
        let mut height = 0i64;
        // A long native prefix.
        for _ in 0..300 {
            chain.push(native(height, height * spacing));
            height += 1;
        }
        // Ten merge-mined blocks interleaved near the tip, oldest first
        // carrying a recognisable difficulty.
        for j in 0..10 {
            let bits = 0x1d00f000 + j as u32;
            chain.push(merged(height, height * spacing, bits));
            height += 1;
            for _ in 0..4 {
                chain.push(native(height, height * spacing));
                height += 1;
            }
        }

        let candidate = BlockVersion::genesis(4).with_auxpow(true);
        let bits = lwma_next_work_required(&chain, candidate, true, &params);
        // The oldest merge-mined block within reach of the bounded scan.
        assert_eq!(bits, 0x1d00f000);
    }

    #[test]
    fn family_with_no_history_starts_at_limit() {
        let mut params = test_params();
        params.auxpow_start_height = 1;
        let chain: Vec<_> = (0..100).map(|i| native(i, i * 60)).collect();

        let candidate = BlockVersion::genesis(4).with_auxpow(true);
        let bits = lwma_next_work_required(&chain, candidate, true, &params);
        assert_eq!(bits, params.pow_limit(PowAlgo::Scrypt).to_compact());
    }

    #[test]
    fn result_never_exceeds_pow_limit() {
        let mut params = test_params();
        params.auxpow_start_height = 0;
        let spacing = params.pow_target_spacing;
        // Pathologically slow chain at the limit difficulty.
        let limit_bits = params.pow_limit(PowAlgo::Meowpow).to_compact();
        let chain: Vec<_> = (0..100)
            .map(|i| BlockIndexEntry {
                height: i,
                time: i * spacing * 50,
                bits: limit_bits,
                version: BlockVersion::genesis(4),
            })
            .collect();

        let bits = lwma_next_work_required(&chain, BlockVersion::genesis(4), false, &params);
        let next = Uint256::decode_compact(bits).target;
        assert!(next <= params.pow_limit(PowAlgo::Meowpow));
    }
}
