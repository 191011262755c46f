//! DarkGravityWave v3 difficulty retargeting.
//!
//! A 180-block weighted average of targets scaled by the window's actual
//! timespan, recomputed every block. On a PoW-algorithm activation
//! boundary the window restarts from the proof-of-work limit until it is
//! filled with same-era blocks, so the new algorithm's difficulty does not
//! inherit the old algorithm's hashrate.

use crate::chain::BlockIndexEntry;
use crate::chain_params::ConsensusParams;
use mewc_primitives::{PowAlgo, Uint256};
use tracing::debug;

/// Window size in blocks (about three hours).
const PAST_BLOCKS: i64 = 180;

/// Compute the compact target required after the chain described by
/// `chain` (chronological, tip last) for a candidate block at
/// `candidate_time`.
pub fn dark_gravity_wave(
    chain: &[BlockIndexEntry],
    candidate_time: i64,
    params: &ConsensusParams,
) -> u32 {
    let pow_limit = params.pow_limit(PowAlgo::Meowpow);
    let limit_compact = pow_limit.to_compact();

    let tip = match chain.last() {
        Some(tip) => tip,
        None => return limit_compact,
    };
    if tip.height < PAST_BLOCKS || chain.len() as i64 <= PAST_BLOCKS {
        return limit_compact;
    }

    if params.pow_allow_min_difficulty_blocks && params.pow_no_retargeting {
        // Special testing rule: a block arriving more than twice the
        // spacing late may use minimum difficulty; otherwise reuse the
        // last real difficulty.
        if candidate_time > tip.time + params.pow_target_spacing * 2 {
            return limit_compact;
        }
        let interval = params.difficulty_adjustment_interval();
        let mut at = chain.len() - 1;
        while at > 0 && chain[at].height % interval != 0 && chain[at].bits == limit_compact {
            at -= 1;
        }
        return chain[at].bits;
    }

    let sched = params.activation_schedule();
    let t_kawpow = sched.kawpow_time as i64;
    let t_meowpow = sched.meowpow_time as i64;

    let mut avg = Uint256::ZERO;
    let mut kawpow_blocks = 0i64;
    let mut meowpow_blocks = 0i64;
    for count in 1..=PAST_BLOCKS {
        let entry = &chain[chain.len() - count as usize];
        let target = Uint256::decode_compact(entry.bits).target;
        avg = if count == 1 {
            target
        } else {
            // Running weighted average, newest block weighted heaviest.
            avg.wrapping_mul_u64(count as u64)
                .wrapping_add(target)
                .div_u64(count as u64 + 1)
        };

        if entry.time >= t_kawpow && entry.time < t_meowpow {
            kawpow_blocks += 1;
        }
        if entry.time >= t_meowpow {
            meowpow_blocks += 1;
        }
    }

    // Clean slate while an algorithm era has not yet filled the window.
    if candidate_time >= t_kawpow && candidate_time < t_meowpow && kawpow_blocks != PAST_BLOCKS {
        return limit_compact;
    }
    if candidate_time >= t_meowpow && meowpow_blocks != PAST_BLOCKS {
        return limit_compact;
    }

    let oldest = &chain[chain.len() - PAST_BLOCKS as usize];
    let mut actual_timespan = tip.time - oldest.time;
    let target_timespan = PAST_BLOCKS * params.pow_target_spacing;
    actual_timespan = actual_timespan.clamp(target_timespan / 3, target_timespan * 3);

    let mut next = avg
        .wrapping_mul_u64(actual_timespan as u64)
        .div_u64(target_timespan as u64);
    if next > pow_limit {
        next = pow_limit;
    }

    let next_bits = next.to_compact();
    debug!(
        tip_height = tip.height,
        actual_timespan,
        target_timespan,
        next_bits = format!("0x{next_bits:08x}"),
        "DarkGravityWave retarget"
    );

    next_bits
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_params::test_params;
    use mewc_primitives::BlockVersion;

    fn limit_compact(params: &ConsensusParams) -> u32 {
        params.pow_limit(PowAlgo::Meowpow).to_compact()
    }

    fn meowpow_era_chain(params: &ConsensusParams, len: i64, spacing: i64) -> Vec<BlockIndexEntry> {
        let start = params.meowpow_activation_time as i64 + 1;
        (0..len)
            .map(|i| BlockIndexEntry {
                height: 1000 + i,
                time: start + i * spacing,
                bits: 0x1c0fffff,
                version: BlockVersion::genesis(4),
            })
            .collect()
    }

    #[test]
    fn short_chain_returns_limit() {
        let params = test_params();
        let chain: Vec<_> = (0..10)
            .map(|i| BlockIndexEntry {
                height: i,
                time: i * 60,
                bits: 0x1c0fffff,
                version: BlockVersion::genesis(4),
            })
            .collect();
        assert_eq!(dark_gravity_wave(&chain, 600, &params), limit_compact(&params));
    }

    #[test]
    fn on_schedule_chain_keeps_difficulty() {
        let params = test_params();
        let chain = meowpow_era_chain(&params, 200, params.pow_target_spacing);
        let candidate_time = chain.last().unwrap().time + params.pow_target_spacing;
        let bits = dark_gravity_wave(&chain, candidate_time, &params);
        // Perfect spacing: the retarget reproduces the window average.
        let target = Uint256::decode_compact(bits).target;
        let window = Uint256::decode_compact(0x1c0fffff).target;
        assert!(target <= window.wrapping_mul_u64(11).div_u64(10));
        assert!(window <= target.wrapping_mul_u64(11).div_u64(10));
    }

    #[test]
    fn slow_blocks_raise_target() {
        let params = test_params();
        // Blocks at three times the target spacing.
        let chain = meowpow_era_chain(&params, 200, params.pow_target_spacing * 3);
        let candidate_time = chain.last().unwrap().time + params.pow_target_spacing;
        let bits = dark_gravity_wave(&chain, candidate_time, &params);
        let next = Uint256::decode_compact(bits).target;
        let window = Uint256::decode_compact(0x1c0fffff).target;
        assert!(next > window);
    }

    #[test]
    fn fast_blocks_lower_target() {
        let params = test_params();
        let chain = meowpow_era_chain(&params, 200, params.pow_target_spacing / 3);
        let candidate_time = chain.last().unwrap().time + params.pow_target_spacing;
        let bits = dark_gravity_wave(&chain, candidate_time, &params);
        let next = Uint256::decode_compact(bits).target;
        let window = Uint256::decode_compact(0x1c0fffff).target;
        assert!(next < window);
    }

    #[test]
    fn result_never_exceeds_pow_limit() {
        let params = test_params();
        // Absurdly slow chain; the scaled average must clamp to the limit.
        let chain = meowpow_era_chain(&params, 200, params.pow_target_spacing * 100);
        let candidate_time = chain.last().unwrap().time + params.pow_target_spacing;
        let bits = dark_gravity_wave(&chain, candidate_time, &params);
        let next = Uint256::decode_compact(bits).target;
        assert!(next <= params.pow_limit(PowAlgo::Meowpow));
    }

    #[test]
    fn era_transition_resets_to_limit() {
        let params = test_params();
        // Window blocks sit before the MeowPow switch, candidate after.
        let start = params.meowpow_activation_time as i64 - 100_000;
        let chain: Vec<_> = (0..200)
            .map(|i| BlockIndexEntry {
                height: 1000 + i,
                time: start + i * 60,
                bits: 0x1c0fffff,
                version: BlockVersion::genesis(4),
            })
            .collect();
        let candidate_time = params.meowpow_activation_time as i64 + 10;
        assert_eq!(
            dark_gravity_wave(&chain, candidate_time, &params),
            limit_compact(&params)
        );
    }

    #[test]
    fn min_difficulty_rule_when_testing_flags_set() {
        let mut params = test_params();
        params.pow_allow_min_difficulty_blocks = true;
        params.pow_no_retargeting = true;
        let chain = meowpow_era_chain(&params, 200, params.pow_target_spacing);
        let tip_time = chain.last().unwrap().time;

        // Late candidate gets the minimum difficulty.
        assert_eq!(
            dark_gravity_wave(&chain, tip_time + params.pow_target_spacing * 2 + 1, &params),
            limit_compact(&params)
        );
        // Timely candidate reuses the last real difficulty.
        assert_eq!(
            dark_gravity_wave(&chain, tip_time + 30, &params),
            0x1c0fffff
        );
    }
}
