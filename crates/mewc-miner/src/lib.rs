//! Parallel genesis mining.
//!
//! A one-shot KawPow nonce search across OS threads: workers pull nonces
//! from a shared atomic counter, each builds its own epoch context, and
//! the first solution wins. The miner runs with the KawPow activation
//! forced to zero, so every variant mines through the ethash path
//! regardless of its chain-configured schedule.

use mewc_consensus::genesis::{meowcoin_genesis_block, testnet4_genesis_block};
use mewc_pow::ethash::progpow::{self, Flavor};
use mewc_pow::{block_hash, epoch_context, ethash_input_hash, ActivationSchedule};
use mewc_primitives::{Block, Uint256, COIN};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info};

/// Nonces between progress reports from the reporting worker.
const PROGRESS_INTERVAL: u64 = 100_000;

/// Schedule forced while mining: always the KawPow path.
const MINING_SCHEDULE: ActivationSchedule = ActivationSchedule::new(0, u32::MAX);

/// Errors from the genesis miner.
#[derive(Error, Debug)]
pub enum MinerError {
    /// The spec's `nBits` is out of range for its PoW limit.
    #[error("invalid target for nBits {bits:#010x} on {chain}")]
    InvalidTarget { chain: &'static str, bits: u32 },

    /// No chain spec with the requested name exists.
    #[error("unknown chain name: {0}")]
    UnknownChain(String),
}

/// One chain variant's genesis mining job.
#[derive(Clone, Debug)]
pub struct GenesisSpec {
    pub name: &'static str,
    pub time: u32,
    pub nonce: u32,
    pub bits: u32,
    pub version: i32,
    pub reward: i64,
    pub pow_limit_hex: &'static str,
}

impl GenesisSpec {
    fn build_block(&self) -> Block {
        if self.name == "testnet4" {
            testnet4_genesis_block(self.time, self.nonce, self.bits, self.version, self.reward)
        } else {
            meowcoin_genesis_block(self.time, self.nonce, self.bits, self.version, self.reward)
        }
    }
}

/// The mining table covering all five chain variants.
pub fn default_specs() -> Vec<GenesisSpec> {
    const TEST_LIMIT: &str = "7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    const MAIN_LIMIT: &str = "00ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff";
    vec![
        GenesisSpec {
            name: "regtest",
            time: 1_661_730_843,
            nonce: 2_541_049,
            bits: 0x207fffff,
            version: 4,
            reward: 5000 * COIN,
            pow_limit_hex: TEST_LIMIT,
        },
        GenesisSpec {
            name: "testnet",
            time: 1_661_730_843,
            nonce: 2_541_049,
            bits: 0x1e00ffff,
            version: 4,
            reward: 5000 * COIN,
            pow_limit_hex: TEST_LIMIT,
        },
        GenesisSpec {
            name: "signet",
            time: 1_661_730_843,
            nonce: 2_541_049,
            bits: 0x1e00ffff,
            version: 4,
            reward: 5000 * COIN,
            pow_limit_hex: TEST_LIMIT,
        },
        GenesisSpec {
            name: "main",
            time: 1_661_730_843,
            nonce: 351_574,
            bits: 0x1e00ffff,
            version: 4,
            reward: 5000 * COIN,
            pow_limit_hex: MAIN_LIMIT,
        },
        GenesisSpec {
            name: "testnet4",
            time: 1_770_700_000,
            nonce: 0,
            bits: 0x2000ffff,
            version: 4,
            reward: 5000 * COIN,
            pow_limit_hex: TEST_LIMIT,
        },
    ]
}

/// A mined genesis solution.
#[derive(Clone, Debug)]
pub struct MinedGenesis {
    pub chain: &'static str,
    pub nonce64: u64,
    pub mix_hash: Uint256,
    pub pow_hash: Uint256,
    pub genesis_hash: Uint256,
    pub merkle_root: Uint256,
    pub elapsed: Duration,
}

struct Solution {
    nonce: u64,
    mix: Uint256,
    pow: Uint256,
}

/// Mine one chain's genesis with `threads` workers (0 = all cores).
pub fn mine_genesis(spec: &GenesisSpec, threads: usize) -> Result<MinedGenesis, MinerError> {
    let pow_limit =
        Uint256::from_hex(spec.pow_limit_hex).expect("spec table pow limits are valid hex");
    let target = {
        let decoded = Uint256::decode_compact(spec.bits);
        if decoded.negative || decoded.overflow || decoded.target.is_zero()
            || decoded.target > pow_limit
        {
            return Err(MinerError::InvalidTarget {
                chain: spec.name,
                bits: spec.bits,
            });
        }
        decoded.target
    };

    let mut block = spec.build_block();
    block.header.height = 0;

    let threads = if threads == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        threads
    };

    // The ethash input covers only the six preamble fields, so it is one
    // hash for the whole search.
    let header_hash = ethash_input_hash(&block.header).to_le_bytes();

    let found = AtomicBool::new(false);
    let next_nonce = AtomicU64::new(0);
    let hashes = AtomicU64::new(0);
    let result: Mutex<Option<Solution>> = Mutex::new(None);
    let start = Instant::now();

    info!(chain = spec.name, threads, "mining genesis");

    std::thread::scope(|scope| {
        for worker_id in 0..threads {
            let found = &found;
            let next_nonce = &next_nonce;
            let hashes = &hashes;
            let result = &result;
            let header_hash = &header_hash;
            let spec_name = spec.name;
            scope.spawn(move || {
                // Every worker owns its thread-local epoch context.
                let ctx = epoch_context(0);
                while !found.load(Ordering::Acquire) {
                    let nonce = next_nonce.fetch_add(1, Ordering::Relaxed);
                    hashes.fetch_add(1, Ordering::Relaxed);

                    let out = progpow::hash(Flavor::Kawpow, &ctx, 0, header_hash, nonce);
                    let pow = Uint256::from_le_bytes(out.final_hash);
                    if pow <= target {
                        if !found.swap(true, Ordering::AcqRel) {
                            let mut slot = result.lock().expect("miner result lock");
                            *slot = Some(Solution {
                                nonce,
                                mix: Uint256::from_le_bytes(out.mix_hash),
                                pow,
                            });
                        }
                        break;
                    }

                    if worker_id == 0 && nonce % PROGRESS_INTERVAL == 0 && nonce > 0 {
                        let elapsed = start.elapsed().as_secs();
                        let total = hashes.load(Ordering::Relaxed);
                        let rate = if elapsed > 0 { total / elapsed } else { 0 };
                        info!(
                            chain = spec_name,
                            nonce,
                            elapsed_s = elapsed,
                            hash_rate = rate,
                            "mining progress"
                        );
                    }
                }
            });
        }
    });

    let solution = result
        .into_inner()
        .expect("miner result lock")
        .expect("search only terminates with a solution");

    block.header.nonce64 = solution.nonce;
    block.header.mix_hash = solution.mix;
    let genesis_hash = block_hash(&block.header, &MINING_SCHEDULE);

    debug!(
        chain = spec.name,
        nonce64 = solution.nonce,
        total_hashes = hashes.load(Ordering::Relaxed),
        "genesis found"
    );

    Ok(MinedGenesis {
        chain: spec.name,
        nonce64: solution.nonce,
        mix_hash: solution.mix,
        pow_hash: solution.pow,
        genesis_hash,
        merkle_root: block.header.merkle_root,
        elapsed: start.elapsed(),
    })
}
