//! Chain parameter registry.
//!
//! Five immutable parameter bundles, one per chain variant, constructed
//! once at process start. Construction builds the variant's genesis block
//! and checks it against the pinned hashes; a mismatch is fatal, because a
//! node with a wrong genesis silently forks from everyone.

use crate::error::{ConsensusError, ConsensusResult};
use crate::genesis;
use mewc_pow::ActivationSchedule;
use mewc_primitives::{Block, PowAlgo, SerContext, Uint256, COIN};

/// The chain variants.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ChainKind {
    Main,
    Testnet,
    Testnet4,
    Signet,
    Regtest,
}

impl ChainKind {
    /// The name used on the command line and in datadir paths.
    pub fn name(self) -> &'static str {
        match self {
            ChainKind::Main => "main",
            ChainKind::Testnet => "testnet",
            ChainKind::Testnet4 => "testnet4",
            ChainKind::Signet => "signet",
            ChainKind::Regtest => "regtest",
        }
    }
}

/// Version-bits deployment positions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeploymentPos {
    TestDummy = 0,
    Taproot = 1,
}

/// A BIP9 version-bits deployment schedule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bip9Deployment {
    /// Version bit signalling this deployment.
    pub bit: u8,
    /// Earliest signalling start (Unix seconds), or [`Self::NEVER_ACTIVE`].
    pub start_time: i64,
    /// Signalling deadline, or [`Self::NO_TIMEOUT`].
    pub timeout: i64,
    /// Earliest height activation may take effect.
    pub min_activation_height: u32,
    /// Signalling blocks required within one period.
    pub threshold: u32,
    /// Signalling period in blocks.
    pub period: u32,
}

impl Bip9Deployment {
    /// Start time meaning the deployment never begins.
    pub const NEVER_ACTIVE: i64 = -1;
    /// Timeout meaning the deployment never expires.
    pub const NO_TIMEOUT: i64 = i64::MAX;
}

/// Consensus-critical parameters of one chain variant.
#[derive(Clone, Debug)]
pub struct ConsensusParams {
    /// Blocks between subsidy halvings.
    pub subsidy_halving_interval: u32,
    /// BIP34 (height in coinbase) activation height.
    pub bip34_height: u32,
    /// BIP65 (CLTV) activation height.
    pub bip65_height: u32,
    /// BIP66 (strict DER) activation height.
    pub bip66_height: u32,
    /// CSV activation height.
    pub csv_height: u32,
    /// Segwit activation height (always active on this chain).
    pub segwit_height: u32,
    /// Height below which unknown-version warnings stay quiet.
    pub min_bip9_warning_height: u32,
    /// Per-algorithm proof-of-work ceilings, indexed by [`PowAlgo`].
    pub pow_limit: [Uint256; 2],
    /// KawPow activation time (Unix seconds).
    pub kawpow_activation_time: u32,
    /// MeowPow activation time (Unix seconds).
    pub meowpow_activation_time: u32,
    /// Legacy retarget interval span in seconds.
    pub pow_target_timespan: i64,
    /// Target block spacing in seconds.
    pub pow_target_spacing: i64,
    /// LWMA averaging window in blocks.
    pub lwma_averaging_window: i64,
    /// Allow min-difficulty blocks after a stall (test networks).
    pub pow_allow_min_difficulty_blocks: bool,
    /// Enforce BIP94 timewarp rules.
    pub enforce_bip94: bool,
    /// Disable retargeting entirely (test networks).
    pub pow_no_retargeting: bool,
    /// Version-bits deployments, indexed by [`DeploymentPos`].
    pub deployments: [Bip9Deployment; 2],
    /// Minimum accumulated work for headers pre-sync.
    pub minimum_chain_work: Uint256,
    /// Assumed-valid block hash (zero: validate everything).
    pub default_assume_valid: Uint256,
    /// Our merge-mining chain id.
    pub auxpow_chain_id: u16,
    /// Height at which merge-mining activates; zero disables it.
    pub auxpow_start_height: i64,
    /// Reject parents carrying our own chain id.
    pub strict_chain_id: bool,
    /// Signet: require block signatures.
    pub signet_blocks: bool,
    /// Signet challenge script.
    pub signet_challenge: Vec<u8>,
}

impl ConsensusParams {
    /// The proof-of-work ceiling for an algorithm family.
    pub fn pow_limit(&self, algo: PowAlgo) -> Uint256 {
        self.pow_limit[algo.limit_index()]
    }

    /// Legacy difficulty adjustment interval in blocks.
    pub fn difficulty_adjustment_interval(&self) -> i64 {
        self.pow_target_timespan / self.pow_target_spacing
    }

    /// The activation schedule for hashing and serialization.
    pub fn activation_schedule(&self) -> ActivationSchedule {
        ActivationSchedule::new(self.kawpow_activation_time, self.meowpow_activation_time)
    }

    /// The serialization context for headers of this chain.
    pub fn ser_context(&self) -> SerContext {
        self.activation_schedule().ser_context()
    }

    /// A deployment schedule.
    pub fn deployment(&self, pos: DeploymentPos) -> &Bip9Deployment {
        &self.deployments[pos as usize]
    }
}

/// Base58 and extended-key version bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base58Prefixes {
    pub pubkey_address: u8,
    pub script_address: u8,
    pub secret_key: u8,
    pub ext_public_key: [u8; 4],
    pub ext_secret_key: [u8; 4],
}

/// Rough transaction statistics used for progress estimation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ChainTxData {
    /// Timestamp of the data point.
    pub time: i64,
    /// Transactions up to that point.
    pub tx_count: u64,
    /// Estimated transactions per second after it.
    pub tx_rate: f64,
}

/// A chain variant's full parameter bundle.
#[derive(Clone, Debug)]
pub struct ChainParams {
    pub kind: ChainKind,
    pub consensus: ConsensusParams,
    /// Network message magic.
    pub message_start: [u8; 4],
    pub default_port: u16,
    pub prune_after_height: u32,
    /// Assumed blockchain size in GiB, for UI estimates.
    pub assumed_blockchain_size: u32,
    pub assumed_chain_state_size: u32,
    pub dns_seeds: Vec<&'static str>,
    /// Packed fixed seed data (none shipped yet).
    pub fixed_seeds: Vec<u8>,
    pub base58_prefixes: Base58Prefixes,
    pub bech32_hrp: &'static str,
    pub genesis: Block,
    pub default_consistency_checks: bool,
    pub is_mockable: bool,
    pub chain_tx_data: ChainTxData,
}

const MAGIC_MAIN: [u8; 4] = *b"MEWC";
const MAGIC_TEST: [u8; 4] = *b"MEWT";
const MAGIC_REGTEST: [u8; 4] = *b"DROW";

const MAINNET_GENESIS_HASH: &str =
    "000000edd819220359469c54f2614b5602ebc775ea67a64602f354bdaa320f70";
const TESTNET_GENESIS_HASH: &str =
    "000000eaab417d6dfe9bd75119972e1d07ecfe8ff655bef7c2acb3d9a0eeed81";
const GENESIS_MERKLE_ROOT: &str =
    "e8916cf6592c8433d598c3a5fe60a9741fd2a997b39d93af2d789cdd9d9a7390";

fn uint256(hex: &str) -> Uint256 {
    Uint256::from_hex(hex).expect("pinned hash constants are valid hex")
}

fn verify_genesis(
    chain: &'static str,
    genesis: &Block,
    consensus: &ConsensusParams,
    expected_hash: Option<&str>,
) -> ConsensusResult<()> {
    let expected_merkle = uint256(GENESIS_MERKLE_ROOT);
    if genesis.header.merkle_root != expected_merkle {
        return Err(ConsensusError::GenesisAssertion {
            chain,
            field: "merkle root",
            got: genesis.header.merkle_root,
            expected: expected_merkle,
        });
    }
    if let Some(expected_hash) = expected_hash {
        let expected = uint256(expected_hash);
        let got = mewc_pow::block_hash(&genesis.header, &consensus.activation_schedule());
        if got != expected {
            return Err(ConsensusError::GenesisAssertion {
                chain,
                field: "block hash",
                got,
                expected,
            });
        }
    }
    Ok(())
}

fn main_deployments() -> [Bip9Deployment; 2] {
    [
        Bip9Deployment {
            bit: 28,
            start_time: Bip9Deployment::NEVER_ACTIVE,
            timeout: Bip9Deployment::NO_TIMEOUT,
            min_activation_height: 0,
            threshold: 1815, // 90%
            period: 2016,
        },
        Bip9Deployment {
            bit: 2,
            start_time: 1_788_739_200, // Sep 7, 2026 00:00:00 UTC
            timeout: Bip9Deployment::NO_TIMEOUT,
            min_activation_height: 2_115_366, // segwit + one month at 60s spacing
            threshold: 1815,
            period: 2016,
        },
    ]
}

fn test_deployments(dummy_start: i64) -> [Bip9Deployment; 2] {
    [
        Bip9Deployment {
            bit: 28,
            start_time: dummy_start,
            timeout: Bip9Deployment::NO_TIMEOUT,
            min_activation_height: 0,
            threshold: 1512, // 75%
            period: 2016,
        },
        Bip9Deployment {
            bit: 2,
            start_time: 1_788_739_200,
            timeout: Bip9Deployment::NO_TIMEOUT,
            min_activation_height: 2_115_366,
            threshold: 1512,
            period: 2016,
        },
    ]
}

/// Consensus parameters shared by the test variants (testnet, testnet4,
/// signet, regtest differ only where overridden below).
fn test_consensus_base() -> ConsensusParams {
    ConsensusParams {
        subsidy_halving_interval: 2_100_000,
        bip34_height: 1,
        bip65_height: 1,
        bip66_height: 1,
        csv_height: 1,
        segwit_height: 0,
        min_bip9_warning_height: 2016,
        pow_limit: [
            uint256("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
            uint256("7fffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
        ],
        kawpow_activation_time: 1_661_833_868,
        meowpow_activation_time: 1_707_354_000, // Feb 4, 2024
        pow_target_timespan: 2016 * 60,
        pow_target_spacing: 60,
        lwma_averaging_window: 45,
        pow_allow_min_difficulty_blocks: true,
        enforce_bip94: false,
        pow_no_retargeting: false,
        deployments: test_deployments(Bip9Deployment::NEVER_ACTIVE),
        minimum_chain_work: Uint256::ZERO,
        default_assume_valid: Uint256::ZERO,
        auxpow_chain_id: 9,
        auxpow_start_height: 46,
        strict_chain_id: true,
        signet_blocks: false,
        signet_challenge: Vec::new(),
    }
}

fn test_base58_prefixes() -> Base58Prefixes {
    Base58Prefixes {
        pubkey_address: 109, // m
        script_address: 124,
        secret_key: 114,
        ext_public_key: [0x04, 0x35, 0x87, 0xcf],
        ext_secret_key: [0x04, 0x35, 0x83, 0x94],
    }
}

impl ChainParams {
    /// Main network on which people trade goods and services.
    pub fn main() -> ConsensusResult<ChainParams> {
        let consensus = ConsensusParams {
            pow_limit: [
                uint256("00ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
                uint256("00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
            ],
            kawpow_activation_time: 1_662_493_424, // Sep 6, 2022
            meowpow_activation_time: 1_710_799_200, // March 18, 2024 22:00:00 UTC
            pow_allow_min_difficulty_blocks: false,
            deployments: main_deployments(),
            auxpow_start_height: 1_614_560,
            ..test_consensus_base()
        };

        let genesis =
            genesis::meowcoin_genesis_block(1_661_730_843, 351_574, 0x1e00ffff, 4, 5000 * COIN);
        verify_genesis("main", &genesis, &consensus, Some(MAINNET_GENESIS_HASH))?;

        Ok(ChainParams {
            kind: ChainKind::Main,
            consensus,
            message_start: MAGIC_MAIN,
            default_port: 8788,
            prune_after_height: 100_000,
            assumed_blockchain_size: 5,
            assumed_chain_state_size: 1,
            dns_seeds: vec!["seed-mainnet-mewc.meowcoin.cc.", "dnsseed.nodeslist.xyz."],
            fixed_seeds: Vec::new(),
            base58_prefixes: Base58Prefixes {
                pubkey_address: 50,  // M
                script_address: 122, // m
                secret_key: 112,
                ext_public_key: [0x04, 0x88, 0xb2, 0x1e],
                ext_secret_key: [0x04, 0x88, 0xad, 0xe4],
            },
            bech32_hrp: "mewc",
            genesis,
            default_consistency_checks: false,
            is_mockable: false,
            chain_tx_data: ChainTxData {
                time: 1_661_730_843,
                tx_count: 50_000,
                tx_rate: 0.5,
            },
        })
    }

    /// The public test network.
    pub fn testnet() -> ConsensusResult<ChainParams> {
        let consensus = test_consensus_base();
        let genesis =
            genesis::meowcoin_genesis_block(1_661_734_222, 7_680_541, 0x1e00ffff, 4, 5000 * COIN);
        verify_genesis("testnet", &genesis, &consensus, Some(TESTNET_GENESIS_HASH))?;

        Ok(ChainParams {
            kind: ChainKind::Testnet,
            consensus,
            message_start: MAGIC_TEST,
            default_port: 4569,
            prune_after_height: 1000,
            assumed_blockchain_size: 1,
            assumed_chain_state_size: 1,
            dns_seeds: vec!["testnet-seed.meowcoin.net."],
            fixed_seeds: Vec::new(),
            base58_prefixes: test_base58_prefixes(),
            bech32_hrp: "tmewc",
            genesis,
            default_consistency_checks: false,
            is_mockable: false,
            chain_tx_data: ChainTxData {
                time: 1_661_730_843,
                tx_count: 0,
                tx_rate: 0.0,
            },
        })
    }

    /// Testnet4: same schedule as testnet.
    pub fn testnet4() -> ConsensusResult<ChainParams> {
        let mut params = Self::testnet()?;
        params.kind = ChainKind::Testnet4;
        verify_genesis(
            "testnet4",
            &params.genesis,
            &params.consensus,
            Some(TESTNET_GENESIS_HASH),
        )?;
        Ok(params)
    }

    /// Signet. Block signatures are not enforced on this chain; the
    /// variant exists for schedule parity with the test networks.
    pub fn signet() -> ConsensusResult<ChainParams> {
        let mut consensus = test_consensus_base();
        // Merge-mining never activates on signet.
        consensus.auxpow_start_height = 0;
        let genesis =
            genesis::meowcoin_genesis_block(1_661_734_222, 7_680_541, 0x1e00ffff, 4, 5000 * COIN);
        verify_genesis("signet", &genesis, &consensus, Some(TESTNET_GENESIS_HASH))?;

        Ok(ChainParams {
            kind: ChainKind::Signet,
            consensus,
            message_start: MAGIC_TEST,
            default_port: 4569,
            prune_after_height: 1000,
            assumed_blockchain_size: 1,
            assumed_chain_state_size: 1,
            dns_seeds: vec!["testnet-seed.meowcoin.net."],
            fixed_seeds: Vec::new(),
            base58_prefixes: test_base58_prefixes(),
            bech32_hrp: "tmewc",
            genesis,
            default_consistency_checks: false,
            is_mockable: false,
            chain_tx_data: ChainTxData {
                time: 1_661_730_843,
                tx_count: 0,
                tx_rate: 0.0,
            },
        })
    }

    /// Regression test chain: private, minimal difficulty, PoW algorithm
    /// switches pushed past any realistic clock.
    pub fn regtest() -> ConsensusResult<ChainParams> {
        let consensus = ConsensusParams {
            kawpow_activation_time: 3_582_830_167,
            meowpow_activation_time: 3_582_830_167,
            deployments: test_deployments(0),
            auxpow_start_height: 19_200,
            ..test_consensus_base()
        };
        let genesis = genesis::meowcoin_genesis_block(1_661_734_578, 1, 0x207fffff, 4, 5000 * COIN);
        // The regtest genesis hash is unasserted upstream; the merkle root
        // still pins the coinbase bytes.
        verify_genesis("regtest", &genesis, &consensus, None)?;

        Ok(ChainParams {
            kind: ChainKind::Regtest,
            consensus,
            message_start: MAGIC_REGTEST,
            default_port: 18_444,
            prune_after_height: 1000,
            assumed_blockchain_size: 1,
            assumed_chain_state_size: 1,
            dns_seeds: vec!["testnet-seed.meowcoin.net."],
            fixed_seeds: Vec::new(),
            base58_prefixes: test_base58_prefixes(),
            bech32_hrp: "tmewc",
            genesis,
            default_consistency_checks: false,
            is_mockable: false,
            chain_tx_data: ChainTxData {
                time: 1_661_730_843,
                tx_count: 0,
                tx_rate: 0.0,
            },
        })
    }

    /// Parameters for a chain variant by kind.
    pub fn for_kind(kind: ChainKind) -> ConsensusResult<ChainParams> {
        match kind {
            ChainKind::Main => Self::main(),
            ChainKind::Testnet => Self::testnet(),
            ChainKind::Testnet4 => Self::testnet4(),
            ChainKind::Signet => Self::signet(),
            ChainKind::Regtest => Self::regtest(),
        }
    }
}

/// Identify a chain variant from its message magic. Testnet, testnet4 and
/// signet share a magic; the most common of them is returned.
pub fn network_for_magic(magic: &[u8; 4]) -> Option<ChainKind> {
    match *magic {
        MAGIC_MAIN => Some(ChainKind::Main),
        MAGIC_TEST => Some(ChainKind::Testnet),
        MAGIC_REGTEST => Some(ChainKind::Regtest),
        _ => None,
    }
}

/// A mainnet-shaped [`ConsensusParams`] for unit tests, skipping genesis
/// construction.
#[cfg(test)]
pub(crate) fn test_params() -> ConsensusParams {
    ConsensusParams {
        pow_limit: [
            uint256("00ffffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
            uint256("00000fffffffffffffffffffffffffffffffffffffffffffffffffffffffffff"),
        ],
        kawpow_activation_time: 1_662_493_424,
        meowpow_activation_time: 1_710_799_200,
        pow_allow_min_difficulty_blocks: false,
        deployments: main_deployments(),
        auxpow_start_height: 1_614_560,
        ..test_consensus_base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_bytes_are_distinct_per_network_class() {
        assert_eq!(network_for_magic(b"MEWC"), Some(ChainKind::Main));
        assert_eq!(network_for_magic(b"MEWT"), Some(ChainKind::Testnet));
        assert_eq!(network_for_magic(b"DROW"), Some(ChainKind::Regtest));
        assert_eq!(network_for_magic(&[0, 1, 2, 3]), None);
    }

    #[test]
    fn deployment_table_values() {
        let params = test_params();
        let taproot = params.deployment(DeploymentPos::Taproot);
        assert_eq!(taproot.bit, 2);
        assert_eq!(taproot.start_time, 1_788_739_200);
        assert_eq!(taproot.threshold, 1815);
        assert_eq!(taproot.period, 2016);
        assert_eq!(taproot.min_activation_height, 2_115_366);

        let dummy = params.deployment(DeploymentPos::TestDummy);
        assert_eq!(dummy.bit, 28);
        assert_eq!(dummy.start_time, Bip9Deployment::NEVER_ACTIVE);
    }

    #[test]
    fn chain_constants() {
        let params = test_params();
        assert_eq!(params.pow_target_spacing, 60);
        assert_eq!(params.pow_target_timespan, 2016 * 60);
        assert_eq!(params.difficulty_adjustment_interval(), 2016);
        assert_eq!(params.lwma_averaging_window, 45);
        assert_eq!(params.auxpow_chain_id, 9);
        assert_eq!(params.subsidy_halving_interval, 2_100_000);
    }

    #[test]
    fn regtest_parameters() {
        let params = ChainParams::regtest().unwrap();
        assert_eq!(params.default_port, 18_444);
        assert_eq!(params.message_start, *b"DROW");
        // PoW switches sit past any realistic clock, so regtest headers
        // stay in the legacy layout.
        assert!(params.consensus.kawpow_activation_time > 3_000_000_000);
        assert_eq!(params.genesis.header.bits, 0x207fffff);
        assert_eq!(params.genesis.header.nonce, 1);
    }

    #[test]
    fn address_prefixes() {
        let main = ChainParams::main().unwrap();
        assert_eq!(main.base58_prefixes.pubkey_address, 50);
        assert_eq!(main.base58_prefixes.script_address, 122);
        assert_eq!(main.bech32_hrp, "mewc");

        let test = ChainParams::regtest().unwrap();
        assert_eq!(test.base58_prefixes.pubkey_address, 109);
        assert_eq!(test.bech32_hrp, "tmewc");
    }

    #[test]
    fn mainnet_genesis_identity() {
        // Constructing mainnet asserts the pinned genesis hash and merkle
        // root; reaching here means both held.
        let params = ChainParams::main().unwrap();
        assert_eq!(
            params.genesis.header.merkle_root,
            uint256(GENESIS_MERKLE_ROOT)
        );
        assert_eq!(params.genesis.header.time, 1_661_730_843);
        assert_eq!(params.genesis.header.nonce, 351_574);
        assert_eq!(params.genesis.header.bits, 0x1e00ffff);
    }

    #[test]
    fn test_variants_share_genesis() {
        let testnet = ChainParams::testnet().unwrap();
        let signet = ChainParams::signet().unwrap();
        let testnet4 = ChainParams::testnet4().unwrap();
        assert_eq!(testnet.genesis, signet.genesis);
        assert_eq!(testnet.genesis, testnet4.genesis);
        assert_eq!(testnet.default_port, 4569);
    }

    #[test]
    fn auxpow_start_heights() {
        assert_eq!(
            ChainParams::main().unwrap().consensus.auxpow_start_height,
            1_614_560
        );
        assert_eq!(
            ChainParams::testnet().unwrap().consensus.auxpow_start_height,
            46
        );
        assert_eq!(
            ChainParams::regtest().unwrap().consensus.auxpow_start_height,
            19_200
        );
        assert_eq!(
            ChainParams::signet().unwrap().consensus.auxpow_start_height,
            0
        );
    }
}
