//! Deterministic genesis block construction.

use mewc_primitives::{
    block_merkle_root, Block, BlockHeader, BlockVersion, Script, Transaction, TxIn, TxOut,
};

/// The timestamp proof embedded in the original genesis coinbase.
pub const GENESIS_TIMESTAMP: &str =
    "The WSJ 08/28/2022 Investors Ramp Up Bets Against Stock Market";

/// Timestamp proof of the re-mined testnet4 genesis.
pub const TESTNET4_TIMESTAMP: &str = "Meowcoin Taproot Testnet 10/Feb/2026";

/// Uncompressed public key paid by every genesis coinbase.
pub const GENESIS_OUTPUT_PUBKEY_HEX: &str =
    "04678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5f";

/// Build a genesis block from first principles.
///
/// The coinbase spends nothing, carries the timestamp proof in its
/// script, and pays the reward to `output_script`. The header is in the
/// legacy layout: every genesis predates the KawPow activation.
pub fn create_genesis_block(
    timestamp: &str,
    output_script: Script,
    time: u32,
    nonce: u32,
    bits: u32,
    version: i32,
    reward: i64,
) -> Block {
    let script_sig = Script::new()
        .push_int(0)
        .push_int(486_604_799)
        .push_int(4)
        .push_slice(timestamp.as_bytes());

    let coinbase = Transaction {
        version: 1,
        inputs: vec![TxIn::coinbase(script_sig)],
        outputs: vec![TxOut {
            value: reward,
            script_pubkey: output_script,
        }],
        lock_time: 0,
    };

    let mut block = Block {
        header: BlockHeader {
            version: BlockVersion::genesis(version),
            time,
            bits,
            nonce,
            ..Default::default()
        },
        txs: vec![coinbase],
        ..Default::default()
    };
    block.header.merkle_root = block_merkle_root(&block);
    block
}

fn genesis_output_script() -> Script {
    let pubkey = hex::decode(GENESIS_OUTPUT_PUBKEY_HEX).expect("pinned pubkey hex is valid");
    Script::new()
        .push_slice(&pubkey)
        .push_opcode(mewc_primitives::script::OP_CHECKSIG)
}

/// The chain's genesis block with the canonical timestamp and payout.
pub fn meowcoin_genesis_block(time: u32, nonce: u32, bits: u32, version: i32, reward: i64) -> Block {
    create_genesis_block(
        GENESIS_TIMESTAMP,
        genesis_output_script(),
        time,
        nonce,
        bits,
        version,
        reward,
    )
}

/// The testnet4 genesis with its own timestamp proof.
pub fn testnet4_genesis_block(time: u32, nonce: u32, bits: u32, version: i32, reward: i64) -> Block {
    create_genesis_block(
        TESTNET4_TIMESTAMP,
        genesis_output_script(),
        time,
        nonce,
        bits,
        version,
        reward,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use mewc_primitives::{serialize, Uint256, COIN};

    #[test]
    fn coinbase_script_layout() {
        let block = meowcoin_genesis_block(1_661_730_843, 351_574, 0x1e00ffff, 4, 5000 * COIN);
        let script = block.txs[0].inputs[0].script_sig.as_bytes();

        // OP_0, push4 486604799, push1 4, then the timestamp push.
        let mut expected = vec![0x00, 0x04, 0xff, 0xff, 0x00, 0x1d, 0x01, 0x04];
        expected.push(GENESIS_TIMESTAMP.len() as u8);
        expected.extend_from_slice(GENESIS_TIMESTAMP.as_bytes());
        assert_eq!(script, expected.as_slice());
    }

    #[test]
    fn output_pays_pinned_pubkey() {
        let block = meowcoin_genesis_block(1_661_730_843, 351_574, 0x1e00ffff, 4, 5000 * COIN);
        let spk = block.txs[0].outputs[0].script_pubkey.as_bytes();
        assert_eq!(spk[0], 65); // uncompressed pubkey push
        assert_eq!(spk.len(), 67);
        assert_eq!(spk[66], mewc_primitives::script::OP_CHECKSIG);
        assert_eq!(block.txs[0].outputs[0].value, 5000 * COIN);
    }

    #[test]
    fn merkle_root_matches_pinned_constant() {
        // The merkle root is identical for every variant built from the
        // original timestamp, regardless of header time or nonce.
        let expected = Uint256::from_hex(
            "e8916cf6592c8433d598c3a5fe60a9741fd2a997b39d93af2d789cdd9d9a7390",
        )
        .unwrap();
        for (time, nonce, bits) in [
            (1_661_730_843u32, 351_574u32, 0x1e00ffffu32),
            (1_661_734_222, 7_680_541, 0x1e00ffff),
            (1_661_734_578, 1, 0x207fffff),
        ] {
            let block = meowcoin_genesis_block(time, nonce, bits, 4, 5000 * COIN);
            assert_eq!(block.header.merkle_root, expected);
            assert_eq!(block.txs[0].txid(), expected);
        }
    }

    #[test]
    fn testnet4_variant_differs_only_in_timestamp() {
        let a = meowcoin_genesis_block(1_770_700_000, 0, 0x2000ffff, 4, 5000 * COIN);
        let b = testnet4_genesis_block(1_770_700_000, 0, 0x2000ffff, 4, 5000 * COIN);
        assert_ne!(a.header.merkle_root, b.header.merkle_root);
        assert_eq!(
            serialize(&a.txs[0]).len() - GENESIS_TIMESTAMP.len(),
            serialize(&b.txs[0]).len() - TESTNET4_TIMESTAMP.len(),
        );
    }
}
