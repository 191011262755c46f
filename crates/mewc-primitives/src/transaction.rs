//! Transactions, reduced to what the header core consumes.
//!
//! Only the legacy (pre-witness) serialization is implemented: the genesis
//! coinbase and AuxPoW parent coinbases are legacy transactions, and nothing
//! else at this layer touches transaction bytes.

use crate::hash::sha256d;
use crate::script::Script;
use crate::serialize::{serialize, Decodable, Encodable};
use crate::uint256::Uint256;
use crate::PrimitivesResult;
use std::io::{Read, Write};

/// Number of atomic units per coin.
pub const COIN: i64 = 100_000_000;

/// A reference to an output of a previous transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutPoint {
    /// Transaction id of the referenced output.
    pub txid: Uint256,
    /// Output index, `u32::MAX` for coinbase inputs.
    pub vout: u32,
}

impl OutPoint {
    /// The null outpoint used by coinbase inputs.
    pub const fn null() -> Self {
        OutPoint {
            txid: Uint256::ZERO,
            vout: u32::MAX,
        }
    }

    /// True for the coinbase marker outpoint.
    pub fn is_null(&self) -> bool {
        self.txid.is_zero() && self.vout == u32::MAX
    }
}

impl Encodable for OutPoint {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.txid.encode(w)?;
        self.vout.encode(w)
    }
}

impl Decodable for OutPoint {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(OutPoint {
            txid: Uint256::decode(r)?,
            vout: u32::decode(r)?,
        })
    }
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    /// The output being spent.
    pub prevout: OutPoint,
    /// Spend script (coinbase payload for coinbase inputs).
    pub script_sig: Script,
    /// Sequence number.
    pub sequence: u32,
}

impl TxIn {
    /// Final sequence number (no locktime semantics).
    pub const SEQUENCE_FINAL: u32 = u32::MAX;

    /// Build a coinbase input carrying the given script.
    pub fn coinbase(script_sig: Script) -> Self {
        TxIn {
            prevout: OutPoint::null(),
            script_sig,
            sequence: Self::SEQUENCE_FINAL,
        }
    }
}

impl Encodable for TxIn {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.prevout.encode(w)?;
        self.script_sig.encode(w)?;
        self.sequence.encode(w)
    }
}

impl Decodable for TxIn {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(TxIn {
            prevout: OutPoint::decode(r)?,
            script_sig: Script::decode(r)?,
            sequence: u32::decode(r)?,
        })
    }
}

/// A transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in atomic units.
    pub value: i64,
    /// Locking script.
    pub script_pubkey: Script,
}

impl Encodable for TxOut {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.value.encode(w)?;
        self.script_pubkey.encode(w)
    }
}

impl Decodable for TxOut {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(TxOut {
            value: i64::decode(r)?,
            script_pubkey: Script::decode(r)?,
        })
    }
}

/// A transaction in legacy serialization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    /// Transaction format version.
    pub version: u32,
    /// Inputs; exactly one null-prevout input for coinbases.
    pub inputs: Vec<TxIn>,
    /// Outputs.
    pub outputs: Vec<TxOut>,
    /// Lock time.
    pub lock_time: u32,
}

impl Transaction {
    /// True if this is a coinbase transaction.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1 && self.inputs[0].prevout.is_null()
    }

    /// Transaction id: double SHA-256 of the serialized transaction.
    pub fn txid(&self) -> Uint256 {
        Uint256::from_le_bytes(sha256d(&serialize(self)))
    }
}

impl Encodable for Transaction {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.version.encode(w)?;
        self.inputs.encode(w)?;
        self.outputs.encode(w)?;
        self.lock_time.encode(w)
    }
}

impl Decodable for Transaction {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(Transaction {
            version: u32::decode(r)?,
            inputs: Vec::decode(r)?,
            outputs: Vec::decode(r)?,
            lock_time: u32::decode(r)?,
        })
    }
}
