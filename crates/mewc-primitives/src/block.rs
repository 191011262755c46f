//! Block headers and blocks.
//!
//! The header has two wire layouts selected by block time and the auxpow
//! flag. Because the KawPow activation time differs per network, the codec
//! takes an explicit [`SerContext`] instead of consulting process-global
//! state; a header cannot be (de)serialized without knowing which network's
//! epoch schedule applies.

use crate::auxpow::AuxPow;
use crate::hash::sha256d;
use crate::serialize::{serialize, Decodable, Encodable};
use crate::transaction::Transaction;
use crate::uint256::Uint256;
use crate::version::BlockVersion;
use crate::PrimitivesResult;
use std::fmt;
use std::io::{Read, Write};

/// Serialization context for epoch-gated header fields.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SerContext {
    /// KawPow activation time of the network the bytes belong to.
    pub kawpow_activation_time: u32,
}

impl SerContext {
    /// Context with the given KawPow activation time.
    pub const fn new(kawpow_activation_time: u32) -> Self {
        SerContext {
            kawpow_activation_time,
        }
    }
}

/// The Bitcoin-shaped header projection.
///
/// This is the layout hashed for auxpow parents and for pre-KawPow block
/// identity, and the layout embedded in a merge-mined parent proof. It is a
/// distinct type rather than a special case of [`BlockHeader`] because the
/// two share only their preamble, not their meaning.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct PureHeader {
    /// Packed version word.
    pub version: BlockVersion,
    /// Hash of the previous block.
    pub prev_hash: Uint256,
    /// Merkle root of the block's transactions.
    pub merkle_root: Uint256,
    /// Block timestamp (Unix seconds).
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Legacy 32-bit nonce.
    pub nonce: u32,
}

impl PureHeader {
    /// Double SHA-256 of the 80-byte serialized header.
    pub fn hash(&self) -> Uint256 {
        Uint256::from_le_bytes(sha256d(&serialize(self)))
    }
}

impl Encodable for PureHeader {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.version.encode(w)?;
        self.prev_hash.encode(w)?;
        self.merkle_root.encode(w)?;
        self.time.encode(w)?;
        self.bits.encode(w)?;
        self.nonce.encode(w)
    }
}

impl Decodable for PureHeader {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(PureHeader {
            version: BlockVersion::decode(r)?,
            prev_hash: Uint256::decode(r)?,
            merkle_root: Uint256::decode(r)?,
            time: u32::decode(r)?,
            bits: u32::decode(r)?,
            nonce: u32::decode(r)?,
        })
    }
}

/// A full block header.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct BlockHeader {
    /// Packed version word.
    pub version: BlockVersion,
    /// Hash of the previous block.
    pub prev_hash: Uint256,
    /// Merkle root of the block's transactions.
    pub merkle_root: Uint256,
    /// Block timestamp (Unix seconds).
    pub time: u32,
    /// Compact difficulty target.
    pub bits: u32,
    /// Legacy nonce; meaningful only in the legacy/auxpow layout.
    pub nonce: u32,
    /// Block height, serialized in the KawPow layout (DAG epoch input).
    pub height: u32,
    /// Extended 64-bit nonce for the KawPow layout.
    pub nonce64: u64,
    /// KawPow/MeowPow mix hash.
    pub mix_hash: Uint256,
    /// Merge-mining attestation, present iff the version flags auxpow.
    pub auxpow: Option<Box<AuxPow>>,
}

impl BlockHeader {
    /// A header is null until its target is set.
    pub fn is_null(&self) -> bool {
        self.bits == 0
    }

    /// True if the wire layout carries the KawPow tail instead of the
    /// legacy nonce.
    pub fn uses_kawpow_layout(&self, ctx: SerContext) -> bool {
        self.time >= ctx.kawpow_activation_time && !self.version.is_auxpow()
    }

    /// The Bitcoin-shaped projection of this header.
    pub fn pure(&self) -> PureHeader {
        PureHeader {
            version: self.version,
            prev_hash: self.prev_hash,
            merkle_root: self.merkle_root,
            time: self.time,
            bits: self.bits,
            nonce: self.nonce,
        }
    }

    /// Attach or remove an auxpow proof, keeping the version flag in sync.
    pub fn set_auxpow(&mut self, auxpow: Option<AuxPow>) {
        self.version = self.version.with_auxpow(auxpow.is_some());
        self.auxpow = auxpow.map(Box::new);
    }

    /// Serialize under the given context.
    pub fn encode_with<W: Write + ?Sized>(
        &self,
        ctx: SerContext,
        w: &mut W,
    ) -> std::io::Result<()> {
        self.version.encode(w)?;
        self.prev_hash.encode(w)?;
        self.merkle_root.encode(w)?;
        self.time.encode(w)?;
        self.bits.encode(w)?;
        if self.uses_kawpow_layout(ctx) {
            // The legacy nonce is absent from this layout.
            self.height.encode(w)?;
            self.nonce64.encode(w)?;
            self.mix_hash.encode(w)
        } else {
            self.nonce.encode(w)?;
            if let Some(auxpow) = &self.auxpow {
                auxpow.encode(w)?;
            }
            Ok(())
        }
    }

    /// Deserialize under the given context. Fields absent from the selected
    /// layout are left at their defaults.
    pub fn decode_with<R: Read + ?Sized>(ctx: SerContext, r: &mut R) -> PrimitivesResult<Self> {
        let mut header = BlockHeader {
            version: BlockVersion::decode(r)?,
            prev_hash: Uint256::decode(r)?,
            merkle_root: Uint256::decode(r)?,
            time: u32::decode(r)?,
            bits: u32::decode(r)?,
            ..Default::default()
        };
        if header.uses_kawpow_layout(ctx) {
            header.height = u32::decode(r)?;
            header.nonce64 = u64::decode(r)?;
            header.mix_hash = Uint256::decode(r)?;
        } else {
            header.nonce = u32::decode(r)?;
            if header.version.is_auxpow() {
                header.auxpow = Some(Box::new(AuxPow::decode(r)?));
            }
        }
        Ok(header)
    }

    /// Serialize to a fresh byte vector under the given context.
    pub fn serialize_with(&self, ctx: SerContext) -> Vec<u8> {
        let mut out = Vec::new();
        self.encode_with(ctx, &mut out)
            .expect("writing to a Vec cannot fail");
        out
    }
}

/// A block: header plus ordered transactions, `tx[0]` the coinbase.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Block {
    /// The block header.
    pub header: BlockHeader,
    /// Transactions in consensus order.
    pub txs: Vec<Transaction>,
    /// Memory-only: structural checks have passed.
    pub checked: bool,
    /// Memory-only: the merkle root has been verified.
    pub checked_merkle_root: bool,
    /// Memory-only: the witness commitment has been verified.
    pub checked_witness_commitment: bool,
}

impl Block {
    /// Build a block around a header.
    pub fn from_header(header: BlockHeader) -> Self {
        Block {
            header,
            ..Default::default()
        }
    }

    /// Serialize under the given context.
    pub fn encode_with<W: Write + ?Sized>(
        &self,
        ctx: SerContext,
        w: &mut W,
    ) -> std::io::Result<()> {
        self.header.encode_with(ctx, w)?;
        self.txs.encode(w)
    }

    /// Deserialize under the given context. Check caches reset to false.
    pub fn decode_with<R: Read + ?Sized>(ctx: SerContext, r: &mut R) -> PrimitivesResult<Self> {
        let header = BlockHeader::decode_with(ctx, r)?;
        let txs = Vec::decode(r)?;
        Ok(Block {
            header,
            txs,
            ..Default::default()
        })
    }
}

impl fmt::Display for BlockHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockHeader(ver={:#x}, prev={}, merkle={}, time={}, bits={:08x}, nonce={}, nonce64={}, auxpow={})",
            self.version.to_raw(),
            self.prev_hash,
            self.merkle_root,
            self.time,
            self.bits,
            self.nonce,
            self.nonce64,
            self.auxpow.is_some(),
        )
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Block({}, vtx={})", self.header, self.txs.len())
    }
}
