//! The packed block version word.
//!
//! Merge-mining packs three fields into the 32-bit version: the base block
//! version in the low byte, the auxpow flag at bit 8, and the chain id in
//! the upper half.

use crate::serialize::{Decodable, Encodable};
use crate::PrimitivesResult;
use std::fmt;
use std::io::{Read, Write};

/// Bit marking a merge-mined block.
const VERSION_AUXPOW_BIT: i32 = 1 << 8;
/// Position of the chain id.
const VERSION_CHAIN_ID_SHIFT: u32 = 16;

/// Difficulty class of a block: which `pow_limit` applies.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PowAlgo {
    /// Native proof of work (X16RV2 / KawPow / MeowPow eras).
    Meowpow = 0,
    /// Merge-mined Scrypt parent proof of work.
    Scrypt = 1,
}

impl PowAlgo {
    /// Index into the per-algorithm `pow_limit` table.
    pub fn limit_index(self) -> usize {
        self as usize
    }
}

/// A packed 32-bit block version.
#[derive(Copy, Clone, PartialEq, Eq, Default)]
pub struct BlockVersion(i32);

impl BlockVersion {
    /// Wrap a raw version word.
    pub const fn from_raw(raw: i32) -> Self {
        BlockVersion(raw)
    }

    /// Version used by genesis blocks: just the base version, no chain id.
    pub const fn genesis(base: i32) -> Self {
        BlockVersion(base)
    }

    /// The raw packed word.
    pub const fn to_raw(self) -> i32 {
        self.0
    }

    /// Base version in the low byte.
    pub fn base_version(self) -> i32 {
        self.0 & 0xff
    }

    /// True if the auxpow flag is set.
    pub fn is_auxpow(self) -> bool {
        self.0 & VERSION_AUXPOW_BIT != 0
    }

    /// Chain id from the upper half of the word.
    pub fn chain_id(self) -> u16 {
        (self.0 >> VERSION_CHAIN_ID_SHIFT) as u16
    }

    /// The difficulty class this version selects.
    pub fn algo(self) -> PowAlgo {
        if self.is_auxpow() {
            PowAlgo::Scrypt
        } else {
            PowAlgo::Meowpow
        }
    }

    /// Set or clear the auxpow flag.
    pub fn with_auxpow(self, auxpow: bool) -> Self {
        if auxpow {
            BlockVersion(self.0 | VERSION_AUXPOW_BIT)
        } else {
            BlockVersion(self.0 & !VERSION_AUXPOW_BIT)
        }
    }

    /// Set the chain id, preserving the other fields.
    pub fn with_chain_id(self, chain_id: u16) -> Self {
        let low = self.0 & ((1 << VERSION_CHAIN_ID_SHIFT) - 1);
        BlockVersion(low | ((chain_id as i32) << VERSION_CHAIN_ID_SHIFT))
    }
}

impl fmt::Debug for BlockVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BlockVersion(base={}, auxpow={}, chain_id={})",
            self.base_version(),
            self.is_auxpow(),
            self.chain_id()
        )
    }
}

impl Encodable for BlockVersion {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        self.0.encode(w)
    }
}

impl Decodable for BlockVersion {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(BlockVersion(i32::decode(r)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_packing() {
        let v = BlockVersion::genesis(4).with_chain_id(9).with_auxpow(true);
        assert_eq!(v.base_version(), 4);
        assert_eq!(v.chain_id(), 9);
        assert!(v.is_auxpow());
        assert_eq!(v.to_raw(), 4 | 0x100 | (9 << 16));

        let v = v.with_auxpow(false);
        assert!(!v.is_auxpow());
        assert_eq!(v.chain_id(), 9);
    }

    #[test]
    fn algo_follows_auxpow_flag() {
        assert_eq!(BlockVersion::genesis(4).algo(), PowAlgo::Meowpow);
        assert_eq!(
            BlockVersion::genesis(4).with_auxpow(true).algo(),
            PowAlgo::Scrypt
        );
    }
}
