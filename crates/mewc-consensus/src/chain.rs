//! The block-index view consumed by retargeting.

use mewc_primitives::BlockVersion;

/// The slice of a block index entry that difficulty calculation reads.
///
/// Retargeting functions take a chronological slice of these, tip last,
/// covering a contiguous range of heights.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockIndexEntry {
    /// Block height.
    pub height: i64,
    /// Block timestamp (Unix seconds).
    pub time: i64,
    /// Compact difficulty target the block was mined at.
    pub bits: u32,
    /// Packed block version (carries the auxpow flag).
    pub version: BlockVersion,
}

/// Look up the entry at `height` in a contiguous chronological slice
/// ending at the tip, if the slice reaches back that far.
pub fn ancestor(chain: &[BlockIndexEntry], height: i64) -> Option<&BlockIndexEntry> {
    let tip = chain.last()?;
    if height > tip.height || height < 0 {
        return None;
    }
    let back = (tip.height - height) as usize;
    if back >= chain.len() {
        return None;
    }
    Some(&chain[chain.len() - 1 - back])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(height: i64) -> BlockIndexEntry {
        BlockIndexEntry {
            height,
            time: height * 60,
            bits: 0x1e00ffff,
            version: BlockVersion::genesis(4),
        }
    }

    #[test]
    fn ancestor_lookup() {
        let chain: Vec<_> = (100..110).map(entry).collect();
        assert_eq!(ancestor(&chain, 109).unwrap().height, 109);
        assert_eq!(ancestor(&chain, 100).unwrap().height, 100);
        assert!(ancestor(&chain, 99).is_none());
        assert!(ancestor(&chain, 110).is_none());
        assert!(ancestor(&[], 0).is_none());
    }
}
