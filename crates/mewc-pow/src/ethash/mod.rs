//! Ethash-family epoch machinery: seed chain, light cache, and on-demand
//! dataset item generation.
//!
//! KawPow and MeowPow share this layer. Verification works from the light
//! cache alone: full-dataset items are derived on demand, so no gigabyte
//! DAG has to be materialised to check a block.

pub mod progpow;

use sha3::{Digest, Keccak256, Keccak512};
use std::cell::RefCell;
use std::rc::Rc;

/// Blocks per DAG epoch.
pub const EPOCH_LENGTH: u32 = 7500;

const CACHE_BYTES_INIT: u64 = 1 << 24;
const CACHE_BYTES_GROWTH: u64 = 1 << 17;
const DATASET_BYTES_INIT: u64 = 1 << 30;
const DATASET_BYTES_GROWTH: u64 = 1 << 23;
const HASH_BYTES: u64 = 64;
const MIX_BYTES: u64 = 128;
const CACHE_ROUNDS: usize = 3;
const DATASET_PARENTS: u32 = 256;

/// Bytes of the dataset mirrored into the sequential-access L1 cache.
pub const L1_CACHE_BYTES: usize = 16 * 1024;

const FNV_PRIME: u32 = 0x0100_0193;

#[inline(always)]
pub(crate) fn fnv(a: u32, b: u32) -> u32 {
    a.wrapping_mul(FNV_PRIME) ^ b
}

/// Epoch number for a block height.
pub fn epoch_number(height: u32) -> u32 {
    height / EPOCH_LENGTH
}

fn is_prime(n: u64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Light cache size in bytes for an epoch (largest prime item count under
/// the linear growth schedule).
pub fn cache_size(epoch: u32) -> u64 {
    let mut size = CACHE_BYTES_INIT + CACHE_BYTES_GROWTH * epoch as u64 - HASH_BYTES;
    while !is_prime(size / HASH_BYTES) {
        size -= 2 * HASH_BYTES;
    }
    size
}

/// Full dataset size in bytes for an epoch.
pub fn dataset_size(epoch: u32) -> u64 {
    let mut size = DATASET_BYTES_INIT + DATASET_BYTES_GROWTH * epoch as u64 - MIX_BYTES;
    while !is_prime(size / MIX_BYTES) {
        size -= 2 * MIX_BYTES;
    }
    size
}

/// Seed hash for an epoch: the zero hash advanced once per epoch.
pub fn seed_hash(epoch: u32) -> [u8; 32] {
    let mut seed = [0u8; 32];
    for _ in 0..epoch {
        seed = Keccak256::digest(seed).into();
    }
    seed
}

fn keccak512_into(data: &[u8]) -> [u8; 64] {
    Keccak512::digest(data).into()
}

/// The per-epoch verification context: seed, light cache, and the L1 slice
/// of the dataset that the ProgPoW inner loop reads sequentially.
pub struct EpochContext {
    /// Epoch number this context serves.
    pub epoch: u32,
    /// Light cache as 64-byte items.
    cache: Vec<[u8; 64]>,
    /// First 16 KiB of the full dataset as words.
    l1: Vec<u32>,
    /// Number of 2048-bit dataset items.
    num_dataset_items: u32,
}

impl EpochContext {
    /// Build the context for an epoch. This is expensive (hundreds of
    /// megabytes of Keccak work) and meant to be cached per worker.
    pub fn new(epoch: u32) -> Self {
        let num_cache_items = (cache_size(epoch) / HASH_BYTES) as usize;
        let seed = seed_hash(epoch);

        let mut cache = Vec::with_capacity(num_cache_items);
        cache.push(keccak512_into(&seed));
        for i in 1..num_cache_items {
            cache.push(keccak512_into(&cache[i - 1]));
        }

        // Memory-hardening passes over the cache.
        for _ in 0..CACHE_ROUNDS {
            for i in 0..num_cache_items {
                let v = u32::from_le_bytes(cache[i][0..4].try_into().unwrap()) as usize
                    % num_cache_items;
                let left = cache[(i + num_cache_items - 1) % num_cache_items];
                let right = cache[v];
                let mut mixed = [0u8; 64];
                for (j, byte) in mixed.iter_mut().enumerate() {
                    *byte = left[j] ^ right[j];
                }
                cache[i] = keccak512_into(&mixed);
            }
        }

        let num_dataset_items = (dataset_size(epoch) / 256) as u32;

        let mut ctx = EpochContext {
            epoch,
            cache,
            l1: Vec::new(),
            num_dataset_items,
        };
        let mut l1 = Vec::with_capacity(L1_CACHE_BYTES / 4);
        for i in 0..(L1_CACHE_BYTES as u32 / 64) {
            let item = ctx.dataset_item_512(i);
            for chunk in item.chunks_exact(4) {
                l1.push(u32::from_le_bytes(chunk.try_into().unwrap()));
            }
        }
        ctx.l1 = l1;
        ctx
    }

    /// Number of 2048-bit dataset items in this epoch.
    pub fn num_dataset_items(&self) -> u32 {
        self.num_dataset_items
    }

    pub(crate) fn l1(&self) -> &[u32] {
        &self.l1
    }

    /// Derive one 512-bit dataset item from the light cache.
    pub fn dataset_item_512(&self, index: u32) -> [u8; 64] {
        let n = self.cache.len();
        let mut mix = self.cache[index as usize % n];
        let first = u32::from_le_bytes(mix[0..4].try_into().unwrap()) ^ index;
        mix[0..4].copy_from_slice(&first.to_le_bytes());
        let mut mix = keccak512_into(&mix);

        let mut words = [0u32; 16];
        for (i, chunk) in mix.chunks_exact(4).enumerate() {
            words[i] = u32::from_le_bytes(chunk.try_into().unwrap());
        }
        for j in 0..DATASET_PARENTS {
            let parent = fnv(index ^ j, words[(j % 16) as usize]) as usize % n;
            let parent_item = &self.cache[parent];
            for (i, word) in words.iter_mut().enumerate() {
                let p = u32::from_le_bytes(parent_item[i * 4..i * 4 + 4].try_into().unwrap());
                *word = fnv(*word, p);
            }
        }
        for (i, word) in words.iter().enumerate() {
            mix[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
        }
        keccak512_into(&mix)
    }

    /// Derive one 2048-bit dataset item (four consecutive 512-bit items)
    /// as the 64 words the ProgPoW loop consumes.
    pub fn dataset_item_2048(&self, index: u32) -> [u32; 64] {
        let mut out = [0u32; 64];
        for k in 0..4u32 {
            let item = self.dataset_item_512(index * 4 + k);
            for (i, chunk) in item.chunks_exact(4).enumerate() {
                out[(k as usize) * 16 + i] = u32::from_le_bytes(chunk.try_into().unwrap());
            }
        }
        out
    }
}

thread_local! {
    static EPOCH_CONTEXT: RefCell<Option<Rc<EpochContext>>> = const { RefCell::new(None) };
}

/// The calling thread's cached context for an epoch, building it on first
/// use and whenever the epoch changes.
pub fn epoch_context(epoch: u32) -> Rc<EpochContext> {
    EPOCH_CONTEXT.with(|slot| {
        let mut slot = slot.borrow_mut();
        match slot.as_ref() {
            Some(ctx) if ctx.epoch == epoch => Rc::clone(ctx),
            _ => {
                let ctx = Rc::new(EpochContext::new(epoch));
                *slot = Some(Rc::clone(&ctx));
                ctx
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_boundaries() {
        assert_eq!(epoch_number(0), 0);
        assert_eq!(epoch_number(7499), 0);
        assert_eq!(epoch_number(7500), 1);
        assert_eq!(epoch_number(75000), 10);
    }

    #[test]
    fn seed_hash_chain() {
        assert_eq!(seed_hash(0), [0u8; 32]);
        // Keccak-256 of 32 zero bytes.
        assert_eq!(
            hex::encode(seed_hash(1)),
            "290decd9548b62a8d60345a988386fc84ba6bc95484008f6362f93160ef3e563"
        );
    }

    #[test]
    fn sizes_are_prime_multiples() {
        let cache = cache_size(0);
        assert_eq!(cache % 64, 0);
        assert!(is_prime(cache / 64));
        assert!(cache <= CACHE_BYTES_INIT);

        let dataset = dataset_size(0);
        assert_eq!(dataset % 128, 0);
        assert!(is_prime(dataset / 128));

        // Monotone growth across epochs.
        assert!(cache_size(10) > cache_size(0));
        assert!(dataset_size(10) > dataset_size(0));
    }

    #[test]
    #[ignore = "builds a full epoch-0 light cache (~16 MiB of Keccak work, minutes in debug)"]
    fn context_dataset_items_are_deterministic() {
        let ctx = EpochContext::new(0);
        assert_eq!(ctx.dataset_item_512(0), ctx.dataset_item_512(0));
        assert_ne!(ctx.dataset_item_512(0), ctx.dataset_item_512(1));
        assert_eq!(ctx.l1().len(), L1_CACHE_BYTES / 4);
    }
}
