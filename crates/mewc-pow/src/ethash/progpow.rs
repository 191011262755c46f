//! ProgPoW core shared by KawPow and MeowPow.
//!
//! The two flavors run the same machine, but each carries a complete
//! parameter block of its own ([`FlavorParams`]): the program period, the
//! per-loop operation counts, and the Keccak mixing constants that bind a
//! solution to one chain. Retuning one flavor never touches the other.

use super::EpochContext;

const LANES: usize = 16;
const REGS: usize = 32;
const DAG_LOADS: usize = 4;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;

/// Algorithm flavour; the tuning lives in [`Flavor::params`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flavor {
    Kawpow,
    Meowpow,
}

/// Per-flavor tuning of the ProgPoW machine.
#[derive(Debug, PartialEq, Eq)]
pub struct FlavorParams {
    /// Blocks sharing one generated program.
    pub period_length: u32,
    /// DAG access loops per hash.
    pub cnt_dag: usize,
    /// L1 cache accesses per loop.
    pub cnt_cache: usize,
    /// Random math operations per loop.
    pub cnt_math: usize,
    /// Keccak absorb mixing constants.
    pad: [u32; 15],
}

const fn pad_words(tag: &[u8; 15]) -> [u32; 15] {
    let mut words = [0u32; 15];
    let mut i = 0;
    while i < 15 {
        words[i] = tag[i] as u32;
        i += 1;
    }
    words
}

static KAWPOW_PARAMS: FlavorParams = FlavorParams {
    period_length: 3,
    cnt_dag: 64,
    cnt_cache: 11,
    cnt_math: 18,
    pad: pad_words(b"rAVENCOINKAWPOW"),
};

static MEOWPOW_PARAMS: FlavorParams = FlavorParams {
    period_length: 3,
    cnt_dag: 64,
    cnt_cache: 11,
    cnt_math: 18,
    pad: pad_words(b"mEOWCOINMEOWPOW"),
};

impl Flavor {
    /// The flavor's parameter block.
    pub fn params(self) -> &'static FlavorParams {
        match self {
            Flavor::Kawpow => &KAWPOW_PARAMS,
            Flavor::Meowpow => &MEOWPOW_PARAMS,
        }
    }
}

/// A ProgPoW result: the light-verifiable mix and the target-checked final.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PowOutput {
    pub mix_hash: [u8; 32],
    pub final_hash: [u8; 32],
}

// Keccak-f[800]: the 32-bit permutation, 22 rounds, round constants being
// the low words of the standard Keccak constants.
const KECCAKF_RNDC: [u32; 22] = [
    0x00000001, 0x00008082, 0x0000808a, 0x80008000, 0x0000808b, 0x80000001, 0x80008081,
    0x00008009, 0x0000008a, 0x00000088, 0x80008009, 0x8000000a, 0x8000808b, 0x0000008b,
    0x00008089, 0x00008003, 0x00008002, 0x00000080, 0x0000800a, 0x8000000a, 0x80008081,
    0x00008080,
];

const KECCAKF_ROTC: [u32; 24] = [
    1, 3, 6, 10, 15, 21, 28, 4, 13, 23, 2, 14, 27, 9, 24, 8, 25, 11, 30, 18, 7, 29, 20, 12,
];

const KECCAKF_PILN: [usize; 24] = [
    10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1,
];

fn keccak_f800(state: &mut [u32; 25]) {
    for rc in KECCAKF_RNDC {
        // Theta
        let mut bc = [0u32; 5];
        for (i, b) in bc.iter_mut().enumerate() {
            *b = state[i] ^ state[i + 5] ^ state[i + 10] ^ state[i + 15] ^ state[i + 20];
        }
        for i in 0..5 {
            let t = bc[(i + 4) % 5] ^ bc[(i + 1) % 5].rotate_left(1);
            for j in (0..25).step_by(5) {
                state[j + i] ^= t;
            }
        }
        // Rho and Pi
        let mut t = state[1];
        for i in 0..24 {
            let j = KECCAKF_PILN[i];
            let tmp = state[j];
            state[j] = t.rotate_left(KECCAKF_ROTC[i]);
            t = tmp;
        }
        // Chi
        for j in (0..25).step_by(5) {
            let row: [u32; 5] = state[j..j + 5].try_into().unwrap();
            for i in 0..5 {
                state[j + i] = row[i] ^ (!row[(i + 1) % 5] & row[(i + 2) % 5]);
            }
        }
        // Iota
        state[0] ^= rc;
    }
}

#[derive(Copy, Clone)]
struct Kiss99 {
    z: u32,
    w: u32,
    jsr: u32,
    jcong: u32,
}

impl Kiss99 {
    fn next(&mut self) -> u32 {
        self.z = 36969u32
            .wrapping_mul(self.z & 0xffff)
            .wrapping_add(self.z >> 16);
        self.w = 18000u32
            .wrapping_mul(self.w & 0xffff)
            .wrapping_add(self.w >> 16);
        let mwc = (self.z << 16).wrapping_add(self.w);
        self.jsr ^= self.jsr << 17;
        self.jsr ^= self.jsr >> 13;
        self.jsr ^= self.jsr << 5;
        self.jcong = 69069u32.wrapping_mul(self.jcong).wrapping_add(1234567);
        (mwc ^ self.jcong).wrapping_add(self.jsr)
    }
}

#[inline(always)]
fn fnv1a(h: u32, d: u32) -> u32 {
    (h ^ d).wrapping_mul(0x0100_0193)
}

/// Per-period program state: the kiss99 stream plus the register
/// destination/source sequences.
struct ProgramRng {
    rnd: Kiss99,
    dst_seq: [usize; REGS],
    src_seq: [usize; REGS],
    dst_cnt: usize,
    src_cnt: usize,
}

impl ProgramRng {
    fn new(period_seed: u64) -> Self {
        let z = fnv1a(FNV_OFFSET_BASIS, period_seed as u32);
        let w = fnv1a(z, (period_seed >> 32) as u32);
        let jsr = fnv1a(w, period_seed as u32);
        let jcong = fnv1a(jsr, (period_seed >> 32) as u32);
        let mut rnd = Kiss99 { z, w, jsr, jcong };

        let mut dst_seq = [0usize; REGS];
        let mut src_seq = [0usize; REGS];
        for i in 0..REGS {
            dst_seq[i] = i;
            src_seq[i] = i;
        }
        // Fisher-Yates driven by the program stream.
        for i in (1..REGS).rev() {
            let j = (rnd.next() as usize) % (i + 1);
            dst_seq.swap(i, j);
        }
        for i in (1..REGS).rev() {
            let j = (rnd.next() as usize) % (i + 1);
            src_seq.swap(i, j);
        }

        ProgramRng {
            rnd,
            dst_seq,
            src_seq,
            dst_cnt: 0,
            src_cnt: 0,
        }
    }

    fn next_dst(&mut self) -> usize {
        let r = self.dst_seq[self.dst_cnt % REGS];
        self.dst_cnt += 1;
        r
    }

    fn next_src(&mut self) -> usize {
        let r = self.src_seq[self.src_cnt % REGS];
        self.src_cnt += 1;
        r
    }
}

fn merge(a: u32, b: u32, r: u32) -> u32 {
    match r % 4 {
        0 => a.wrapping_mul(33).wrapping_add(b),
        1 => (a ^ b).wrapping_mul(33),
        2 => a.rotate_left(((r >> 16) % 31) + 1) ^ b,
        _ => a.rotate_right(((r >> 16) % 31) + 1) ^ b,
    }
}

fn math(a: u32, b: u32, r: u32) -> u32 {
    match r % 11 {
        0 => a.wrapping_add(b),
        1 => a.wrapping_mul(b),
        2 => ((a as u64 * b as u64) >> 32) as u32,
        3 => a.min(b),
        4 => a.rotate_left(b % 32),
        5 => a.rotate_right(b % 32),
        6 => a & b,
        7 => a | b,
        8 => a ^ b,
        9 => a.leading_zeros() + b.leading_zeros(),
        _ => a.count_ones() + b.count_ones(),
    }
}

fn fill_mix(seed: u64, lane_id: u32) -> [u32; REGS] {
    // Each seed word expands independently from the offset basis.
    let mut rng = Kiss99 {
        z: fnv1a(FNV_OFFSET_BASIS, seed as u32),
        w: fnv1a(FNV_OFFSET_BASIS, (seed >> 32) as u32),
        jsr: fnv1a(FNV_OFFSET_BASIS, lane_id),
        jcong: fnv1a(FNV_OFFSET_BASIS, lane_id),
    };
    let mut mix = [0u32; REGS];
    for reg in mix.iter_mut() {
        *reg = rng.next();
    }
    mix
}

/// One DAG loop: a 2048-bit load addressed by the round-robin lane, then
/// the generated cache/math program, identical in every loop of a period.
fn progpow_loop(
    ctx: &EpochContext,
    params: &FlavorParams,
    period_seed: u64,
    loop_idx: usize,
    mix: &mut [[u32; REGS]; LANES],
) {
    let item_index = mix[loop_idx % LANES][0] % ctx.num_dataset_items();
    let item = ctx.dataset_item_2048(item_index);

    let l1 = ctx.l1();
    let mut rng = ProgramRng::new(period_seed);

    for i in 0..params.cnt_cache.max(params.cnt_math) {
        if i < params.cnt_cache {
            let src = rng.next_src();
            let dst = rng.next_dst();
            let sel = rng.rnd.next();
            for lane in mix.iter_mut() {
                let offset = lane[src] as usize % l1.len();
                lane[dst] = merge(lane[dst], l1[offset], sel);
            }
        }
        if i < params.cnt_math {
            let src_rnd = rng.rnd.next() as usize % (REGS * (REGS - 1));
            let src1 = src_rnd % REGS;
            let mut src2 = src_rnd / REGS;
            if src2 >= src1 {
                src2 += 1;
            }
            let sel1 = rng.rnd.next();
            let dst = rng.next_dst();
            let sel2 = rng.rnd.next();
            for lane in mix.iter_mut() {
                let data = math(lane[src1], lane[src2], sel1);
                lane[dst] = merge(lane[dst], data, sel2);
            }
        }
    }

    // Consume the global load at the end of the loop.
    for i in 0..DAG_LOADS {
        let dst = if i == 0 { 0 } else { rng.next_dst() };
        let sel = rng.rnd.next();
        for (l, lane) in mix.iter_mut().enumerate() {
            lane[dst] = merge(lane[dst], item[l * DAG_LOADS + i], sel);
        }
    }
}

fn absorb_seed(header_hash: &[u8; 32], nonce: u64, pad: &[u32; 15]) -> ([u32; 8], u64) {
    let mut state = [0u32; 25];
    for (i, chunk) in header_hash.chunks_exact(4).enumerate() {
        state[i] = u32::from_le_bytes(chunk.try_into().unwrap());
    }
    state[8] = nonce as u32;
    state[9] = (nonce >> 32) as u32;
    state[10..25].copy_from_slice(pad);
    keccak_f800(&mut state);

    let carry: [u32; 8] = state[..8].try_into().unwrap();
    let seed = (carry[0] as u64) | ((carry[1] as u64) << 32);
    (carry, seed)
}

fn absorb_final(carry: &[u32; 8], mix_hash: &[u32; 8], pad: &[u32; 15]) -> [u8; 32] {
    let mut state = [0u32; 25];
    state[..8].copy_from_slice(carry);
    state[8..16].copy_from_slice(mix_hash);
    state[16..25].copy_from_slice(&pad[..9]);
    keccak_f800(&mut state);

    let mut out = [0u8; 32];
    for (i, chunk) in out.chunks_exact_mut(4).enumerate() {
        chunk.copy_from_slice(&state[i].to_le_bytes());
    }
    out
}

fn reduce_mix(mix: &[[u32; REGS]; LANES]) -> [u32; 8] {
    let mut lane_hash = [0u32; LANES];
    for (l, lane) in mix.iter().enumerate() {
        let mut h = FNV_OFFSET_BASIS;
        for &reg in lane.iter() {
            h = fnv1a(h, reg);
        }
        lane_hash[l] = h;
    }
    let mut out = [FNV_OFFSET_BASIS; 8];
    for (l, &h) in lane_hash.iter().enumerate() {
        out[l % 8] = fnv1a(out[l % 8], h);
    }
    out
}

fn mix_words_to_bytes(words: &[u32; 8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    for (i, chunk) in out.chunks_exact_mut(4).enumerate() {
        chunk.copy_from_slice(&words[i].to_le_bytes());
    }
    out
}

fn mix_bytes_to_words(bytes: &[u8; 32]) -> [u32; 8] {
    let mut out = [0u32; 8];
    for (i, chunk) in bytes.chunks_exact(4).enumerate() {
        out[i] = u32::from_le_bytes(chunk.try_into().unwrap());
    }
    out
}

/// Full hash: derives the mix from the DAG and the final from the sponge.
pub fn hash(
    flavor: Flavor,
    ctx: &EpochContext,
    height: u32,
    header_hash: &[u8; 32],
    nonce: u64,
) -> PowOutput {
    let params = flavor.params();
    let (carry, seed) = absorb_seed(header_hash, nonce, &params.pad);

    let mut mix = [[0u32; REGS]; LANES];
    for (lane_id, lane) in mix.iter_mut().enumerate() {
        *lane = fill_mix(seed, lane_id as u32);
    }

    let period_seed = (height / params.period_length) as u64;
    for loop_idx in 0..params.cnt_dag {
        progpow_loop(ctx, params, period_seed, loop_idx, &mut mix);
    }

    let mix_words = reduce_mix(&mix);
    let final_hash = absorb_final(&carry, &mix_words, &params.pad);
    PowOutput {
        mix_hash: mix_words_to_bytes(&mix_words),
        final_hash,
    }
}

/// Light-client final hash: trusts the supplied mix, no DAG required.
pub fn hash_no_verify(
    flavor: Flavor,
    header_hash: &[u8; 32],
    mix_hash: &[u8; 32],
    nonce: u64,
) -> [u8; 32] {
    let pad = &flavor.params().pad;
    let (carry, _seed) = absorb_seed(header_hash, nonce, pad);
    absorb_final(&carry, &mix_bytes_to_words(mix_hash), pad)
}

/// Full verification: recompute the mix, require it to match, and check
/// the final hash against the boundary (byte-wise big-endian compare).
pub fn verify(
    flavor: Flavor,
    ctx: &EpochContext,
    height: u32,
    header_hash: &[u8; 32],
    mix_hash: &[u8; 32],
    nonce: u64,
    boundary: &[u8; 32],
) -> bool {
    let out = hash(flavor, ctx, height, header_hash, nonce);
    if &out.mix_hash != mix_hash {
        return false;
    }
    be_less_or_equal(&out.final_hash, boundary)
}

fn be_less_or_equal(hash_le: &[u8; 32], boundary_le: &[u8; 32]) -> bool {
    // Values are little-endian byte strings; compare from the top.
    for i in (0..32).rev() {
        if hash_le[i] != boundary_le[i] {
            return hash_le[i] < boundary_le[i];
        }
    }
    true
}
