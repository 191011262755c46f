//! Blue Midnight Wish (BMW-512).

const IV: [u64; 16] = [
    0x8081828384858687,
    0x88898a8b8c8d8e8f,
    0x9091929394959697,
    0x98999a9b9c9d9e9f,
    0xa0a1a2a3a4a5a6a7,
    0xa8a9aaabacadaeaf,
    0xb0b1b2b3b4b5b6b7,
    0xb8b9babbbcbdbebf,
    0xc0c1c2c3c4c5c6c7,
    0xc8c9cacbcccdcecf,
    0xd0d1d2d3d4d5d6d7,
    0xd8d9dadbdcdddedf,
    0xe0e1e2e3e4e5e6e7,
    0xe8e9eaebecedeeef,
    0xf0f1f2f3f4f5f6f7,
    0xf8f9fafbfcfdfeff,
];

/// Final-round constant state ("CONST" in the specification).
const FINAL: [u64; 16] = [
    0xaaaaaaaaaaaaaaa0,
    0xaaaaaaaaaaaaaaa1,
    0xaaaaaaaaaaaaaaa2,
    0xaaaaaaaaaaaaaaa3,
    0xaaaaaaaaaaaaaaa4,
    0xaaaaaaaaaaaaaaa5,
    0xaaaaaaaaaaaaaaa6,
    0xaaaaaaaaaaaaaaa7,
    0xaaaaaaaaaaaaaaa8,
    0xaaaaaaaaaaaaaaa9,
    0xaaaaaaaaaaaaaaaa,
    0xaaaaaaaaaaaaaaab,
    0xaaaaaaaaaaaaaaac,
    0xaaaaaaaaaaaaaaad,
    0xaaaaaaaaaaaaaaae,
    0xaaaaaaaaaaaaaaaf,
];

#[inline(always)]
fn s0(x: u64) -> u64 {
    (x >> 1) ^ (x << 3) ^ x.rotate_left(4) ^ x.rotate_left(37)
}
#[inline(always)]
fn s1(x: u64) -> u64 {
    (x >> 1) ^ (x << 2) ^ x.rotate_left(13) ^ x.rotate_left(43)
}
#[inline(always)]
fn s2(x: u64) -> u64 {
    (x >> 2) ^ (x << 1) ^ x.rotate_left(19) ^ x.rotate_left(53)
}
#[inline(always)]
fn s3(x: u64) -> u64 {
    (x >> 2) ^ (x << 2) ^ x.rotate_left(28) ^ x.rotate_left(59)
}
#[inline(always)]
fn s4(x: u64) -> u64 {
    (x >> 1) ^ x
}
#[inline(always)]
fn s5(x: u64) -> u64 {
    (x >> 2) ^ x
}

const SB: [fn(u64) -> u64; 6] = [s0, s1, s2, s3, s4, s5];
const RB_SHIFTS: [u32; 7] = [5, 11, 27, 32, 37, 43, 53];

#[inline(always)]
fn k(j: u64) -> u64 {
    j.wrapping_mul(0x0555555555555555)
}

/// Index/sign schedule of the W quantities in f0. Each row: five
/// (index, add?) terms over `m[i] ^ h[i]`.
const W_SCHEDULE: [[(usize, bool); 5]; 16] = [
    [(5, true), (7, false), (10, true), (13, true), (14, true)],
    [(6, true), (8, false), (11, true), (14, true), (15, false)],
    [(0, true), (7, true), (9, true), (12, false), (15, true)],
    [(0, true), (1, false), (8, true), (10, false), (13, true)],
    [(1, true), (2, true), (9, true), (11, false), (14, false)],
    [(3, true), (2, false), (10, true), (12, false), (15, true)],
    [(4, true), (0, false), (3, false), (11, false), (13, true)],
    [(1, true), (4, false), (5, false), (12, false), (14, false)],
    [(2, true), (5, false), (6, false), (13, true), (15, false)],
    [(0, true), (3, false), (6, true), (7, false), (14, true)],
    [(8, true), (1, false), (4, false), (7, false), (15, true)],
    [(8, true), (0, false), (2, false), (5, false), (9, true)],
    [(1, true), (3, true), (6, false), (9, false), (10, true)],
    [(2, true), (4, true), (7, true), (10, true), (11, true)],
    [(3, true), (5, false), (8, true), (11, false), (12, false)],
    [(12, true), (4, false), (6, false), (9, false), (13, true)],
];

fn add_elt(m: &[u64; 16], h: &[u64; 16], j: usize) -> u64 {
    let rot = |i: usize| m[i & 15].rotate_left(((i & 15) as u32) + 1);
    rot(j)
        .wrapping_add(rot(j + 3))
        .wrapping_sub(rot(j + 10))
        .wrapping_add(k((j + 16) as u64))
        ^ h[(j + 7) & 15]
}

fn compress(m: &[u64; 16], h: &[u64; 16]) -> [u64; 16] {
    let mut q = [0u64; 32];

    // f0: bijective transform of m ^ h.
    for (i, row) in W_SCHEDULE.iter().enumerate() {
        let mut w = 0u64;
        for &(idx, add) in row {
            let term = m[idx] ^ h[idx];
            w = if add {
                w.wrapping_add(term)
            } else {
                w.wrapping_sub(term)
            };
        }
        q[i] = SB[i % 5](w).wrapping_add(h[(i + 1) & 15]);
    }

    // f1: two expand1 rounds, fourteen expand2 rounds.
    for i in 16..18 {
        let mut acc = add_elt(m, h, i - 16);
        for j in 0..16 {
            acc = acc.wrapping_add(SB[(j + 1) % 4](q[i - 16 + j]));
        }
        q[i] = acc;
    }
    for i in 18..32 {
        let mut acc = q[i - 16]
            .wrapping_add(q[i - 14])
            .wrapping_add(q[i - 12])
            .wrapping_add(q[i - 10])
            .wrapping_add(q[i - 8])
            .wrapping_add(q[i - 6])
            .wrapping_add(q[i - 4]);
        for (n, &shift) in RB_SHIFTS.iter().enumerate() {
            acc = acc.wrapping_add(q[i - 15 + 2 * n].rotate_left(shift));
        }
        acc = acc
            .wrapping_add(s4(q[i - 2]))
            .wrapping_add(s5(q[i - 1]))
            .wrapping_add(add_elt(m, h, i - 16));
        q[i] = acc;
    }

    // f2: fold back into 16 words.
    let mut xl = 0u64;
    for &qi in &q[16..24] {
        xl ^= qi;
    }
    let mut xh = xl;
    for &qi in &q[24..32] {
        xh ^= qi;
    }

    let mut out = [0u64; 16];
    out[0] = ((xh << 5) ^ (q[16] >> 5) ^ m[0]).wrapping_add(xl ^ q[24] ^ q[0]);
    out[1] = ((xh >> 7) ^ (q[17] << 8) ^ m[1]).wrapping_add(xl ^ q[25] ^ q[1]);
    out[2] = ((xh >> 5) ^ (q[18] << 5) ^ m[2]).wrapping_add(xl ^ q[26] ^ q[2]);
    out[3] = ((xh >> 1) ^ (q[19] << 5) ^ m[3]).wrapping_add(xl ^ q[27] ^ q[3]);
    out[4] = ((xh >> 3) ^ q[20] ^ m[4]).wrapping_add(xl ^ q[28] ^ q[4]);
    out[5] = ((xh << 6) ^ (q[21] >> 6) ^ m[5]).wrapping_add(xl ^ q[29] ^ q[5]);
    out[6] = ((xh >> 4) ^ (q[22] << 6) ^ m[6]).wrapping_add(xl ^ q[30] ^ q[6]);
    out[7] = ((xh >> 11) ^ (q[23] << 2) ^ m[7]).wrapping_add(xl ^ q[31] ^ q[7]);
    out[8] = out[4]
        .rotate_left(9)
        .wrapping_add(xh ^ q[24] ^ m[8])
        .wrapping_add((xl << 8) ^ q[23] ^ q[8]);
    out[9] = out[5]
        .rotate_left(10)
        .wrapping_add(xh ^ q[25] ^ m[9])
        .wrapping_add((xl >> 6) ^ q[16] ^ q[9]);
    out[10] = out[6]
        .rotate_left(11)
        .wrapping_add(xh ^ q[26] ^ m[10])
        .wrapping_add((xl << 6) ^ q[17] ^ q[10]);
    out[11] = out[7]
        .rotate_left(12)
        .wrapping_add(xh ^ q[27] ^ m[11])
        .wrapping_add((xl << 4) ^ q[18] ^ q[11]);
    out[12] = out[0]
        .rotate_left(13)
        .wrapping_add(xh ^ q[28] ^ m[12])
        .wrapping_add((xl >> 3) ^ q[19] ^ q[12]);
    out[13] = out[1]
        .rotate_left(14)
        .wrapping_add(xh ^ q[29] ^ m[13])
        .wrapping_add((xl >> 4) ^ q[20] ^ q[13]);
    out[14] = out[2]
        .rotate_left(15)
        .wrapping_add(xh ^ q[30] ^ m[14])
        .wrapping_add((xl >> 7) ^ q[21] ^ q[14]);
    out[15] = out[3]
        .rotate_left(16)
        .wrapping_add(xh ^ q[31] ^ m[15])
        .wrapping_add((xl >> 2) ^ q[22] ^ q[15]);
    out
}

/// One-shot BMW-512.
pub fn bmw512(data: &[u8]) -> [u8; 64] {
    let bit_len = (data.len() as u64) * 8;

    // Padding: 0x80, zeros, 64-bit little-endian bit length.
    let mut msg = data.to_vec();
    msg.push(0x80);
    while msg.len() % 128 != 120 {
        msg.push(0);
    }
    msg.extend_from_slice(&bit_len.to_le_bytes());

    let mut h = IV;
    for block in msg.chunks_exact(128) {
        let mut m = [0u64; 16];
        for (i, word) in m.iter_mut().enumerate() {
            *word = u64::from_le_bytes(block[i * 8..i * 8 + 8].try_into().unwrap());
        }
        h = compress(&m, &h);
    }

    // Finalisation pass with the constant state as chaining value.
    let h = compress(&h, &FINAL);

    let mut out = [0u8; 64];
    for (i, word) in h[8..16].iter().enumerate() {
        out[i * 8..i * 8 + 8].copy_from_slice(&word.to_le_bytes());
    }
    out
}
