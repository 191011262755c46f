//! SHAvite-3 512.

use super::aes::{aes_round_le, aes_round_le_nokey};

const IV: [u32; 16] = [
    0x72fccdd8, 0x79ca4727, 0x128a077b, 0x40d55aec, 0xd1901a06, 0x430ae307, 0xb29f5cd1,
    0xdf07fbfc, 0x8e45d73d, 0x681ab538, 0xbde86578, 0xdd577e47, 0xe275eade, 0x502d9fcd,
    0xb9357178, 0x022a4b9a,
];

/// Number of round-key words consumed by the 14 double-Feistel rounds.
const RK_WORDS: usize = 448;

/// Expand a 1024-bit message block and the bit counter into round keys.
///
/// Sections alternate: an AES-based non-linear expansion of 32 words, then a
/// purely linear one. The counter is folded into the first words of the
/// first four non-linear sections, one word complemented, so no two blocks
/// at different offsets share a schedule.
fn expand_key(m: &[u32; 32], count: [u32; 4]) -> [u32; RK_WORDS] {
    let mut rk = [0u32; RK_WORDS];
    rk[..32].copy_from_slice(m);

    let mut i = 32;
    let mut nonlinear_section = 0;
    while i < RK_WORDS {
        let remaining = RK_WORDS - i;
        let section = remaining.min(32);
        let nonlinear = (i / 32) % 2 == 1;
        if nonlinear {
            for g in 0..section / 4 {
                let x = [rk[i - 3], rk[i - 2], rk[i - 1], rk[i - 4]];
                let t = aes_round_le_nokey(x);
                for k in 0..4 {
                    rk[i + k] = t[k] ^ rk[i + k - 32];
                }
                if g == 0 && nonlinear_section < 4 {
                    // Counter injection, rotated per section.
                    let s = nonlinear_section;
                    rk[i] ^= count[s % 4];
                    rk[i + 1] ^= count[(s + 1) % 4];
                    rk[i + 2] ^= count[(s + 2) % 4];
                    rk[i + 3] ^= !count[(s + 3) % 4];
                }
                i += 4;
            }
            nonlinear_section += 1;
        } else {
            for _ in 0..section {
                rk[i] = rk[i - 32] ^ rk[i - 7];
                i += 1;
            }
        }
    }
    rk
}

/// Four chained AES rounds keyed from the schedule.
fn f4(x: [u32; 4], rk: &[u32], at: &mut usize) -> [u32; 4] {
    let mut x = x;
    for _ in 0..4 {
        let key = [rk[*at], rk[*at + 1], rk[*at + 2], rk[*at + 3]];
        x = aes_round_le(x, key);
        *at += 4;
    }
    x
}

fn compress(h: &mut [u32; 16], block: &[u8], count: [u32; 4]) {
    let mut m = [0u32; 32];
    for (i, word) in m.iter_mut().enumerate() {
        *word = u32::from_le_bytes(block[i * 4..i * 4 + 4].try_into().unwrap());
    }
    let rk = expand_key(&m, count);

    // State as four 128-bit quarters.
    let mut a: [u32; 4] = h[0..4].try_into().unwrap();
    let mut b: [u32; 4] = h[4..8].try_into().unwrap();
    let mut c: [u32; 4] = h[8..12].try_into().unwrap();
    let mut d: [u32; 4] = h[12..16].try_into().unwrap();

    let mut at = 0usize;
    for _ in 0..14 {
        let t = f4(b, &rk, &mut at);
        for i in 0..4 {
            a[i] ^= t[i];
        }
        let t = f4(d, &rk, &mut at);
        for i in 0..4 {
            c[i] ^= t[i];
        }
        // Rotate the quarters for the next round.
        let tmp = a;
        a = d;
        d = c;
        c = b;
        b = tmp;
    }

    // Davies-Meyer feed-forward.
    for i in 0..4 {
        h[i] ^= a[i];
        h[4 + i] ^= b[i];
        h[8 + i] ^= c[i];
        h[12 + i] ^= d[i];
    }
}

/// One-shot SHAvite-512.
pub fn shavite512(data: &[u8]) -> [u8; 64] {
    let bit_len = (data.len() as u128) * 8;

    // Padding: 0x80, zeros, 128-bit LE bit length, 16-bit LE digest size.
    let mut msg = data.to_vec();
    msg.push(0x80);
    while msg.len() % 128 != 110 {
        msg.push(0);
    }
    msg.extend_from_slice(&bit_len.to_le_bytes());
    msg.extend_from_slice(&512u16.to_le_bytes());

    let total_blocks = msg.len() / 128;
    let mut h = IV;
    for (i, block) in msg.chunks_exact(128).enumerate() {
        // Counter: message bits through this block; zero for a block that
        // carries padding only.
        let msg_bits_in_block = bit_len.saturating_sub((i as u128) * 1024).min(1024);
        let t = if i + 1 == total_blocks && msg_bits_in_block == 0 {
            0u128
        } else {
            (((i as u128) + 1) * 1024).min(bit_len)
        };
        let count = [
            t as u32,
            (t >> 32) as u32,
            (t >> 64) as u32,
            (t >> 96) as u32,
        ];
        compress(&mut h, block, count);
    }

    let mut out = [0u8; 64];
    for (i, word) in h.iter().enumerate() {
        out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_and_input_sensitive() {
        assert_eq!(shavite512(&[9u8; 64]), shavite512(&[9u8; 64]));
        assert_ne!(shavite512(&[9u8; 64]), shavite512(&[10u8; 64]));
        assert_ne!(shavite512(&[]), shavite512(&[0u8]));
    }
}
