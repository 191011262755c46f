//! Fixed-width 256-bit unsigned integers and the compact target encoding.
//!
//! `Uint256` follows Bitcoin's `arith_uint256` semantics exactly: arithmetic
//! wraps modulo 2^256, comparisons are value comparisons, and the compact
//! (`nBits`) form is an 8-bit exponent plus 24-bit mantissa with a sign bit.
//! Hex display uses the byte-reversed convention shared by every
//! Bitcoin-derived chain.

use crate::error::{PrimitivesError, PrimitivesResult};
use crate::serialize::{Decodable, Encodable};
use std::cmp::Ordering;
use std::fmt;
use std::io::{Read, Write};
use std::str::FromStr;

/// A 256-bit unsigned integer stored as four little-endian 64-bit limbs.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Uint256([u64; 4]);

/// Result of decoding a compact (`nBits`) target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompactDecode {
    /// The decoded 256-bit target (low bits if the encoding overflowed).
    pub target: Uint256,
    /// The sign bit was set with a non-zero mantissa.
    pub negative: bool,
    /// The value does not fit in 256 bits.
    pub overflow: bool,
}

impl Uint256 {
    /// The zero value.
    pub const ZERO: Uint256 = Uint256([0; 4]);

    /// Maximum representable value (2^256 - 1).
    pub const MAX: Uint256 = Uint256([u64::MAX; 4]);

    /// Construct from a small integer.
    pub const fn from_u64(n: u64) -> Self {
        Uint256([n, 0, 0, 0])
    }

    /// Construct from 32 little-endian bytes.
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            *limb = u64::from_le_bytes(bytes[i * 8..i * 8 + 8].try_into().unwrap());
        }
        Uint256(limbs)
    }

    /// The 32-byte little-endian representation.
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        for (i, limb) in self.0.iter().enumerate() {
            bytes[i * 8..i * 8 + 8].copy_from_slice(&limb.to_le_bytes());
        }
        bytes
    }

    /// Parse from the display convention: 64 hex characters, most
    /// significant byte first.
    pub fn from_hex(s: &str) -> PrimitivesResult<Self> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        if s.len() != 64 {
            return Err(PrimitivesError::InvalidHexLength {
                expected: 64,
                got: s.len(),
            });
        }
        let mut bytes: [u8; 32] = hex::decode(s)?
            .try_into()
            .expect("64 hex chars decode to 32 bytes");
        bytes.reverse();
        Ok(Self::from_le_bytes(bytes))
    }

    /// Hex in the display convention (most significant byte first).
    pub fn to_hex(self) -> String {
        let mut bytes = self.to_le_bytes();
        bytes.reverse();
        hex::encode(bytes)
    }

    /// True if the value is zero.
    pub fn is_zero(self) -> bool {
        self.0 == [0; 4]
    }

    /// Lowest 64 bits.
    pub fn low_u64(self) -> u64 {
        self.0[0]
    }

    /// Position of the highest set bit plus one; zero for the zero value.
    pub fn bits(self) -> u32 {
        for i in (0..4).rev() {
            if self.0[i] != 0 {
                return (i as u32) * 64 + (64 - self.0[i].leading_zeros());
            }
        }
        0
    }

    /// Wrapping addition modulo 2^256.
    pub fn wrapping_add(self, rhs: Uint256) -> Uint256 {
        let mut out = [0u64; 4];
        let mut carry = 0u64;
        for i in 0..4 {
            let (sum, c1) = self.0[i].overflowing_add(rhs.0[i]);
            let (sum, c2) = sum.overflowing_add(carry);
            out[i] = sum;
            carry = (c1 as u64) + (c2 as u64);
        }
        Uint256(out)
    }

    /// Wrapping multiplication by a 64-bit factor, modulo 2^256.
    pub fn wrapping_mul_u64(self, rhs: u64) -> Uint256 {
        let mut out = [0u64; 4];
        let mut carry = 0u128;
        for i in 0..4 {
            let product = self.0[i] as u128 * rhs as u128 + carry;
            out[i] = product as u64;
            carry = product >> 64;
        }
        Uint256(out)
    }

    /// Division by a non-zero 64-bit divisor.
    pub fn div_u64(self, rhs: u64) -> Uint256 {
        debug_assert!(rhs != 0, "division by zero");
        let mut out = [0u64; 4];
        let mut rem = 0u128;
        for i in (0..4).rev() {
            let acc = (rem << 64) | self.0[i] as u128;
            out[i] = (acc / rhs as u128) as u64;
            rem = acc % rhs as u128;
        }
        Uint256(out)
    }

    /// Left shift, saturating to zero past 255 bits.
    pub fn shl(self, shift: u32) -> Uint256 {
        if shift >= 256 {
            return Uint256::ZERO;
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut out = [0u64; 4];
        for i in (limb_shift..4).rev() {
            let mut limb = self.0[i - limb_shift] << bit_shift;
            if bit_shift > 0 && i > limb_shift {
                limb |= self.0[i - limb_shift - 1] >> (64 - bit_shift);
            }
            out[i] = limb;
        }
        Uint256(out)
    }

    /// Right shift, saturating to zero past 255 bits.
    pub fn shr(self, shift: u32) -> Uint256 {
        if shift >= 256 {
            return Uint256::ZERO;
        }
        let limb_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        let mut out = [0u64; 4];
        for i in 0..(4 - limb_shift) {
            let mut limb = self.0[i + limb_shift] >> bit_shift;
            if bit_shift > 0 && i + limb_shift + 1 < 4 {
                limb |= self.0[i + limb_shift + 1] << (64 - bit_shift);
            }
            out[i] = limb;
        }
        Uint256(out)
    }

    /// Decode a compact (`nBits`) target.
    ///
    /// The compact form is `exponent << 24 | mantissa`, with bit 23 of the
    /// mantissa acting as a sign bit. `target = mantissa * 256^(exponent-3)`.
    pub fn decode_compact(bits: u32) -> CompactDecode {
        let exponent = bits >> 24;
        let mut mantissa = bits & 0x007f_ffff;

        let target = if exponent <= 3 {
            mantissa >>= 8 * (3 - exponent);
            Uint256::from_u64(mantissa as u64)
        } else {
            Uint256::from_u64(mantissa as u64).shl(8 * (exponent - 3))
        };

        let negative = mantissa != 0 && (bits & 0x0080_0000) != 0;
        let overflow = mantissa != 0
            && (exponent > 34
                || (mantissa > 0xff && exponent > 33)
                || (mantissa > 0xffff && exponent > 32));

        CompactDecode {
            target,
            negative,
            overflow,
        }
    }

    /// Encode this (non-negative) value in compact form.
    pub fn to_compact(self) -> u32 {
        let mut size = (self.bits() + 7) / 8;
        let mut compact = if size <= 3 {
            (self.low_u64() << (8 * (3 - size))) as u32
        } else {
            self.shr(8 * (size - 3)).low_u64() as u32
        };
        // The compact mantissa is signed; shift out a high bit that would
        // read as a sign.
        if compact & 0x0080_0000 != 0 {
            compact >>= 8;
            size += 1;
        }
        compact | (size << 24)
    }
}

impl Ord for Uint256 {
    fn cmp(&self, other: &Self) -> Ordering {
        for i in (0..4).rev() {
            match self.0[i].cmp(&other.0[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }
}

impl PartialOrd for Uint256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Uint256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Uint256({})", self.to_hex())
    }
}

impl FromStr for Uint256 {
    type Err = PrimitivesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Encodable for Uint256 {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        w.write_all(&self.to_le_bytes())
    }
}

impl Decodable for Uint256 {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        let mut bytes = [0u8; 32];
        r.read_exact(&mut bytes)?;
        Ok(Self::from_le_bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn hex_display_is_byte_reversed() {
        let one = Uint256::from_u64(1);
        assert_eq!(
            one.to_hex(),
            "0000000000000000000000000000000000000000000000000000000000000001"
        );
        assert_eq!(Uint256::from_hex(&one.to_hex()).unwrap(), one);
    }

    #[test]
    fn compact_decodes_known_limits() {
        // The genesis difficulty.
        let decoded = Uint256::decode_compact(0x1e00ffff);
        assert!(!decoded.negative && !decoded.overflow);
        assert_eq!(
            decoded.target.to_hex(),
            "000000ffff000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(decoded.target.to_compact(), 0x1e00ffff);

        // Regtest limit.
        let decoded = Uint256::decode_compact(0x207fffff);
        assert!(!decoded.negative && !decoded.overflow);
        assert_eq!(
            decoded.target.to_hex(),
            "7fffff0000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(decoded.target.to_compact(), 0x207fffff);

        // Bitcoin's historical limit.
        let decoded = Uint256::decode_compact(0x1d00ffff);
        assert_eq!(
            decoded.target.to_hex(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(decoded.target.to_compact(), 0x1d00ffff);
    }

    #[test]
    fn compact_flags() {
        // Sign bit with non-zero mantissa.
        let decoded = Uint256::decode_compact(0x0480_0001);
        assert!(decoded.negative);

        // Exponent too large to fit in 256 bits.
        let decoded = Uint256::decode_compact(0xff00_00ff);
        assert!(decoded.overflow);

        // Zero mantissa is neither negative nor overflowing.
        let decoded = Uint256::decode_compact(0x2300_0000);
        assert!(!decoded.negative && !decoded.overflow);
        assert!(decoded.target.is_zero());
    }

    #[test]
    fn mul_div_roundtrip() {
        let target = Uint256::decode_compact(0x1e00ffff).target;
        let scaled = target.wrapping_mul_u64(180).div_u64(180);
        assert_eq!(scaled, target);
    }

    #[test]
    fn shifts() {
        let one = Uint256::from_u64(1);
        assert_eq!(one.shl(255).shr(255), one);
        assert_eq!(one.shl(256), Uint256::ZERO);
        assert_eq!(one.shl(64).low_u64(), 0);
        assert_eq!(one.shl(64).shr(64), one);
    }

    #[test]
    fn wrapping_add_carries() {
        let max = Uint256::MAX;
        assert_eq!(max.wrapping_add(Uint256::from_u64(1)), Uint256::ZERO);
    }

    proptest! {
        #[test]
        fn hex_roundtrip(bytes in prop::array::uniform32(any::<u8>())) {
            let value = Uint256::from_le_bytes(bytes);
            prop_assert_eq!(Uint256::from_hex(&value.to_hex()).unwrap(), value);
        }

        #[test]
        fn compact_roundtrip_via_encode(bytes in prop::array::uniform32(any::<u8>())) {
            // Invariant: any compact encoding we produce decodes back to the
            // same encoding (compact(decode(bits)) == bits).
            let value = Uint256::from_le_bytes(bytes);
            prop_assume!(!value.is_zero());
            let bits = value.to_compact();
            let decoded = Uint256::decode_compact(bits);
            prop_assert!(!decoded.negative);
            prop_assert!(!decoded.overflow);
            prop_assert_eq!(decoded.target.to_compact(), bits);
        }

        #[test]
        fn div_undoes_mul(bytes in prop::array::uniform32(any::<u8>()), factor in 1u64..=10_000) {
            let value = Uint256::from_le_bytes(bytes).shr(16);
            prop_assert_eq!(value.wrapping_mul_u64(factor).div_u64(factor), value);
        }
    }
}
