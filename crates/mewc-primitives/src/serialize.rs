//! Bitcoin-style wire serialization.
//!
//! Integers are little-endian. Collection lengths use the compact size
//! encoding (1, 3, 5 or 9 bytes). Decoding is strict: non-canonical compact
//! sizes and trailing bytes are rejected, because a consensus codec must
//! accept exactly one byte representation per value.

use crate::error::{PrimitivesError, PrimitivesResult};
use std::io::{Read, Write};

/// Sanity cap on decoded collection lengths (matches the 32 MiB network
/// message bound, so a hostile length prefix cannot trigger huge allocations).
pub const MAX_COLLECTION_LEN: u64 = 33_554_432;

/// A type with a canonical wire encoding.
pub trait Encodable {
    /// Write the wire encoding of `self`.
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()>;
}

/// A type decodable from its canonical wire encoding.
pub trait Decodable: Sized {
    /// Read a value from the wire encoding.
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self>;
}

/// Serialize a value to a fresh byte vector.
pub fn serialize<T: Encodable>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    value
        .encode(&mut out)
        .expect("writing to a Vec cannot fail");
    out
}

/// Deserialize a value, rejecting trailing bytes.
pub fn deserialize<T: Decodable>(mut bytes: &[u8]) -> PrimitivesResult<T> {
    let value = T::decode(&mut bytes)?;
    if !bytes.is_empty() {
        return Err(PrimitivesError::TrailingBytes(bytes.len()));
    }
    Ok(value)
}

macro_rules! impl_int_codec {
    ($($ty:ty),*) => {
        $(
            impl Encodable for $ty {
                fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
                    w.write_all(&self.to_le_bytes())
                }
            }

            impl Decodable for $ty {
                fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
                    let mut buf = [0u8; std::mem::size_of::<$ty>()];
                    r.read_exact(&mut buf)?;
                    Ok(<$ty>::from_le_bytes(buf))
                }
            }
        )*
    };
}

impl_int_codec!(u16, u32, u64, i32, i64);

/// Read exactly one byte.
pub fn read_u8<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<u8> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Bitcoin compact size: the length prefix used for all collections.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CompactSize(pub u64);

impl Encodable for CompactSize {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        let n = self.0;
        if n < 0xfd {
            w.write_all(&[n as u8])
        } else if n <= 0xffff {
            w.write_all(&[0xfd])?;
            w.write_all(&(n as u16).to_le_bytes())
        } else if n <= 0xffff_ffff {
            w.write_all(&[0xfe])?;
            w.write_all(&(n as u32).to_le_bytes())
        } else {
            w.write_all(&[0xff])?;
            w.write_all(&n.to_le_bytes())
        }
    }
}

impl Decodable for CompactSize {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        let tag = read_u8(r)?;
        let n = match tag {
            0xfd => {
                let n = u16::decode(r)? as u64;
                if n < 0xfd {
                    return Err(PrimitivesError::NonCanonicalCompactSize);
                }
                n
            }
            0xfe => {
                let n = u32::decode(r)? as u64;
                if n <= 0xffff {
                    return Err(PrimitivesError::NonCanonicalCompactSize);
                }
                n
            }
            0xff => {
                let n = u64::decode(r)?;
                if n <= 0xffff_ffff {
                    return Err(PrimitivesError::NonCanonicalCompactSize);
                }
                n
            }
            n => n as u64,
        };
        Ok(CompactSize(n))
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        CompactSize(self.len() as u64).encode(w)?;
        for item in self {
            item.encode(w)?;
        }
        Ok(())
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        let len = CompactSize::decode(r)?.0;
        if len > MAX_COLLECTION_LEN {
            return Err(PrimitivesError::OversizedCollection {
                got: len,
                max: MAX_COLLECTION_LEN,
            });
        }
        let mut items = Vec::with_capacity(len.min(1024) as usize);
        for _ in 0..len {
            items.push(T::decode(r)?);
        }
        Ok(items)
    }
}

/// Encode a length-prefixed byte string.
pub fn encode_bytes<W: Write + ?Sized>(bytes: &[u8], w: &mut W) -> std::io::Result<()> {
    CompactSize(bytes.len() as u64).encode(w)?;
    w.write_all(bytes)
}

/// Decode a length-prefixed byte string.
pub fn decode_bytes<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Vec<u8>> {
    let len = CompactSize::decode(r)?.0;
    if len > MAX_COLLECTION_LEN {
        return Err(PrimitivesError::OversizedCollection {
            got: len,
            max: MAX_COLLECTION_LEN,
        });
    }
    let mut bytes = vec![0u8; len as usize];
    r.read_exact(&mut bytes)?;
    Ok(bytes)
}
