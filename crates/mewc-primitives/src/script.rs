//! Minimal script support.
//!
//! Only the pieces that reach the header-level consensus core are modelled:
//! building the genesis coinbase `scriptSig` and output `scriptPubKey`, and
//! scanning an arbitrary coinbase `scriptSig` for the merged-mining
//! commitment. No interpreter.

use crate::serialize::{decode_bytes, encode_bytes, Decodable, Encodable};
use crate::PrimitivesResult;
use std::fmt;
use std::io::{Read, Write};

/// OP_0 / OP_FALSE: push an empty vector.
pub const OP_0: u8 = 0x00;
/// OP_CHECKSIG.
pub const OP_CHECKSIG: u8 = 0xac;
/// OP_PUSHDATA1: the next byte is the push length.
pub const OP_PUSHDATA1: u8 = 0x4c;

/// A raw script: an opaque byte string at this layer.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct Script(Vec<u8>);

impl Script {
    /// An empty script.
    pub fn new() -> Self {
        Script(Vec::new())
    }

    /// Wrap raw script bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Script(bytes)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Script length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the empty script.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a bare opcode.
    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.0.push(opcode);
        self
    }

    /// Append a data push with the shortest push prefix.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        match data.len() {
            0 => self.0.push(OP_0),
            len if len < OP_PUSHDATA1 as usize => {
                self.0.push(len as u8);
                self.0.extend_from_slice(data);
            }
            len => {
                // Pushes above 255 bytes never occur in this layer.
                debug_assert!(len <= u8::MAX as usize);
                self.0.push(OP_PUSHDATA1);
                self.0.push(len as u8);
                self.0.extend_from_slice(data);
            }
        }
        self
    }

    /// Append a script-number push (the `CScriptNum` encoding: minimal
    /// little-endian with a sign bit in the top byte; zero pushes empty).
    pub fn push_int(self, value: i64) -> Self {
        self.push_slice(&script_num_bytes(value))
    }
}

/// Minimal `CScriptNum` serialization.
fn script_num_bytes(value: i64) -> Vec<u8> {
    if value == 0 {
        return Vec::new();
    }
    let negative = value < 0;
    let mut abs = value.unsigned_abs();
    let mut bytes = Vec::new();
    while abs > 0 {
        bytes.push((abs & 0xff) as u8);
        abs >>= 8;
    }
    // If the top byte would read as a sign bit, add an explicit sign byte.
    if bytes.last().unwrap() & 0x80 != 0 {
        bytes.push(if negative { 0x80 } else { 0x00 });
    } else if negative {
        *bytes.last_mut().unwrap() |= 0x80;
    }
    bytes
}

impl fmt::Debug for Script {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Script({})", hex::encode(&self.0))
    }
}

impl Encodable for Script {
    fn encode<W: Write + ?Sized>(&self, w: &mut W) -> std::io::Result<()> {
        encode_bytes(&self.0, w)
    }
}

impl Decodable for Script {
    fn decode<R: Read + ?Sized>(r: &mut R) -> PrimitivesResult<Self> {
        Ok(Script(decode_bytes(r)?))
    }
}
