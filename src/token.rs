use std::fmt;
use std::io::{self, Write};

use crate::bitio::BitWriter;

pub const POSITION_BITS: u8 = 12;
pub const LENGTH_BITS: u8 = 4;
const LENGTH_MASK: u16 = (1 << LENGTH_BITS) - 1;

/// Flag bit announcing a match token
pub const MATCH_FLAG: u32 = 0b1;

/// A back-reference into the history window.
///
/// `position` is relative to the window's current contents (0 is the oldest
/// retained byte). Packs into 16 bits as `position << 4 | length`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reference {
    pub position: u16,
    pub length: u8,
}

impl Reference {
    pub fn new(position: u16, length: u8) -> Self {
        Self { position, length }
    }

    pub fn pack(&self) -> u16 {
        (self.position << LENGTH_BITS) | (self.length as u16 & LENGTH_MASK)
    }

    pub fn unpack(bits: u16) -> Self {
        Self { position: bits >> LENGTH_BITS, length: (bits & LENGTH_MASK) as u8 }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reference: {}, {}", self.position, self.length)
    }
}

/// One unit of the compressed stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Flag 0 followed by 8 raw bits
    Literal(u8),
    /// Flag 1 followed by a packed 16-bit reference
    Match(Reference),
}

impl Token {
    pub fn write_to<W: Write>(&self, writer: &mut BitWriter<W>) -> io::Result<()> {
        match *self {
            Token::Literal(byte) => {
                writer.write_bits(0, 1)?;
                writer.write_bits(byte as u32, 8)
            }
            Token::Match(reference) => {
                writer.write_bits(MATCH_FLAG, 1)?;
                writer.write_bits(reference.pack() as u32, POSITION_BITS + LENGTH_BITS)
            }
        }
    }

    /// Size of the token in the bitstream
    pub fn bit_len(&self) -> u64 {
        match self {
            Token::Literal(_) => 9,
            Token::Match(_) => 1 + (POSITION_BITS + LENGTH_BITS) as u64,
        }
    }
}
