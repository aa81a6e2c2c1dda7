use std::ops::Range;

use bitvec::prelude::*;
use serde::{Deserialize, Serialize};

use crate::decoder::DecodeError;

pub const WORD_BITS: usize = 32;

// Bit ranges, most significant bit first.
pub const OPCODE: Range<usize> = 0..6;
pub const RS: Range<usize> = 6..11;
pub const RT: Range<usize> = 11..16;
pub const RD: Range<usize> = 16..21;
pub const SHAMT: Range<usize> = 21..26;
pub const FUNCT: Range<usize> = 26..32;
pub const IMM: Range<usize> = 16..32;
pub const ADDR: Range<usize> = 6..32;

/// One encoded instruction. Its persisted form is 32 binary digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word(u32);

impl Word {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u32 {
        self.0
    }

    /// Parses one line of a binary dump. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, DecodeError> {
        let t = text.trim();
        if t.len() != WORD_BITS || !t.bytes().all(|b| b == b'0' || b == b'1') {
            return Err(DecodeError::MalformedWord { text: t.to_string() });
        }
        u32::from_str_radix(t, 2)
            .map(Self)
            .map_err(|_| DecodeError::MalformedWord { text: t.to_string() })
    }

    pub fn field(self, range: Range<usize>) -> u32 {
        self.0.view_bits::<Msb0>()[range].load_be::<u32>()
    }

    pub fn opcode(self) -> u8 {
        self.field(OPCODE) as u8
    }

    pub fn funct(self) -> u8 {
        self.field(FUNCT) as u8
    }
}

impl std::fmt::Display for Word {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:032b}", self.0)
    }
}

/// Zero-filled word under construction; fields are stored by bit range.
pub struct WordBuilder {
    bits: BitArray<u32, Msb0>,
}

impl WordBuilder {
    pub fn new(opcode: u8) -> Self {
        let mut b = Self { bits: BitArray::ZERO };
        b.set(OPCODE, opcode as u32);
        b
    }

    /// Stores the low bits of `value` that fit in `range`.
    pub fn set(&mut self, range: Range<usize>, value: u32) -> &mut Self {
        let width = range.len();
        let mask = if width >= 32 { u32::MAX } else { (1u32 << width) - 1 };
        self.bits[range].store_be(value & mask);
        self
    }

    pub fn finish(&self) -> Word {
        Word(self.bits.as_raw_slice()[0])
    }
}
