use serde::{Deserialize, Serialize};

use crate::instructions::{Arity, Mnemonic, Roles};
use crate::isa::glitch::GlitchDecoder;
use crate::registers::Reg;
use crate::word::Word;

/// Operand fields of one instruction, shaped by its [`Arity`].
///
/// Branch offsets are relative to the instruction that follows the branch;
/// jump addresses are absolute instruction indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operands {
    None,
    Rs(Reg),
    Rd(Reg),
    ThreeReg { rd: Reg, rs: Reg, rt: Reg },
    RegRegImm { rt: Reg, rs: Reg, imm: i64 },
    Branch { rs: Reg, rt: Reg, offset: i64 },
    Memory { rt: Reg, base: Reg, offset: i64 },
    RegReg { rs: Reg, rt: Reg },
    Jump { addr: u32 },
}

impl Operands {
    pub fn arity(&self) -> Arity {
        match self {
            Operands::None => Arity::None,
            Operands::Rs(_) => Arity::Rs,
            Operands::Rd(_) => Arity::Rd,
            Operands::ThreeReg { .. } => Arity::ThreeReg,
            Operands::RegRegImm { .. } => Arity::RegRegImm,
            Operands::Branch { .. } => Arity::Branch,
            Operands::Memory { .. } => Arity::Memory,
            Operands::RegReg { .. } => Arity::RegReg,
            Operands::Jump { .. } => Arity::Jump,
        }
    }
}

/// A fully resolved instruction: what the encoder consumes and the decoder
/// produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Mnemonic,
    pub operands: Operands,
}

impl Instruction {
    pub fn new(op: Mnemonic, operands: Operands) -> Self {
        Self { op, operands }
    }

    /// Absolute target of a branch or jump placed at `pc`.
    pub fn target(&self, pc: u32) -> Option<i64> {
        let roles = self.op.desc().roles;
        match self.operands {
            Operands::Branch { offset, .. } if roles.contains(Roles::RELATIVE) => Some(pc as i64 + 1 + offset),
            Operands::Jump { addr } if roles.contains(Roles::ABSOLUTE) => Some(addr as i64),
            _ => None,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("malformed word `{text}`: expected 32 binary digits")]
    MalformedWord { text: String },
    #[error("unknown opcode {opcode:06b}")]
    UnknownOpcode { opcode: u8 },
    #[error("unknown register code {code:05b}")]
    UnknownRegister { code: u8 },
}

impl DecodeError {
    /// Stand-in text emitted in place of an undecodable word.
    pub fn placeholder(&self) -> String {
        match self {
            DecodeError::MalformedWord { text } => format!("MALFORMED({text})"),
            DecodeError::UnknownOpcode { opcode } => format!("UNKNOWN_OPCODE({opcode:06b})"),
            DecodeError::UnknownRegister { code } => format!("UNKNOWN_REGISTER({code:05b})"),
        }
    }
}

pub trait Decoder {
    fn decode(&self, word: Word) -> Result<Instruction, DecodeError>;
}

pub fn decode(word: Word) -> Result<Instruction, DecodeError> {
    GlitchDecoder::new().decode(word)
}
