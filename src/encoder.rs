use crate::decoder::{Instruction, Operands};
use crate::instructions::{Format, Mnemonic};
use crate::registers::Reg;
use crate::word::{Word, WordBuilder, ADDR, FUNCT, IMM, RD, RS, RT};

pub const IMM_MIN: i64 = i16::MIN as i64;
pub const IMM_MAX: i64 = i16::MAX as i64;
pub const ADDR_MAX: u32 = (1 << 26) - 1;

/// Why one source instruction could not be turned into a word.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown instruction: {0}")]
    UnknownInstruction(String),
    #[error("unknown register: {0}")]
    UnknownRegister(String),
    #[error("{mnemonic} takes {expected} operand(s), found {found}")]
    OperandCountMismatch { mnemonic: Mnemonic, expected: usize, found: usize },
    #[error("immediate {value} out of range [{min}, {max}]")]
    ImmediateOutOfRange { value: i64, min: i64, max: i64 },
    #[error("invalid jump target: {0}")]
    InvalidJumpTarget(String),
    #[error("invalid immediate: {0}")]
    InvalidImmediate(String),
    #[error("invalid memory operand `{0}`: expected offset(base)")]
    InvalidMemoryOperand(String),
    #[error("invalid label: {0}")]
    InvalidLabel(String),
    #[error("duplicate label: {0}")]
    DuplicateLabel(String),
}

/// Every 16-bit immediate is signed so that decoding gives the value back.
fn check_imm(value: i64) -> Result<u32, EncodeError> {
    if !(IMM_MIN..=IMM_MAX).contains(&value) {
        return Err(EncodeError::ImmediateOutOfRange { value, min: IMM_MIN, max: IMM_MAX });
    }
    // two's complement; the builder keeps the low 16 bits
    Ok(value as u32)
}

fn set_reg(b: &mut WordBuilder, field: std::ops::Range<usize>, r: Reg) {
    b.set(field, r.code() as u32);
}

/// Packs a resolved instruction into its 32-bit word. Unused fields stay zero.
pub fn encode(ins: &Instruction) -> Result<Word, EncodeError> {
    let desc = ins.op.desc();
    if ins.operands.arity() != desc.arity {
        return Err(EncodeError::OperandCountMismatch {
            mnemonic: ins.op,
            expected: desc.arity.operand_count(),
            found: ins.operands.arity().operand_count(),
        });
    }

    let mut b = WordBuilder::new(desc.opcode);
    if desc.format == Format::R {
        if let Some(funct) = desc.funct {
            b.set(FUNCT, funct as u32);
        }
    }

    match ins.operands {
        Operands::None => {}
        Operands::Rs(rs) => set_reg(&mut b, RS, rs),
        Operands::Rd(rd) => set_reg(&mut b, RD, rd),
        Operands::ThreeReg { rd, rs, rt } => {
            set_reg(&mut b, RS, rs);
            set_reg(&mut b, RT, rt);
            set_reg(&mut b, RD, rd);
        }
        Operands::RegRegImm { rt, rs, imm } => {
            set_reg(&mut b, RS, rs);
            set_reg(&mut b, RT, rt);
            b.set(IMM, check_imm(imm)?);
        }
        Operands::Branch { rs, rt, offset } => {
            set_reg(&mut b, RS, rs);
            set_reg(&mut b, RT, rt);
            b.set(IMM, check_imm(offset)?);
        }
        Operands::Memory { rt, base, offset } => {
            set_reg(&mut b, RS, base);
            set_reg(&mut b, RT, rt);
            b.set(IMM, check_imm(offset)?);
        }
        Operands::RegReg { rs, rt } => {
            set_reg(&mut b, RS, rs);
            set_reg(&mut b, RT, rt);
        }
        Operands::Jump { addr } => {
            if addr > ADDR_MAX {
                return Err(EncodeError::InvalidJumpTarget(addr.to_string()));
            }
            b.set(ADDR, addr);
        }
    }
    Ok(b.finish())
}
