use tracing::trace;

use crate::decoder::{DecodeError, Decoder, Instruction, Operands};
use crate::instructions::{lookup_ij, lookup_r, Arity};
use crate::registers::Reg;
use crate::word::{Word, ADDR, IMM, RD, RS, RT};

/// Decoder for the 32-bit GLITCH word layout.
///
/// Format R is tried first on the (opcode, funct) pair because the control
/// mnemonics carry non-zero opcodes that would otherwise look like format I.
/// Only when no R descriptor matches does the opcode alone select an I or J
/// descriptor. Fields an arity class does not use are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct GlitchDecoder;

impl GlitchDecoder {
    pub fn new() -> Self {
        Self
    }
}

#[inline]
fn sign_ext(v: u32, bits: u32) -> i64 {
    let s = 32 - bits;
    (((v << s) as i32) >> s) as i64
}

fn reg(word: Word, field: std::ops::Range<usize>) -> Result<Reg, DecodeError> {
    let code = word.field(field) as u8;
    Reg::from_code(code).ok_or(DecodeError::UnknownRegister { code })
}

impl Decoder for GlitchDecoder {
    fn decode(&self, word: Word) -> Result<Instruction, DecodeError> {
        let opcode = word.opcode();
        let desc = lookup_r(opcode, word.funct())
            .or_else(|| lookup_ij(opcode))
            .ok_or(DecodeError::UnknownOpcode { opcode })?;
        trace!(%word, mnemonic = desc.mnemonic, "decode");

        let imm = || sign_ext(word.field(IMM), 16);
        let operands = match desc.arity {
            Arity::None => Operands::None,
            Arity::Rs => Operands::Rs(reg(word, RS)?),
            Arity::Rd => Operands::Rd(reg(word, RD)?),
            Arity::ThreeReg => Operands::ThreeReg {
                rd: reg(word, RD)?,
                rs: reg(word, RS)?,
                rt: reg(word, RT)?,
            },
            Arity::RegRegImm => Operands::RegRegImm { rt: reg(word, RT)?, rs: reg(word, RS)?, imm: imm() },
            Arity::Branch => Operands::Branch { rs: reg(word, RS)?, rt: reg(word, RT)?, offset: imm() },
            Arity::Memory => Operands::Memory { rt: reg(word, RT)?, base: reg(word, RS)?, offset: imm() },
            Arity::RegReg => Operands::RegReg { rs: reg(word, RS)?, rt: reg(word, RT)? },
            Arity::Jump => Operands::Jump { addr: word.field(ADDR) },
        };
        Ok(Instruction::new(desc.op, operands))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::Mnemonic;

    fn w(bits: &str) -> Word {
        Word::parse(bits).unwrap()
    }

    #[test]
    fn sign_extension_of_16_bit_field() {
        assert_eq!(sign_ext(0x0005, 16), 5);
        assert_eq!(sign_ext(0xFFFC, 16), -4);
        assert_eq!(sign_ext(0x8000, 16), -32768);
        assert_eq!(sign_ext(0x7FFF, 16), 32767);
    }

    #[test]
    fn decodes_addi() {
        let d = GlitchDecoder::new().decode(w("00100000000000010000000000000101")).unwrap();
        assert_eq!(d, Instruction::new(Mnemonic::Addi, Operands::RegRegImm { rt: Reg::R1, rs: Reg::R0, imm: 5 }));
    }

    #[test]
    fn panic_reads_only_rs() {
        // rd field set to the reserved code: PANIC must not look at it
        let d = GlitchDecoder::new().decode(w("01010000110000000111100000000001")).unwrap();
        assert_eq!(d, Instruction::new(Mnemonic::Panic, Operands::Rs(Reg::R6)));
    }

    #[test]
    fn unknown_opcode_and_register() {
        let dec = GlitchDecoder::new();
        assert_eq!(
            dec.decode(w("11111100000000000000000000000000")),
            Err(DecodeError::UnknownOpcode { opcode: 0b111111 })
        );
        // ADD with rd = 15
        assert_eq!(
            dec.decode(w("00000000001000100111100000100000")),
            Err(DecodeError::UnknownRegister { code: 15 })
        );
    }

    #[test]
    fn jump_address_is_unsigned() {
        let d = GlitchDecoder::new().decode(w("00001011111111111111111111111111")).unwrap();
        assert_eq!(d.operands, Operands::Jump { addr: 0x03FF_FFFF });
    }
}
