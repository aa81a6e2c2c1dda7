pub mod asm;
pub mod decoder;
pub mod disasm;
pub mod encoder;
pub mod instructions;
pub mod registers;
pub mod word;

pub mod isa {
    pub mod glitch; // GLITCH 32-bit word layout
}

pub use asm::{assemble, assemble_program, AsmError, LabelMap};
pub use decoder::{decode, DecodeError, Decoder, Instruction, Operands};
pub use disasm::{disassemble, disassemble_text, DisasmConfig, DisasmError, Disassembly};
pub use encoder::{encode, EncodeError};
pub use instructions::{Format, Mnemonic};
pub use registers::Reg;
pub use word::Word;
