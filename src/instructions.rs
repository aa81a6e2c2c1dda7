use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    R,
    I,
    J,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Mnemonic {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Crash,
    Panic,
    Freeze,
    Null,
    Trace,
    Fork,
    Breakpt,
    Addi,
    Beq,
    Bne,
    Blt,
    /// Branch if the second register holds -1.
    NotFound,
    Lw,
    Sw,
    /// Swap two registers at random.
    Glitch,
    Reboot,
    Jump,
}

/// Operand shape of a mnemonic. Decides which fields are read and written,
/// independently of the bit format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arity {
    /// `CRASH`
    None,
    /// `PANIC rs`
    Rs,
    /// `NULL rd`
    Rd,
    /// `ADD rd, rs, rt`
    ThreeReg,
    /// `ADDI rt, rs, imm`
    RegRegImm,
    /// `BEQ rs, rt, offset`
    Branch,
    /// `LW rt, offset(base)`
    Memory,
    /// `GLITCH rs, rt`
    RegReg,
    /// `JUMP address`
    Jump,
}

impl Arity {
    /// Number of comma-separated source operands.
    pub fn operand_count(self) -> usize {
        match self {
            Arity::None => 0,
            Arity::Rs | Arity::Rd | Arity::Jump => 1,
            Arity::Memory | Arity::RegReg => 2,
            Arity::ThreeReg | Arity::RegRegImm | Arity::Branch => 3,
        }
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles: u8 {
const RELATIVE = 1 << 0; // PC-relative branch target
const ABSOLUTE = 1 << 1; // absolute jump target
}
}

#[derive(Debug, Clone, Copy)]
pub struct InstrDesc {
    pub op: Mnemonic,
    pub mnemonic: &'static str,
    pub format: Format,
    pub opcode: u8,
    /// Present only for format R.
    pub funct: Option<u8>,
    pub arity: Arity,
    pub roles: Roles,
}

const fn r(op: Mnemonic, mnemonic: &'static str, opcode: u8, funct: u8, arity: Arity, roles: Roles) -> InstrDesc {
    InstrDesc { op, mnemonic, format: Format::R, opcode, funct: Some(funct), arity, roles }
}

const fn i(op: Mnemonic, mnemonic: &'static str, opcode: u8, arity: Arity, roles: Roles) -> InstrDesc {
    InstrDesc { op, mnemonic, format: Format::I, opcode, funct: None, arity, roles }
}

const fn j(op: Mnemonic, mnemonic: &'static str, opcode: u8) -> InstrDesc {
    InstrDesc { op, mnemonic, format: Format::J, opcode, funct: None, arity: Arity::Jump, roles: Roles::ABSOLUTE }
}

/// Indexed by `Mnemonic as usize`.
pub const TABLE: &[InstrDesc] = &[
    r(Mnemonic::Add, "ADD", 0b000000, 0b100000, Arity::ThreeReg, Roles::empty()),
    r(Mnemonic::Sub, "SUB", 0b000000, 0b100010, Arity::ThreeReg, Roles::empty()),
    r(Mnemonic::Mul, "MUL", 0b000000, 0b011000, Arity::ThreeReg, Roles::empty()),
    r(Mnemonic::Div, "DIV", 0b000000, 0b011010, Arity::ThreeReg, Roles::empty()),
    r(Mnemonic::Mod, "MOD", 0b000000, 0b011011, Arity::ThreeReg, Roles::empty()),
    // Control ops are format R but each owns a distinct opcode.
    r(Mnemonic::Crash, "CRASH", 0b010010, 0b000000, Arity::None, Roles::empty()),
    r(Mnemonic::Panic, "PANIC", 0b010100, 0b000001, Arity::Rs, Roles::empty()),
    r(Mnemonic::Freeze, "FREEZE", 0b010101, 0b000000, Arity::None, Roles::empty()),
    r(Mnemonic::Null, "NULL", 0b010110, 0b000001, Arity::Rd, Roles::empty()),
    r(Mnemonic::Trace, "TRACE", 0b010111, 0b000000, Arity::None, Roles::empty()),
    r(Mnemonic::Fork, "FORK", 0b011000, 0b000001, Arity::Rs, Roles::empty()),
    r(Mnemonic::Breakpt, "BREAKPT", 0b011010, 0b000000, Arity::None, Roles::empty()),
    i(Mnemonic::Addi, "ADDI", 0b001000, Arity::RegRegImm, Roles::empty()),
    i(Mnemonic::Beq, "BEQ", 0b000100, Arity::Branch, Roles::RELATIVE),
    i(Mnemonic::Bne, "BNE", 0b000101, Arity::Branch, Roles::RELATIVE),
    i(Mnemonic::Blt, "BLT", 0b000110, Arity::Branch, Roles::RELATIVE),
    i(Mnemonic::NotFound, "404", 0b010001, Arity::Branch, Roles::RELATIVE),
    i(Mnemonic::Lw, "LW", 0b100011, Arity::Memory, Roles::empty()),
    i(Mnemonic::Sw, "SW", 0b101011, Arity::Memory, Roles::empty()),
    i(Mnemonic::Glitch, "GLITCH", 0b011001, Arity::RegReg, Roles::empty()),
    j(Mnemonic::Reboot, "REBOOT", 0b010011),
    j(Mnemonic::Jump, "JUMP", 0b000010),
];

impl Mnemonic {
    pub fn desc(self) -> &'static InstrDesc {
        &TABLE[self as usize]
    }

    pub fn name(self) -> &'static str {
        self.desc().mnemonic
    }

    /// Case-insensitive lookup of a source mnemonic.
    pub fn from_name(name: &str) -> Option<Mnemonic> {
        TABLE.iter().find(|d| d.mnemonic.eq_ignore_ascii_case(name)).map(|d| d.op)
    }
}

impl std::fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// R-format lookup on the (opcode, funct) pair.
pub fn lookup_r(opcode: u8, funct: u8) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.format == Format::R && d.opcode == opcode && d.funct == Some(funct))
}

/// Opcode-only lookup across formats I and J.
pub fn lookup_ij(opcode: u8) -> Option<&'static InstrDesc> {
    TABLE.iter().find(|d| d.format != Format::R && d.opcode == opcode)
}
