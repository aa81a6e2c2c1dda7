use serde::{Deserialize, Serialize};

/// A general or special purpose register, identified by its 5-bit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Reg(u8);

#[derive(Debug, Clone, Copy)]
pub struct RegDesc {
    pub name: &'static str,
    pub code: u8,
}

/// Code 15 is reserved and has no name.
pub const REGISTERS: &[RegDesc] = &[
    RegDesc { name: "$r0", code: 0 },
    RegDesc { name: "$r1", code: 1 },
    RegDesc { name: "$r2", code: 2 },
    RegDesc { name: "$r3", code: 3 },
    RegDesc { name: "$r4", code: 4 },
    RegDesc { name: "$r5", code: 5 },
    RegDesc { name: "$r6", code: 6 },
    RegDesc { name: "$r7", code: 7 },
    RegDesc { name: "$r8", code: 8 },
    RegDesc { name: "$r9", code: 9 },
    RegDesc { name: "$ip", code: 10 },
    RegDesc { name: "$sp", code: 11 },
    RegDesc { name: "$err", code: 12 },
    RegDesc { name: "$ex", code: 13 },
    RegDesc { name: "$dbg", code: 14 },
];

impl Reg {
    pub const R0: Reg = Reg(0);
    pub const R1: Reg = Reg(1);
    pub const R2: Reg = Reg(2);
    pub const R3: Reg = Reg(3);
    pub const R4: Reg = Reg(4);
    pub const R5: Reg = Reg(5);
    pub const R6: Reg = Reg(6);
    pub const R7: Reg = Reg(7);
    pub const R8: Reg = Reg(8);
    pub const R9: Reg = Reg(9);
    pub const IP: Reg = Reg(10);
    pub const SP: Reg = Reg(11);
    pub const ERR: Reg = Reg(12);
    pub const EX: Reg = Reg(13);
    pub const DBG: Reg = Reg(14);

    pub fn from_name(name: &str) -> Option<Reg> {
        REGISTERS.iter().find(|r| r.name == name).map(|r| Reg(r.code))
    }

    /// Returns `None` for the reserved code and anything wider than 5 bits.
    pub fn from_code(code: u8) -> Option<Reg> {
        REGISTERS.get(code as usize).map(|r| Reg(r.code))
    }

    pub fn code(self) -> u8 {
        self.0
    }

    pub fn name(self) -> &'static str {
        REGISTERS[self.0 as usize].name
    }
}

impl TryFrom<u8> for Reg {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Reg::from_code(code).ok_or_else(|| format!("unknown register code {code:05b}"))
    }
}

impl From<Reg> for u8 {
    fn from(r: Reg) -> u8 {
        r.0
    }
}

impl std::fmt::Display for Reg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_codes_agree() {
        for (i, r) in REGISTERS.iter().enumerate() {
            assert_eq!(r.code as usize, i);
            let reg = Reg::from_name(r.name).unwrap();
            assert_eq!(reg.code(), r.code);
            assert_eq!(reg.name(), r.name);
        }
    }

    #[test]
    fn reserved_code_has_no_register() {
        assert!(Reg::from_code(15).is_none());
        assert!(Reg::from_code(31).is_none());
        assert_eq!(Reg::from_code(14), Some(Reg::DBG));
        assert!(Reg::from_name("$r10").is_none());
        assert!(Reg::from_name("r1").is_none());
    }

    #[test]
    fn deserialize_rejects_unnamed_codes() {
        assert_eq!(serde_json::from_str::<Reg>("6").unwrap(), Reg::R6);
        assert_eq!(serde_json::to_string(&Reg::DBG).unwrap(), "14");
        assert!(serde_json::from_str::<Reg>("15").is_err());
        assert!(serde_json::from_str::<Reg>("200").is_err());
    }
}
